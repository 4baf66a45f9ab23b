//! Error types for docline.

use std::io;
use thiserror::Error;

/// Result type alias for docline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while extracting or applying line edits.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file extension is neither `.docx` nor `.pdf`.
    #[error("Unsupported input type '{0}' (supported input types: .docx, .pdf)")]
    UnsupportedFormat(String),

    /// The DOCX package is structurally invalid.
    #[error("DOCX error: {0}")]
    Docx(String),

    /// Error reading the DOCX zip container.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Error parsing or writing WordprocessingML.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Mapping or edits JSON could not be read.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Insertions were requested for a format that cannot realize them.
    #[error("Insertions are not supported for {0} documents")]
    UnsupportedInsertion(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Xml(quick_xml::Error::InvalidAttr(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnsupportedFormat("txt".to_string());
        assert_eq!(
            err.to_string(),
            "Unsupported input type 'txt' (supported input types: .docx, .pdf)"
        );

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
