//! Document kind detection.
//!
//! Dispatch is by lowercase file extension. The magic-byte sniff is only
//! used to give a clearer error when a file's content contradicts its name.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// The two structural document kinds docline understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// WordprocessingML package (`.docx`)
    Docx,
    /// Portable Document Format (`.pdf`)
    Pdf,
}

impl DocumentKind {
    /// Lowercase extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Docx => "docx",
            DocumentKind::Pdf => "pdf",
        }
    }

    /// Resolve a kind from an extension, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "docx" => Some(DocumentKind::Docx),
            "pdf" => Some(DocumentKind::Pdf),
            _ => None,
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Zip local file header, the container of every DOCX package.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Detect the document kind of a path from its extension.
///
/// # Returns
/// * `Err(Error::UnsupportedFormat)` for any extension other than `.docx`/`.pdf`
///
/// # Example
/// ```
/// use docline::detect::{detect_kind_from_path, DocumentKind};
///
/// assert_eq!(detect_kind_from_path("Resume.PDF").unwrap(), DocumentKind::Pdf);
/// assert!(detect_kind_from_path("notes.txt").is_err());
/// ```
pub fn detect_kind_from_path<P: AsRef<Path>>(path: P) -> Result<DocumentKind> {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    DocumentKind::from_extension(ext).ok_or_else(|| {
        Error::UnsupportedFormat(if ext.is_empty() {
            "<none>".to_string()
        } else {
            format!(".{}", ext.to_ascii_lowercase())
        })
    })
}

/// Sniff the document kind from leading bytes.
///
/// Returns `None` when the data matches neither container.
pub fn sniff_kind_from_bytes(data: &[u8]) -> Option<DocumentKind> {
    if data.starts_with(PDF_MAGIC) {
        Some(DocumentKind::Pdf)
    } else if data.starts_with(ZIP_MAGIC) {
        Some(DocumentKind::Docx)
    } else {
        None
    }
}

/// Sniff the document kind of a file from its first bytes.
pub fn sniff_kind_from_path<P: AsRef<Path>>(path: P) -> Result<Option<DocumentKind>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut header = [0u8; 8];
    let mut filled = 0;
    while filled < header.len() {
        let n = reader.read(&mut header[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(sniff_kind_from_bytes(&header[..filled]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        assert_eq!(
            detect_kind_from_path("cv.docx").unwrap(),
            DocumentKind::Docx
        );
        assert_eq!(detect_kind_from_path("cv.Pdf").unwrap(), DocumentKind::Pdf);
    }

    #[test]
    fn test_detect_unsupported_extension() {
        let err = detect_kind_from_path("cv.doc").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(ref ext) if ext == ".doc"));

        let err = detect_kind_from_path("README").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[test]
    fn test_sniff_bytes() {
        assert_eq!(
            sniff_kind_from_bytes(b"%PDF-1.7\n"),
            Some(DocumentKind::Pdf)
        );
        assert_eq!(
            sniff_kind_from_bytes(b"PK\x03\x04\x14\x00"),
            Some(DocumentKind::Docx)
        );
        assert_eq!(sniff_kind_from_bytes(b"<html>"), None);
        assert_eq!(sniff_kind_from_bytes(b""), None);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        let json = serde_json::to_string(&DocumentKind::Docx).unwrap();
        assert_eq!(json, "\"docx\"");
    }
}
