//! Apply results: which requested edits were actually realized.

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Record of one realized replacement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AppliedEdit {
    /// Paragraph text replaced in a DOCX
    #[serde(rename_all = "camelCase")]
    Paragraph {
        /// Requested line
        line_number: u32,
        /// Paragraph that received the text
        paragraph_index: usize,
    },

    /// Line redacted and redrawn in a PDF
    #[serde(rename_all = "camelCase")]
    PdfLine {
        /// Requested line
        line_number: u32,
        /// Page the line lives on
        page_index: usize,
        /// Final font size of the redrawn text
        font_size_used: f32,
        /// Whether the text fit inside the original rectangle
        fit: bool,
    },
}

impl AppliedEdit {
    /// The line number this record refers to.
    pub fn line_number(&self) -> u32 {
        match self {
            AppliedEdit::Paragraph { line_number, .. } | AppliedEdit::PdfLine { line_number, .. } => {
                *line_number
            }
        }
    }
}

/// Record of one realized insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertedLine {
    /// Anchor line the new paragraph follows
    pub after_line_number: u32,
    /// Anchor paragraph index
    pub paragraph_index: usize,
}

/// Outcome of an apply run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResult {
    /// Realized replacements
    pub applied: Vec<AppliedEdit>,
    /// Realized insertions
    pub inserted: Vec<InsertedLine>,
    /// Where the new document was written
    pub output_path: PathBuf,
}

impl ApplyResult {
    /// Create an empty result for an output path.
    pub fn new(output_path: impl AsRef<Path>) -> Self {
        Self {
            applied: Vec::new(),
            inserted: Vec::new(),
            output_path: output_path.as_ref().to_path_buf(),
        }
    }

    /// Number of realized replacements.
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    /// Number of realized insertions.
    pub fn inserted_count(&self) -> usize {
        self.inserted.len()
    }
}
