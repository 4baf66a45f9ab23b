//! Extraction result types.

use super::LineMapping;
use crate::detect::DocumentKind;
use serde::{Deserialize, Serialize};

/// The neutral representation produced by an extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Source document kind
    pub kind: DocumentKind,

    /// Newline-joined cleaned lines, one per mapping
    pub text: String,

    /// One mapping per line, numbered from 1
    pub line_mappings: Vec<LineMapping>,

    /// Counts describing the source
    pub meta: ExtractionMeta,
}

impl ExtractionResult {
    /// Build a result from cleaned lines and their mappings.
    pub fn new(kind: DocumentKind, lines: &[String], line_mappings: Vec<LineMapping>) -> Self {
        debug_assert_eq!(lines.len(), line_mappings.len());
        Self {
            kind,
            text: lines.join("\n"),
            meta: ExtractionMeta {
                line_count: lines.len(),
                ..Default::default()
            },
            line_mappings,
        }
    }

    /// Set the paragraph count (DOCX).
    pub fn with_paragraph_count(mut self, count: usize) -> Self {
        self.meta.paragraph_count = Some(count);
        self
    }

    /// Set the page count (PDF).
    pub fn with_page_count(mut self, count: usize) -> Self {
        self.meta.page_count = Some(count);
        self
    }

    /// Number of addressable lines.
    pub fn line_count(&self) -> usize {
        self.line_mappings.len()
    }

    /// Iterate the extracted lines in order.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }
}

/// Counts carried alongside the extracted text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMeta {
    /// Paragraphs visited (DOCX)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph_count: Option<usize>,

    /// Pages in the document (PDF)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,

    /// Lines emitted
    #[serde(default)]
    pub line_count: usize,
}
