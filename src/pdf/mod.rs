//! PDF pipeline.
//!
//! Extraction interprets page content streams into positioned text spans and
//! groups them into visual lines. Applying edits removes the original text
//! operators under each target rectangle, paints the rectangles white and
//! draws the replacement text with a standard Helvetica, shrinking it until it
//! fits.
//!
//! All coordinates are PDF user space with the origin at the bottom-left of
//! the page.

pub mod apply;
pub mod extract;
pub mod fonts;
pub mod layout;
pub mod textbox;

pub use apply::apply_pdf;
pub use extract::extract_pdf;
pub use layout::{LayoutAnalyzer, SpanSource, TextBlock, TextLine, TextSpan};
pub use textbox::{fit_text, FittedText};

use crate::detect::DocumentKind;
use crate::error::Result;
use crate::model::{ApplyResult, EditBatch, ExtractionResult, LineMapping};
use crate::options::ApplyOptions;
use crate::pipeline::DocumentPipeline;
use std::path::Path;

/// Visual-line pipeline for PDF documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfPipeline;

impl PdfPipeline {
    /// Create a new PDF pipeline.
    pub fn new() -> Self {
        Self
    }
}

impl DocumentPipeline for PdfPipeline {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Pdf
    }

    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn extract(&self, path: &Path) -> Result<ExtractionResult> {
        extract_pdf(path)
    }

    fn apply(
        &self,
        input: &Path,
        mappings: &[LineMapping],
        edits: &EditBatch,
        output: &Path,
        options: &ApplyOptions,
    ) -> Result<ApplyResult> {
        apply_pdf(input, mappings, edits, output, options)
    }
}
