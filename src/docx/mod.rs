//! DOCX pipeline.
//!
//! A DOCX file is a zip package; only its main document part is parsed,
//! into an owned XML arena that lives for one extract or apply call.
//! Paragraph handles are [`xml::NodeId`]s into that arena.

pub mod apply;
pub mod document;
pub mod extract;
pub mod package;
pub mod xml;

pub use apply::apply_docx;
pub use document::{BlockItem, WordDocument};
pub use extract::extract_docx;
pub use package::DocxPackage;

use crate::detect::DocumentKind;
use crate::error::Result;
use crate::model::{ApplyResult, EditBatch, ExtractionResult, LineMapping};
use crate::options::ApplyOptions;
use crate::pipeline::DocumentPipeline;
use std::path::Path;

/// Paragraph-level pipeline for Word documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxPipeline;

impl DocxPipeline {
    /// Create a new DOCX pipeline.
    pub fn new() -> Self {
        Self
    }
}

impl DocumentPipeline for DocxPipeline {
    fn kind(&self) -> DocumentKind {
        DocumentKind::Docx
    }

    fn supported_extensions(&self) -> &[&str] {
        &["docx"]
    }

    fn extract(&self, path: &Path) -> Result<ExtractionResult> {
        extract_docx(path)
    }

    fn apply(
        &self,
        input: &Path,
        mappings: &[LineMapping],
        edits: &EditBatch,
        output: &Path,
        _options: &ApplyOptions,
    ) -> Result<ApplyResult> {
        apply_docx(input, mappings, edits, output)
    }
}
