//! DOCX line extraction: one line per paragraph, empty ones included.

use std::path::Path;

use super::document::WordDocument;
use super::package::DocxPackage;
use crate::detect::DocumentKind;
use crate::error::Result;
use crate::model::{ExtractionResult, LineMapping};
use crate::text::clean_line_text;

/// Extract the paragraph lines of a DOCX file.
pub fn extract_docx<P: AsRef<Path>>(path: P) -> Result<ExtractionResult> {
    let mut package = DocxPackage::open(path.as_ref())?;
    let document = WordDocument::from_tree(package.read_document()?)?;
    Ok(extract_document(&document))
}

/// Extract the paragraph lines of an already loaded document.
pub fn extract_document(document: &WordDocument) -> ExtractionResult {
    let paragraphs = document.paragraphs();
    let mut lines = Vec::with_capacity(paragraphs.len());
    let mut mappings = Vec::with_capacity(paragraphs.len());

    for (index, &paragraph) in paragraphs.iter().enumerate() {
        let text = clean_line_text(&document.paragraph_text(paragraph));
        let line_number = (index + 1) as u32;
        mappings.push(LineMapping::docx(line_number, index, text.is_empty()));
        lines.push(text);
    }

    log::debug!("Extracted {} DOCX paragraphs", paragraphs.len());
    ExtractionResult::new(DocumentKind::Docx, &lines, mappings)
        .with_paragraph_count(paragraphs.len())
}
