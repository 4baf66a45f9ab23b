//! PDF line extraction: one line per non-empty visual text line.

use std::path::Path;

use lopdf::Document;

use super::layout::LayoutAnalyzer;
use crate::detect::DocumentKind;
use crate::error::Result;
use crate::model::{Anchor, ExtractionResult, LineMapping};
use crate::text::clean_line_text;

/// Extract the visual text lines of a PDF file.
pub fn extract_pdf<P: AsRef<Path>>(path: P) -> Result<ExtractionResult> {
    let doc = Document::load(path.as_ref())?;
    extract_document(&doc)
}

/// Extract the visual text lines of a loaded PDF.
pub fn extract_document(doc: &Document) -> Result<ExtractionResult> {
    let analyzer = LayoutAnalyzer::new(doc);
    let mut lines = Vec::new();
    let mut mappings = Vec::new();

    for page_index in 0..analyzer.page_count() {
        for block in analyzer.page_blocks(page_index)? {
            for line in &block.lines {
                let text = clean_line_text(&line.text());
                if text.is_empty() {
                    continue;
                }
                let Some(first) = line.first_span() else {
                    continue;
                };

                mappings.push(LineMapping {
                    line_number: (mappings.len() + 1) as u32,
                    anchor: Anchor::PdfLine {
                        page_index,
                        bbox: line.bbox().or_else(|| block.bbox()).map(|b| b.map(round2)),
                        font_size: round2(first.font_size),
                        font_name: first.font_name.clone(),
                        color: first.color,
                    },
                });
                lines.push(text);
            }
        }
    }

    log::debug!(
        "Extracted {} PDF lines from {} pages",
        lines.len(),
        analyzer.page_count()
    );
    Ok(ExtractionResult::new(DocumentKind::Pdf, &lines, mappings)
        .with_page_count(analyzer.page_count()))
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}
