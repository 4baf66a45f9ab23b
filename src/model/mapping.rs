//! Line mappings: the link between an abstract line number and a document anchor.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A four-number rectangle `[x0, y0, x1, y1]` in PDF user space.
pub type BBox = [f32; 4];

/// One extracted line and the anchor that owns its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineMapping {
    /// 1-based position in extraction order
    pub line_number: u32,

    /// Where the line lives in the source document
    #[serde(flatten)]
    pub anchor: Anchor,
}

/// Format-specific anchor descriptor, discriminated by `target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum Anchor {
    /// A paragraph in the flattened DOCX paragraph sequence
    #[serde(rename_all = "camelCase")]
    DocxParagraph {
        /// 0-based index into the flattened paragraph sequence
        paragraph_index: usize,
        /// Whether the cleaned paragraph text was empty
        is_empty: bool,
    },

    /// A positioned visual text line on a PDF page
    #[serde(rename_all = "camelCase")]
    PdfLine {
        /// 0-based page index
        page_index: usize,
        /// Line rectangle; absent mappings are never applied
        bbox: Option<BBox>,
        /// Size of the line's first span
        font_size: f32,
        /// Base font of the line's first span, subset tag removed
        font_name: String,
        /// Fill colour of the first span, packed as 0xRRGGBB
        color: u32,
    },
}

impl LineMapping {
    /// Mapping for a DOCX paragraph.
    pub fn docx(line_number: u32, paragraph_index: usize, is_empty: bool) -> Self {
        Self {
            line_number,
            anchor: Anchor::DocxParagraph {
                paragraph_index,
                is_empty,
            },
        }
    }

    /// Paragraph index if this is a DOCX anchor.
    pub fn paragraph_index(&self) -> Option<usize> {
        match self.anchor {
            Anchor::DocxParagraph {
                paragraph_index, ..
            } => Some(paragraph_index),
            Anchor::PdfLine { .. } => None,
        }
    }

    /// Page index if this is a PDF anchor.
    pub fn page_index(&self) -> Option<usize> {
        match self.anchor {
            Anchor::PdfLine { page_index, .. } => Some(page_index),
            Anchor::DocxParagraph { .. } => None,
        }
    }
}

/// Lookup from line number to mapping, restricted to one target kind.
///
/// Later duplicates of a line number win, matching a dict built in order.
#[derive(Debug, Default)]
pub struct MappingIndex<'a> {
    by_line: HashMap<u32, &'a LineMapping>,
}

impl<'a> MappingIndex<'a> {
    /// Index only the DOCX paragraph mappings.
    pub fn docx(mappings: &'a [LineMapping]) -> Self {
        Self::filtered(mappings, |m| {
            matches!(m.anchor, Anchor::DocxParagraph { .. })
        })
    }

    /// Index only the PDF line mappings.
    pub fn pdf(mappings: &'a [LineMapping]) -> Self {
        Self::filtered(mappings, |m| matches!(m.anchor, Anchor::PdfLine { .. }))
    }

    fn filtered(mappings: &'a [LineMapping], keep: impl Fn(&LineMapping) -> bool) -> Self {
        let by_line = mappings
            .iter()
            .filter(|m| keep(m))
            .map(|m| (m.line_number, m))
            .collect();
        Self { by_line }
    }

    /// Look up a line number.
    pub fn get(&self, line_number: u32) -> Option<&'a LineMapping> {
        self.by_line.get(&line_number).copied()
    }

    /// Number of indexed lines.
    pub fn len(&self) -> usize {
        self.by_line.len()
    }

    /// Check if nothing was indexed.
    pub fn is_empty(&self) -> bool {
        self.by_line.is_empty()
    }
}

/// Read `lineMappings` out of a mapping payload, skipping malformed entries.
///
/// The payload may be a full extraction result or any object carrying a
/// `lineMappings` array. Entries with an unknown `target` or missing fields
/// are dropped rather than failing the whole batch.
pub fn line_mappings_from_value(payload: &serde_json::Value) -> Vec<LineMapping> {
    let Some(entries) = payload.get("lineMappings").and_then(|v| v.as_array()) else {
        log::debug!("Mapping payload has no lineMappings array");
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match LineMapping::deserialize(entry) {
            Ok(mapping) => Some(mapping),
            Err(e) => {
                log::debug!("Skipping malformed line mapping: {}", e);
                None
            }
        })
        .collect()
}
