//! DOCX edit application: paragraph replacements, then anchored insertions.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use super::document::WordDocument;
use super::package::DocxPackage;
use super::xml::NodeId;
use crate::error::Result;
use crate::model::{AppliedEdit, ApplyResult, EditBatch, InsertedLine, LineMapping, MappingIndex};
use crate::text::normalize_insertion_text;

/// Apply an edit batch to a DOCX file and write the result to `output`.
///
/// The input is read fully before anything is written, so `output` may
/// name the input file itself.
pub fn apply_docx<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    mappings: &[LineMapping],
    edits: &EditBatch,
    output: Q,
) -> Result<ApplyResult> {
    let data = fs::read(input.as_ref())?;
    let mut package = DocxPackage::from_reader(Cursor::new(data))?;
    let mut document = WordDocument::from_tree(package.read_document()?)?;

    let mut result = ApplyResult::new(output.as_ref());
    apply_to_document(&mut document, mappings, edits, &mut result);

    package.save_to_path(document.tree(), output.as_ref())?;
    log::debug!(
        "Wrote {} ({} applied, {} inserted)",
        output.as_ref().display(),
        result.applied_count(),
        result.inserted_count()
    );
    Ok(result)
}

/// Apply an edit batch to a loaded document, recording what was realized.
pub fn apply_to_document(
    document: &mut WordDocument,
    mappings: &[LineMapping],
    edits: &EditBatch,
    result: &mut ApplyResult,
) {
    let index = MappingIndex::docx(mappings);
    let paragraphs = document.paragraphs();

    for edit in &edits.line_edits {
        let Some(paragraph_index) = resolve(&index, &paragraphs, edit.line_number) else {
            log::debug!("Skipping edit for unresolvable line {}", edit.line_number);
            continue;
        };
        document.set_paragraph_text(paragraphs[paragraph_index], &edit.new_text);
        result.applied.push(AppliedEdit::Paragraph {
            line_number: edit.line_number,
            paragraph_index,
        });
    }

    let mut pending: Vec<PendingInsertion<'_>> = edits
        .insertions
        .iter()
        .enumerate()
        .filter_map(|(order, insertion)| {
            let resolved = resolve(&index, &paragraphs, insertion.after_line_number);
            if resolved.is_none() {
                log::debug!(
                    "Skipping insertion after unresolvable line {}",
                    insertion.after_line_number
                );
            }
            resolved.map(|paragraph_index| PendingInsertion {
                order,
                paragraph_index,
                after_line_number: insertion.after_line_number,
                text: &insertion.new_text,
            })
        })
        .collect();

    // Each insertion lands directly after its anchor, so later requests must go in first.
    pending.sort_by(|a, b| {
        (b.paragraph_index, b.order).cmp(&(a.paragraph_index, a.order))
    });

    let mut inserted = Vec::with_capacity(pending.len());
    for insertion in pending {
        let anchor = paragraphs[insertion.paragraph_index];
        let text = normalize_insertion_text(
            insertion.text,
            &document.paragraph_text(anchor),
            document.is_list_paragraph(anchor),
        );
        if text.is_empty() {
            log::debug!(
                "Skipping empty insertion after line {}",
                insertion.after_line_number
            );
            continue;
        }
        if let Err(e) = document.insert_paragraph_after(anchor, &text) {
            log::debug!("Could not insert after line {}: {}", insertion.after_line_number, e);
            continue;
        }
        inserted.push((
            insertion.order,
            InsertedLine {
                after_line_number: insertion.after_line_number,
                paragraph_index: insertion.paragraph_index,
            },
        ));
    }

    // Report in request order.
    inserted.sort_by_key(|(order, _)| *order);
    result
        .inserted
        .extend(inserted.into_iter().map(|(_, line)| line));
}

struct PendingInsertion<'a> {
    order: usize,
    paragraph_index: usize,
    after_line_number: u32,
    text: &'a str,
}

fn resolve(index: &MappingIndex<'_>, paragraphs: &[NodeId], line_number: u32) -> Option<usize> {
    index
        .get(line_number)
        .and_then(LineMapping::paragraph_index)
        .filter(|&i| i < paragraphs.len())
}
