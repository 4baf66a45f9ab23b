//! PDF edit application: redact target lines, then redraw them in place.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use super::fonts::HELVETICA;
use super::layout::{page_resources, stream_operations, LayoutAnalyzer, SpanSource, TextSpan};
use super::textbox::{fit_text, text_operations};
use crate::error::{Error, Result};
use crate::model::{Anchor, AppliedEdit, ApplyResult, BBox, EditBatch, LineMapping, MappingIndex};
use crate::options::{ApplyOptions, InsertionPolicy};

/// Slack around a target rectangle when deciding which text lies inside it.
const REDACTION_TOLERANCE: f32 = 0.5;

/// Preferred resource name for the replacement font.
const FONT_RESOURCE: &str = "DLHelv";

/// Preferred resource name for a redacted copy of a form.
const FORM_RESOURCE: &str = "DLForm";

/// One resolved replacement on a page.
#[derive(Debug, Clone)]
struct PageEdit<'a> {
    line_number: u32,
    text: &'a str,
    rect: BBox,
    font_size: f32,
    color: u32,
}

/// Apply an edit batch to a PDF file and write the result to `output`.
///
/// Insertions have no PDF counterpart: they are ignored or rejected
/// according to `options.pdf_insertions`.
pub fn apply_pdf<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    mappings: &[LineMapping],
    edits: &EditBatch,
    output: Q,
    options: &ApplyOptions,
) -> Result<ApplyResult> {
    if !edits.insertions.is_empty() {
        match options.pdf_insertions {
            InsertionPolicy::Reject => return Err(Error::UnsupportedInsertion("PDF".to_string())),
            InsertionPolicy::Ignore => log::debug!(
                "Ignoring {} insertions for PDF input",
                edits.insertions.len()
            ),
        }
    }

    let mut doc = Document::load(input.as_ref())?;
    let mut result = ApplyResult::new(output.as_ref());
    result.applied = apply_to_document(&mut doc, mappings, edits, options)?;

    save_compacted(&mut doc, output.as_ref())?;
    log::debug!(
        "Wrote {} ({} applied)",
        output.as_ref().display(),
        result.applied_count()
    );
    Ok(result)
}

/// Apply the replacements of an edit batch to a loaded PDF.
pub fn apply_to_document(
    doc: &mut Document,
    mappings: &[LineMapping],
    edits: &EditBatch,
    options: &ApplyOptions,
) -> Result<Vec<AppliedEdit>> {
    let index = MappingIndex::pdf(mappings);
    let page_count = doc.get_pages().len();

    let mut by_page: BTreeMap<usize, Vec<PageEdit<'_>>> = BTreeMap::new();
    for edit in &edits.line_edits {
        let resolved = index.get(edit.line_number).and_then(|m| match &m.anchor {
            Anchor::PdfLine {
                page_index,
                bbox: Some(rect),
                font_size,
                color,
                ..
            } if *page_index < page_count && is_usable(rect) => Some((
                *page_index,
                PageEdit {
                    line_number: edit.line_number,
                    text: &edit.new_text,
                    rect: *rect,
                    font_size: *font_size,
                    color: *color,
                },
            )),
            _ => None,
        });
        match resolved {
            Some((page_index, page_edit)) => by_page.entry(page_index).or_default().push(page_edit),
            None => log::debug!("Skipping edit for unresolvable line {}", edit.line_number),
        }
    }

    let mut applied = Vec::new();
    if by_page.is_empty() {
        return Ok(applied);
    }

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => HELVETICA,
        "Encoding" => "WinAnsiEncoding",
    });

    for (page_index, page_edits) in &by_page {
        rewrite_page(doc, *page_index, page_edits, font_id, options, &mut applied)?;
    }
    Ok(applied)
}

fn is_usable(rect: &BBox) -> bool {
    rect.iter().all(|v| v.is_finite()) && rect[2] > rect[0] && rect[3] > rect[1]
}

/// Redact every target line of one page, then draw the replacements.
fn rewrite_page(
    doc: &mut Document,
    page_index: usize,
    edits: &[PageEdit<'_>],
    font_id: ObjectId,
    options: &ApplyOptions,
    applied: &mut Vec<AppliedEdit>,
) -> Result<()> {
    let content = LayoutAnalyzer::new(doc).page_content(page_index)?;
    let rects: Vec<BBox> = edits.iter().map(|e| e.rect).collect();

    let inside = spans_inside(&content.spans, &rects);
    log::debug!(
        "Page {}: removing {} text operations under {} rectangles",
        page_index + 1,
        inside.len(),
        rects.len()
    );

    let mut removed = HashMap::new();
    let mut forms: BTreeMap<usize, (ObjectId, HashMap<usize, f32>)> = BTreeMap::new();
    for span in inside {
        match span.source {
            SpanSource::Page => {
                removed.insert(span.op_index, span.displacement);
            }
            SpanSource::Form { xobject, do_index } => {
                forms
                    .entry(do_index)
                    .or_insert_with(|| (xobject, HashMap::new()))
                    .1
                    .insert(span.op_index, span.displacement);
            }
            // Covered by the white fill only.
            SpanSource::NestedForm => {}
        }
    }

    let mut page_operations = content.operations;
    for (do_index, (xobject, form_removed)) in &forms {
        let copy = redacted_form(doc, *xobject, form_removed)?;
        let name = add_resource(doc, content.page_id, b"XObject", FORM_RESOURCE, copy)?;
        if let Some(op) = page_operations.get_mut(*do_index) {
            op.operands = vec![Object::Name(name)];
        }
    }

    let mut operations = vec![Operation::new("q", vec![])];
    operations.extend(redact_operations(page_operations, &removed));
    operations.push(Operation::new("Q", vec![]));
    operations.extend(white_out(&rects));

    let font_resource = add_resource(doc, content.page_id, b"Font", FONT_RESOURCE, font_id)?;
    for edit in edits {
        let fitted = fit_text(edit.text, edit.rect, edit.font_size, &options.fit);
        if !fitted.fit {
            log::warn!(
                "Line {} does not fit its rectangle, drawn at {:.2}pt",
                edit.line_number,
                fitted.font_size
            );
        }

        let (ops, missing) = text_operations(
            &font_resource,
            &fitted,
            edit.rect,
            edit.color,
            options.fit.line_height,
        );
        if missing > 0 {
            log::warn!(
                "Line {}: {} characters have no {} glyph and were replaced",
                edit.line_number,
                missing,
                HELVETICA
            );
        }
        operations.extend(ops);

        applied.push(AppliedEdit::PdfLine {
            line_number: edit.line_number,
            page_index,
            font_size_used: (fitted.font_size * 100.0).round() / 100.0,
            fit: fitted.fit,
        });
    }

    let data = Content { operations }
        .encode()
        .map_err(|e| Error::PdfParse(e.to_string()))?;
    let stream_id = doc.add_object(Stream::new(dictionary! {}, data));
    doc.get_object_mut(content.page_id)
        .and_then(Object::as_dict_mut)?
        .set("Contents", Object::Reference(stream_id));
    Ok(())
}

/// Spans whose origin lies in one of the rectangles.
fn spans_inside<'s>(spans: &'s [TextSpan], rects: &[BBox]) -> Vec<&'s TextSpan> {
    spans
        .iter()
        .filter(|span| {
            rects.iter().any(|r| {
                span.x >= r[0] - REDACTION_TOLERANCE
                    && span.x <= r[2] + REDACTION_TOLERANCE
                    && span.y >= r[1] - REDACTION_TOLERANCE
                    && span.y <= r[3] + REDACTION_TOLERANCE
            })
        })
        .collect()
}

/// Copy a form with some of its text operators redacted.
///
/// The form may be painted elsewhere too, so the original is left alone.
fn redacted_form(
    doc: &mut Document,
    xobject: ObjectId,
    removed: &HashMap<usize, f32>,
) -> Result<ObjectId> {
    let stream = doc.get_object(xobject).and_then(Object::as_stream)?;
    let operations = stream_operations(stream)?;
    let mut dict = stream.dict.clone();
    dict.remove(b"Filter");
    dict.remove(b"DecodeParms");

    let data = Content {
        operations: redact_operations(operations, removed),
    }
    .encode()
    .map_err(|e| Error::PdfParse(e.to_string()))?;
    Ok(doc.add_object(Stream::new(dict, data)))
}

/// Replace removed text-showing operators with pure position moves.
///
/// Each removed operator becomes a `TJ` holding only its displacement, so
/// text drawn later in the same text object keeps its position.
fn redact_operations(operations: Vec<Operation>, removed: &HashMap<usize, f32>) -> Vec<Operation> {
    let mut result = Vec::with_capacity(operations.len());
    for (index, op) in operations.into_iter().enumerate() {
        let Some(&displacement) = removed.get(&index) else {
            result.push(op);
            continue;
        };
        let shift = Operation::new("TJ", vec![Object::Array(vec![Object::Real(displacement)])]);
        match op.operator.as_str() {
            "'" => {
                result.push(Operation::new("T*", vec![]));
            }
            "\"" => {
                let mut operands = op.operands.into_iter();
                if let (Some(aw), Some(ac)) = (operands.next(), operands.next()) {
                    result.push(Operation::new("Tw", vec![aw]));
                    result.push(Operation::new("Tc", vec![ac]));
                }
                result.push(Operation::new("T*", vec![]));
            }
            _ => {}
        }
        result.push(shift);
    }
    result
}

/// Paint every rectangle white in one fill.
fn white_out(rects: &[BBox]) -> Vec<Operation> {
    let mut ops = vec![
        Operation::new("q", vec![]),
        Operation::new(
            "rg",
            vec![Object::Integer(1), Object::Integer(1), Object::Integer(1)],
        ),
    ];
    for r in rects {
        ops.push(Operation::new(
            "re",
            vec![
                Object::Real(r[0]),
                Object::Real(r[1]),
                Object::Real(r[2] - r[0]),
                Object::Real(r[3] - r[1]),
            ],
        ));
    }
    ops.push(Operation::new("f", vec![]));
    ops.push(Operation::new("Q", vec![]));
    ops
}

/// Register an object in one category of the page's own resources.
///
/// Inherited or shared resource dictionaries are copied onto the page
/// before they are changed. Returns the resource name used.
fn add_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &[u8],
    prefix: &str,
    target: ObjectId,
) -> Result<Vec<u8>> {
    let mut resources = page_resources(doc, page_id)
        .cloned()
        .unwrap_or_else(Dictionary::new);
    let mut entries = match resources.get(category) {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id)?.clone(),
        Ok(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };

    let name = fresh_name(&entries, prefix);
    entries.set(name.clone(), Object::Reference(target));
    resources.set(category.to_vec(), Object::Dictionary(entries));
    doc.get_object_mut(page_id)
        .and_then(Object::as_dict_mut)?
        .set("Resources", Object::Dictionary(resources));
    Ok(name)
}

fn fresh_name(entries: &Dictionary, prefix: &str) -> Vec<u8> {
    let base = prefix.as_bytes().to_vec();
    if !entries.has(&base) {
        return base;
    }
    (1..)
        .map(|n| format!("{}{}", prefix, n).into_bytes())
        .find(|name| !entries.has(name))
        .unwrap_or(base)
}

/// Save with unused objects dropped, objects renumbered and streams compressed.
pub fn save_compacted(doc: &mut Document, output: &Path) -> Result<()> {
    let pruned = doc.prune_objects();
    doc.delete_zero_length_streams();
    doc.renumber_objects();
    doc.compress();
    log::debug!("Pruned {} unreferenced objects", pruned.len());
    doc.save(output)?;
    Ok(())
}
