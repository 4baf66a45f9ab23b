//! Integration tests for the DOCX pipeline.

mod common;

use common::{bold_paragraph, list_paragraph, paragraph, read_part, table, write_docx, STYLES};
use docline::docx::{apply_docx, extract_docx};
use docline::{Anchor, AppliedEdit, EditBatch, Error, InsertedLine};
use tempfile::tempdir;

fn lines(path: &std::path::Path) -> Vec<String> {
    extract_docx(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_extract_counts_every_paragraph() {
    let dir = tempdir().unwrap();
    let body = [
        paragraph("Jane Doe"),
        paragraph(""),
        table(&[&["Role", "Years"], &["Engineer", "5"]]),
        paragraph("References"),
    ]
    .concat();
    let path = write_docx(dir.path(), "cv.docx", &body);

    let result = extract_docx(&path).unwrap();
    assert_eq!(result.line_count(), 7);
    assert_eq!(result.meta.paragraph_count, Some(7));
    assert_eq!(
        result.text,
        "Jane Doe\n\nRole\nYears\nEngineer\n5\nReferences"
    );
    assert_eq!(result.lines().count(), result.line_mappings.len());

    for (i, mapping) in result.line_mappings.iter().enumerate() {
        assert_eq!(mapping.line_number as usize, i + 1);
        assert_eq!(mapping.paragraph_index(), Some(i));
    }
    assert!(matches!(
        result.line_mappings[1].anchor,
        Anchor::DocxParagraph { is_empty: true, .. }
    ));
}

#[test]
fn test_nested_and_merged_cells_visited_once() {
    let dir = tempdir().unwrap();
    let nested = table(&[&["inner"]]);
    let body = format!(
        concat!(
            "<w:tbl>",
            "<w:tr><w:tc><w:tcPr><w:gridSpan w:val=\"2\"/></w:tcPr>{wide}</w:tc>",
            "<w:tc><w:tcPr><w:vMerge w:val=\"restart\"/></w:tcPr>{tall}</w:tc></w:tr>",
            "<w:tr><w:tc>{a}{nested}</w:tc><w:tc>{b}</w:tc>",
            "<w:tc><w:tcPr><w:vMerge/></w:tcPr>{hidden}</w:tc></w:tr>",
            "</w:tbl>"
        ),
        wide = paragraph("wide"),
        tall = paragraph("tall"),
        a = paragraph("a"),
        nested = nested,
        b = paragraph("b"),
        hidden = paragraph(""),
    );
    let path = write_docx(dir.path(), "merged.docx", &body);

    assert_eq!(lines(&path), vec!["wide", "tall", "a", "inner", "b"]);
}

#[test]
fn test_replacement_scenario() {
    let dir = tempdir().unwrap();
    let body = [paragraph("Name: Jane"), paragraph("Skills: Python")].concat();
    let input = write_docx(dir.path(), "in.docx", &body);
    let output = dir.path().join("out.docx");

    let extraction = extract_docx(&input).unwrap();
    let edits = EditBatch::new().with_edit(2, "Skills: Go, Rust");
    let result = apply_docx(&input, &extraction.line_mappings, &edits, &output).unwrap();

    assert_eq!(
        result.applied,
        vec![AppliedEdit::Paragraph {
            line_number: 2,
            paragraph_index: 1
        }]
    );
    assert_eq!(lines(&output), vec!["Name: Jane", "Skills: Go, Rust"]);
}

#[test]
fn test_replacement_keeps_run_formatting_and_parts() {
    let dir = tempdir().unwrap();
    let body = [bold_paragraph("Summary"), paragraph("Old text")].concat();
    let input = write_docx(dir.path(), "in.docx", &body);
    let output = dir.path().join("out.docx");

    let extraction = extract_docx(&input).unwrap();
    let edits = EditBatch::new().with_edit(1, "Profile");
    apply_docx(&input, &extraction.line_mappings, &edits, &output).unwrap();

    let xml = read_part(&output, "word/document.xml");
    assert!(xml.contains("<w:b/>"));
    assert!(xml.contains("Profile"));
    assert!(!xml.contains("Summary"));
    assert_eq!(read_part(&output, "word/styles.xml"), STYLES);
}

#[test]
fn test_replacements_preserve_paragraph_count() {
    let dir = tempdir().unwrap();
    let body = [
        paragraph("one"),
        table(&[&["two", "three"]]),
        paragraph(""),
        paragraph("five"),
    ]
    .concat();
    let input = write_docx(dir.path(), "in.docx", &body);
    let output = dir.path().join("out.docx");

    let before = extract_docx(&input).unwrap();
    let edits = EditBatch::new()
        .with_edit(1, "ONE")
        .with_edit(3, "THREE\twith tab")
        .with_edit(4, "now filled")
        .with_edit(5, "");
    let result = apply_docx(&input, &before.line_mappings, &edits, &output).unwrap();
    assert_eq!(result.applied_count(), 4);

    let after = extract_docx(&output).unwrap();
    assert_eq!(after.line_count(), before.line_count());
    assert_eq!(
        after.lines().collect::<Vec<_>>(),
        vec!["ONE", "two", "THREE\twith tab", "now filled", ""]
    );
}

#[test]
fn test_insertions_follow_anchor_in_request_order() {
    let dir = tempdir().unwrap();
    let body = [paragraph("Experience"), paragraph("Education")].concat();
    let input = write_docx(dir.path(), "in.docx", &body);
    let output = dir.path().join("out.docx");

    let extraction = extract_docx(&input).unwrap();
    let edits = EditBatch::new()
        .with_insertion(1, "A")
        .with_insertion(1, "B")
        .with_insertion(2, "C");
    let result = apply_docx(&input, &extraction.line_mappings, &edits, &output).unwrap();

    assert_eq!(result.inserted_count(), 3);
    assert_eq!(
        result.inserted[0],
        InsertedLine {
            after_line_number: 1,
            paragraph_index: 0
        }
    );
    assert_eq!(lines(&output), vec!["Experience", "A", "B", "Education", "C"]);
}

#[test]
fn test_bullet_prefix_normalization() {
    let dir = tempdir().unwrap();
    let body = [list_paragraph("Built a compiler"), paragraph("- Plain dash")].concat();
    let input = write_docx(dir.path(), "in.docx", &body);
    let output = dir.path().join("out.docx");

    let extraction = extract_docx(&input).unwrap();
    let edits = EditBatch::new()
        .with_insertion(1, "- Did the thing")
        .with_insertion(2, "- Kept literal");
    apply_docx(&input, &extraction.line_mappings, &edits, &output).unwrap();

    assert_eq!(
        lines(&output),
        vec![
            "Built a compiler",
            "Did the thing",
            "- Plain dash",
            "- Kept literal"
        ]
    );
    // The inserted list item keeps the anchor's numbering.
    let xml = read_part(&output, "word/document.xml");
    assert_eq!(xml.matches("<w:numPr>").count(), 2);
}

#[test]
fn test_unknown_references_are_skipped() {
    let dir = tempdir().unwrap();
    let input = write_docx(dir.path(), "in.docx", &paragraph("Only line"));
    let output = dir.path().join("out.docx");

    let extraction = extract_docx(&input).unwrap();
    let edits = EditBatch::new()
        .with_edit(0, "zero")
        .with_edit(42, "missing")
        .with_insertion(9, "nowhere")
        .with_insertion(1, "   ");
    let result = apply_docx(&input, &extraction.line_mappings, &edits, &output).unwrap();

    assert_eq!(result.applied_count(), 0);
    assert_eq!(result.inserted_count(), 0);
    assert_eq!(lines(&output), vec!["Only line"]);
}

#[test]
fn test_empty_batch_is_textually_identical() {
    let dir = tempdir().unwrap();
    let body = [paragraph("a"), paragraph(""), table(&[&["b"]])].concat();
    let input = write_docx(dir.path(), "in.docx", &body);
    let output = dir.path().join("out.docx");

    let extraction = extract_docx(&input).unwrap();
    let result = apply_docx(&input, &extraction.line_mappings, &EditBatch::new(), &output).unwrap();

    assert_eq!(result.applied_count(), 0);
    assert_eq!(result.inserted_count(), 0);
    assert_eq!(extract_docx(&output).unwrap().text, extraction.text);
}

#[test]
fn test_apply_in_place() {
    let dir = tempdir().unwrap();
    let input = write_docx(dir.path(), "cv.docx", &paragraph("Draft"));

    let extraction = extract_docx(&input).unwrap();
    let edits = EditBatch::new().with_edit(1, "Final");
    apply_docx(&input, &extraction.line_mappings, &edits, &input).unwrap();

    assert_eq!(lines(&input), vec!["Final"]);
}

#[test]
fn test_corrupt_package_is_fatal() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.docx");
    std::fs::write(&path, b"PK\x03\x04 not really a zip").unwrap();

    let err = extract_docx(&path).unwrap_err();
    assert!(matches!(err, Error::Zip(_) | Error::Docx(_)));
}
