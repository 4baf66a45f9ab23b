//! # docline
//!
//! Line-addressable editing of DOCX and PDF documents.
//!
//! Extraction turns a document into plain text, one line per addressable
//! unit, together with a mapping from each 1-based line number back to the
//! structure that owns it: a paragraph in a DOCX, a positioned text line in
//! a PDF. Edits written against that text are later re-applied to the
//! original document while keeping its formatting.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docline::{apply_file, extract_file, ApplyOptions, EditBatch};
//!
//! fn main() -> docline::Result<()> {
//!     let extraction = extract_file("resume.docx")?;
//!     println!("{}", extraction.text);
//!
//!     let edits = EditBatch::new()
//!         .with_edit(2, "Skills: Go, Rust")
//!         .with_insertion(2, "- Led the platform migration");
//!     let result = apply_file(
//!         "resume.docx",
//!         &extraction.line_mappings,
//!         &edits,
//!         "out/resume.docx",
//!         &ApplyOptions::default(),
//!     )?;
//!     println!("applied {}", result.applied_count());
//!     Ok(())
//! }
//! ```
//!
//! ## Formats
//!
//! - **DOCX**: one line per paragraph, empty paragraphs and table cell
//!   paragraphs included. Replacements keep the first run's formatting and
//!   insertions clone the anchor paragraph.
//! - **PDF**: one line per non-empty visual text line. Replacements are
//!   redacted and redrawn inside the original line rectangle, shrinking the
//!   font until the text fits.

pub mod detect;
pub mod docx;
pub mod error;
pub mod model;
pub mod options;
pub mod pdf;
pub mod pipeline;
pub mod text;

// Re-export commonly used types
pub use detect::{detect_kind_from_path, DocumentKind};
pub use error::{Error, Result};
pub use model::{
    Anchor, AppliedEdit, ApplyResult, BBox, EditBatch, ExtractionMeta, ExtractionResult,
    InsertedLine, Insertion, LineEdit, LineMapping,
};
pub use options::{ApplyOptions, FitOptions, InsertionPolicy};
pub use pipeline::{DocumentPipeline, PipelineRegistry};

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Extract the lines of a DOCX or PDF file.
///
/// The format is chosen from the lowercase file extension.
///
/// # Example
///
/// ```no_run
/// use docline::extract_file;
///
/// let result = extract_file("resume.pdf").unwrap();
/// println!("Lines: {}", result.line_count());
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<ExtractionResult> {
    PipelineRegistry::with_defaults().extract(path.as_ref())
}

/// Apply an edit batch to a DOCX or PDF file and write the result to `output`.
///
/// Edits and insertions that reference unknown lines are skipped; only
/// realized changes are reported in the returned [`ApplyResult`].
pub fn apply_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    mappings: &[LineMapping],
    edits: &EditBatch,
    output: Q,
    options: &ApplyOptions,
) -> Result<ApplyResult> {
    PipelineRegistry::with_defaults().apply(
        input.as_ref(),
        mappings,
        edits,
        output.as_ref(),
        options,
    )
}

/// Load line mappings from a JSON file.
///
/// The file may hold a full extraction result or just an object with a
/// `lineMappings` array.
pub fn load_mappings<P: AsRef<Path>>(path: P) -> Result<Vec<LineMapping>> {
    let value = read_json(path.as_ref())?;
    Ok(model::line_mappings_from_value(&value))
}

/// Load an edit batch from a JSON file.
///
/// The file may hold a bare array of line edits or an object with
/// `lineEdits` and `insertions`.
pub fn load_edits<P: AsRef<Path>>(path: P) -> Result<EditBatch> {
    let value = read_json(path.as_ref())?;
    EditBatch::from_value(&value)
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
