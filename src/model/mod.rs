//! Data model shared by both pipelines.
//!
//! Mappings are produced once by extraction and never mutated afterwards;
//! the applier only reads them while it edits a working copy of the document.

mod edit;
mod extraction;
mod mapping;
mod outcome;

pub use edit::{EditBatch, Insertion, LineEdit};
pub use extraction::{ExtractionMeta, ExtractionResult};
pub use mapping::{line_mappings_from_value, Anchor, BBox, LineMapping, MappingIndex};
pub use outcome::{AppliedEdit, ApplyResult, InsertedLine};
