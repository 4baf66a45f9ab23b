//! Format dispatch for the extract and apply operations.
//!
//! Each document format implements [`DocumentPipeline`]; the
//! [`PipelineRegistry`] picks one by lowercase file extension.
//!
//! # Example
//!
//! ```no_run
//! use docline::pipeline::PipelineRegistry;
//! use std::path::Path;
//!
//! fn main() -> docline::Result<()> {
//!     let registry = PipelineRegistry::default();
//!     let result = registry.extract(Path::new("resume.docx"))?;
//!     println!("{} lines", result.line_count());
//!     Ok(())
//! }
//! ```

use crate::detect::{sniff_kind_from_path, DocumentKind};
use crate::docx::DocxPipeline;
use crate::error::{Error, Result};
use crate::model::{ApplyResult, EditBatch, ExtractionResult, LineMapping};
use crate::options::ApplyOptions;
use crate::pdf::PdfPipeline;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Trait for a document format's extract and apply operations.
///
/// Implementations open their own document handle per call and release it
/// before returning.
pub trait DocumentPipeline: Send + Sync {
    /// The document kind this pipeline handles.
    fn kind(&self) -> DocumentKind;

    /// Supported file extensions, lowercase without the leading dot.
    fn supported_extensions(&self) -> &[&str];

    /// Extract the document's lines and their anchors.
    fn extract(&self, path: &Path) -> Result<ExtractionResult>;

    /// Apply an edit batch to `input` and write the new document to `output`.
    fn apply(
        &self,
        input: &Path,
        mappings: &[LineMapping],
        edits: &EditBatch,
        output: &Path,
        options: &ApplyOptions,
    ) -> Result<ApplyResult>;

    /// Check if this pipeline supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry mapping file extensions to pipelines.
pub struct PipelineRegistry {
    pipelines: HashMap<String, Arc<dyn DocumentPipeline>>,
}

impl PipelineRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            pipelines: HashMap::new(),
        }
    }

    /// Create a registry with the DOCX and PDF pipelines.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DocxPipeline::new()));
        registry.register(Arc::new(PdfPipeline::new()));
        registry
    }

    /// Register a pipeline for all its supported extensions.
    pub fn register(&mut self, pipeline: Arc<dyn DocumentPipeline>) {
        for ext in pipeline.supported_extensions() {
            self.pipelines.insert(ext.to_lowercase(), pipeline.clone());
        }
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.pipelines.contains_key(&ext.to_lowercase())
    }

    /// Get a pipeline by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentPipeline>> {
        self.pipelines.get(&ext.to_lowercase()).cloned()
    }

    /// Resolve the pipeline for a path from its extension.
    ///
    /// Fails with `Error::UnsupportedFormat` before the file is touched.
    pub fn for_path(&self, path: &Path) -> Result<Arc<dyn DocumentPipeline>> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();
        self.get_by_extension(&ext).ok_or_else(|| {
            Error::UnsupportedFormat(if ext.is_empty() {
                "<none>".to_string()
            } else {
                format!(".{}", ext)
            })
        })
    }

    /// Extract a document with the pipeline chosen by its extension.
    pub fn extract(&self, path: &Path) -> Result<ExtractionResult> {
        let pipeline = self.for_path(path)?;
        warn_on_mismatch(path, pipeline.kind());
        pipeline.extract(path)
    }

    /// Apply edits with the pipeline chosen by the input's extension.
    pub fn apply(
        &self,
        input: &Path,
        mappings: &[LineMapping],
        edits: &EditBatch,
        output: &Path,
        options: &ApplyOptions,
    ) -> Result<ApplyResult> {
        let pipeline = self.for_path(input)?;
        warn_on_mismatch(input, pipeline.kind());
        pipeline.apply(input, mappings, edits, output, options)
    }
}

impl Default for PipelineRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Log when a file's leading bytes contradict its extension.
fn warn_on_mismatch(path: &Path, expected: DocumentKind) {
    if let Ok(Some(sniffed)) = sniff_kind_from_path(path) {
        if sniffed != expected {
            log::warn!(
                "{} has a .{} extension but looks like a {} file",
                path.display(),
                expected.extension(),
                sniffed
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_with_defaults() {
        let registry = PipelineRegistry::with_defaults();
        assert!(registry.supports("docx"));
        assert!(registry.supports("PDF"));
        assert!(!registry.supports("doc"));
    }

    #[test]
    fn test_for_path_dispatches_on_extension() {
        let registry = PipelineRegistry::default();
        let docx = registry.for_path(Path::new("cv.DOCX")).unwrap();
        assert_eq!(docx.kind(), DocumentKind::Docx);
        let pdf = registry.for_path(Path::new("out/cv.pdf")).unwrap();
        assert_eq!(pdf.kind(), DocumentKind::Pdf);
    }

    #[test]
    fn test_unsupported_extension() {
        let registry = PipelineRegistry::default();
        match registry.for_path(Path::new("notes.txt")) {
            Err(Error::UnsupportedFormat(ext)) => assert_eq!(ext, ".txt"),
            other => panic!("unexpected: {:?}", other.map(|p| p.kind())),
        }
        assert!(matches!(
            registry.for_path(Path::new("README")),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_empty_registry_rejects_known_kind() {
        let registry = PipelineRegistry::new();
        assert!(registry.for_path(Path::new("cv.pdf")).is_err());
    }

    #[test]
    fn test_supports_extension_ignores_case() {
        assert!(PdfPipeline::new().supports_extension("Pdf"));
        assert!(!DocxPipeline::new().supports_extension("pdf"));
    }
}
