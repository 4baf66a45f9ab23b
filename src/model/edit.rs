//! Requested edits: replacements and insertions keyed by line number.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A full-text replacement for one line's anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineEdit {
    /// Line to replace
    pub line_number: u32,
    /// Replacement text
    pub new_text: String,
}

impl LineEdit {
    /// Create a replacement.
    pub fn new(line_number: u32, new_text: impl Into<String>) -> Self {
        Self {
            line_number,
            new_text: new_text.into(),
        }
    }
}

/// A new line placed immediately after an existing anchor (DOCX only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insertion {
    /// Line whose anchor the new line follows
    pub after_line_number: u32,
    /// Text of the new line
    pub new_text: String,
}

impl Insertion {
    /// Create an insertion.
    pub fn new(after_line_number: u32, new_text: impl Into<String>) -> Self {
        Self {
            after_line_number,
            new_text: new_text.into(),
        }
    }
}

/// The full set of edits for one apply run.
///
/// Accepts either a bare array of line edits or an object with
/// `lineEdits` and `insertions`. Entries with a non-integer line number
/// or non-string text are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "Value")]
pub struct EditBatch {
    /// Replacements in request order
    pub line_edits: Vec<LineEdit>,
    /// Insertions in request order
    pub insertions: Vec<Insertion>,
}

impl EditBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a replacement.
    pub fn with_edit(mut self, line_number: u32, new_text: impl Into<String>) -> Self {
        self.line_edits.push(LineEdit::new(line_number, new_text));
        self
    }

    /// Add an insertion.
    pub fn with_insertion(mut self, after_line_number: u32, new_text: impl Into<String>) -> Self {
        self.insertions
            .push(Insertion::new(after_line_number, new_text));
        self
    }

    /// Check if the batch requests nothing.
    pub fn is_empty(&self) -> bool {
        self.line_edits.is_empty() && self.insertions.is_empty()
    }

    /// Parse a batch from an already-loaded JSON value.
    pub fn from_value(value: &Value) -> crate::Result<Self> {
        match value {
            Value::Array(entries) => Ok(Self {
                line_edits: parse_entries(entries, "lineNumber", |line_number, new_text| {
                    LineEdit {
                        line_number,
                        new_text,
                    }
                }),
                insertions: Vec::new(),
            }),
            Value::Object(map) => Ok(Self {
                line_edits: parse_entries(
                    array_field(map, "lineEdits"),
                    "lineNumber",
                    |line_number, new_text| LineEdit {
                        line_number,
                        new_text,
                    },
                ),
                insertions: parse_entries(
                    array_field(map, "insertions"),
                    "afterLineNumber",
                    |after_line_number, new_text| Insertion {
                        after_line_number,
                        new_text,
                    },
                ),
            }),
            _ => Err(crate::Error::Other(
                "Edits must be an array of line edits or an object with lineEdits/insertions"
                    .to_string(),
            )),
        }
    }
}

impl TryFrom<Value> for EditBatch {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        Self::from_value(&value)
    }
}

fn array_field<'a>(map: &'a serde_json::Map<String, Value>, key: &str) -> &'a [Value] {
    match map.get(key) {
        Some(Value::Array(entries)) => entries,
        _ => &[],
    }
}

fn parse_entries<T>(entries: &[Value], key: &str, make: fn(u32, String) -> T) -> Vec<T> {
    entries
        .iter()
        .filter_map(|entry| {
            let line = entry.get(key).and_then(Value::as_u64);
            let text = entry.get("newText").and_then(Value::as_str);
            match (line.and_then(|n| u32::try_from(n).ok()), text) {
                (Some(line), Some(text)) => Some(make(line, text.to_string())),
                _ => {
                    log::debug!("Skipping malformed edit entry: {}", entry);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array_is_line_edits() {
        let batch: EditBatch =
            serde_json::from_value(json!([{"lineNumber": 2, "newText": "Skills: Go, Rust"}]))
                .unwrap();
        assert_eq!(batch.line_edits, vec![LineEdit::new(2, "Skills: Go, Rust")]);
        assert!(batch.insertions.is_empty());
    }

    #[test]
    fn test_object_with_insertions() {
        let batch: EditBatch = serde_json::from_value(json!({
            "lineEdits": [{"lineNumber": 1, "newText": "A"}],
            "insertions": [
                {"afterLineNumber": 4, "newText": "first"},
                {"afterLineNumber": 4, "newText": "second"}
            ]
        }))
        .unwrap();
        assert_eq!(batch.line_edits.len(), 1);
        assert_eq!(
            batch.insertions,
            vec![Insertion::new(4, "first"), Insertion::new(4, "second")]
        );
    }

    #[test]
    fn test_malformed_entries_skipped() {
        let batch = EditBatch::from_value(&json!([
            {"lineNumber": "1", "newText": "string line"},
            {"lineNumber": 2},
            {"lineNumber": -3, "newText": "negative"},
            {"lineNumber": 4, "newText": "kept"}
        ]))
        .unwrap();
        assert_eq!(batch.line_edits, vec![LineEdit::new(4, "kept")]);
    }

    #[test]
    fn test_scalar_payload_rejected() {
        assert!(EditBatch::from_value(&json!("nope")).is_err());
    }

    #[test]
    fn test_builder() {
        let batch = EditBatch::new().with_edit(1, "x").with_insertion(1, "y");
        assert!(!batch.is_empty());
        assert!(EditBatch::new().is_empty());
    }
}
