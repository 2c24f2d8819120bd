use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One required column: the header label users type and a stable key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub label: String,
    pub key: String,
}

impl ColumnDescriptor {
    pub fn new(label: &str, key: &str) -> Self {
        Self {
            label: label.to_string(),
            key: key.to_string(),
        }
    }
}

/// Schema and template for one kind of bulk operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTypeDescriptor {
    pub key: String,
    pub label: String,
    pub template: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl UploadTypeDescriptor {
    pub fn required_labels(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.label.as_str())
    }
}

/// A spreadsheet row keyed by header label. Reads of absent labels yield "".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(BTreeMap<String, String>);

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.0.insert(label.into(), value.into());
    }

    pub fn get(&self, label: &str) -> &str {
        self.0.get(label).map(String::as_str).unwrap_or("")
    }

    pub fn contains_label(&self, label: &str) -> bool {
        self.0.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_blank(&self) -> bool {
        self.0.values().all(|v| v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Decoder output: header labels in sheet order plus the data rows.
/// Headers outside the schema end up in `ValidatedBatch::extra_columns`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedSheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid(Vec<RawRow>),
    Invalid(Vec<String>),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }
}

/// Validated rows bound to the upload type they were checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBatch {
    pub upload_type: String,
    pub file_name: String,
    pub rows: Vec<RawRow>,
    /// Header labels not in the schema. They are still submitted.
    pub extra_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReceipt {
    pub status: u16,
    pub body: Option<serde_json::Value>,
}
