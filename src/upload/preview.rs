use crate::upload::types::{RawRow, UploadTypeDescriptor};

pub const DEFAULT_PREVIEW_ROWS: usize = 10;

/// The leading slice of a batch shown before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview<'a> {
    pub rows: &'a [RawRow],
    pub total_rows: usize,
    pub truncated: bool,
}

pub fn project_preview(rows: &[RawRow], limit: usize) -> Preview<'_> {
    let shown = rows.len().min(limit);
    Preview {
        rows: &rows[..shown],
        total_rows: rows.len(),
        truncated: rows.len() > limit,
    }
}

impl<'a> Preview<'a> {
    /// Cells laid out in the descriptor's column order, one `Vec` per row.
    pub fn table(&self, descriptor: &UploadTypeDescriptor) -> Vec<Vec<&'a str>> {
        self.rows
            .iter()
            .map(|row| descriptor.required_labels().map(|l| row.get(l)).collect())
            .collect()
    }

    pub fn hidden_rows(&self) -> usize {
        self.total_rows - self.rows.len()
    }
}
