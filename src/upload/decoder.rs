use crate::error::DecodeError;
use crate::upload::types::{DecodedSheet, RawRow};
use crate::utils::file_size::format_size;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

pub const DEFAULT_MAX_FILE_BYTES: u64 = 20 * 1024 * 1024;

const EMPTY_HEADER: &str = "__EMPTY";
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Turns the first worksheet of an uploaded file into rows keyed by the
/// header labels. The whole file is held in memory.
#[derive(Debug, Clone)]
pub struct SpreadsheetDecoder {
    max_bytes: u64,
}

impl Default for SpreadsheetDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_BYTES)
    }
}

impl SpreadsheetDecoder {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn decode(&self, file_name: &str, bytes: Vec<u8>) -> Result<DecodedSheet, DecodeError> {
        let size = bytes.len() as u64;
        if size > self.max_bytes {
            return Err(DecodeError::TooLarge {
                size: format_size(size),
                limit: format_size(self.max_bytes),
            });
        }

        let sheet = if Self::is_csv(file_name) {
            Self::decode_csv(&bytes)?
        } else {
            Self::decode_workbook(bytes)?
        };

        debug!(
            "Decoded '{}': {} columns, {} rows",
            file_name,
            sheet.headers.len(),
            sheet.rows.len()
        );
        Ok(sheet)
    }

    fn is_csv(file_name: &str) -> bool {
        Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false)
    }

    fn decode_workbook(bytes: Vec<u8>) -> Result<DecodedSheet, DecodeError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(DecodeError::NoWorksheet)??;

        let grid = range
            .rows()
            .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
        Ok(sheet_from_grid(grid))
    }

    fn decode_csv(bytes: &[u8]) -> Result<DecodedSheet, DecodeError> {
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut grid = Vec::new();
        for record in reader.records() {
            let record = record?;
            grid.push(record.iter().map(String::from).collect::<Vec<_>>());
        }
        Ok(sheet_from_grid(grid.into_iter()))
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        other => other.to_string(),
    }
}

/// First row becomes the header. Blank header cells and repeated labels are
/// renamed so every label in a row is distinct.
fn header_labels(raw: Vec<String>) -> Vec<String> {
    let mut used = HashSet::new();
    let mut labels = Vec::with_capacity(raw.len());

    for cell in raw {
        let base = if cell.is_empty() {
            EMPTY_HEADER.to_string()
        } else {
            cell
        };

        let mut label = base.clone();
        let mut suffix = 1;
        while used.contains(&label) {
            label = format!("{}_{}", base, suffix);
            suffix += 1;
        }

        used.insert(label.clone());
        labels.push(label);
    }

    labels
}

fn sheet_from_grid(mut grid: impl Iterator<Item = Vec<String>>) -> DecodedSheet {
    let headers = match grid.next() {
        Some(first) => header_labels(first),
        None => return DecodedSheet::default(),
    };

    let rows = grid
        .map(|cells| {
            headers
                .iter()
                .enumerate()
                .map(|(i, label)| (label.clone(), cells.get(i).cloned().unwrap_or_default()))
                .collect::<RawRow>()
        })
        .filter(|row| !row.is_blank())
        .collect();

    DecodedSheet { headers, rows }
}
