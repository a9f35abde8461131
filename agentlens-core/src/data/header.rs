//! Header-row resolution: turn a raw grid into a batch with named columns.

use crate::data::source::{RawSheet, is_blank};
use crate::error::DataLoadError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A batch of data rows under a resolved header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataBatch {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    /// 0-based index of the header within the raw sheet.
    pub header_row: usize,
}

impl DataBatch {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of a column by exact (trimmed) name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name.trim())
    }
}

/// How the header row is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStrategy {
    /// Use this 0-based row.
    Fixed(usize),
    /// Scan this many leading rows for one naming every expected column.
    Detect { scan_rows: usize },
}

impl HeaderStrategy {
    pub fn from_config(header_row: Option<usize>, scan_rows: usize) -> Self {
        match header_row {
            Some(row) => Self::Fixed(row),
            None => Self::Detect { scan_rows },
        }
    }
}

/// Resolve the header of `sheet` and return the rows beneath it.
///
/// Fully blank data rows are dropped. Under [`HeaderStrategy::Detect`], when no
/// scanned row names every expected column, the first non-blank row is used and
/// column checks are left to the caller.
pub fn resolve_header(
    sheet: RawSheet,
    strategy: HeaderStrategy,
    expected: &[&str],
) -> Result<DataBatch, DataLoadError> {
    let total = sheet.row_count();
    let header_row = match strategy {
        HeaderStrategy::Fixed(row) => {
            if row >= total {
                return Err(DataLoadError::HeaderRowOutOfRange { row, rows: total });
            }
            row
        }
        HeaderStrategy::Detect { scan_rows } => detect_header_row(&sheet, scan_rows, expected)
            .or_else(|| first_non_blank_row(&sheet))
            .ok_or(DataLoadError::HeaderRowOutOfRange { row: 0, rows: total })?,
    };

    let mut rows = sheet.rows.into_iter().skip(header_row);
    let columns: Vec<String> = rows
        .next()
        .unwrap_or_default()
        .iter()
        .map(cell_text)
        .collect();

    let rows: Vec<Vec<Value>> = rows
        .filter(|row| !row.iter().all(is_blank))
        .collect();

    tracing::debug!(
        header_row,
        columns = columns.len(),
        rows = rows.len(),
        "Resolved header"
    );

    Ok(DataBatch {
        columns,
        rows,
        header_row,
    })
}

fn detect_header_row(sheet: &RawSheet, scan_rows: usize, expected: &[&str]) -> Option<usize> {
    sheet.rows.iter().take(scan_rows).position(|row| {
        let names: Vec<String> = row.iter().map(cell_text).collect();
        expected
            .iter()
            .all(|want| names.iter().any(|have| have == want.trim()))
    })
}

fn first_non_blank_row(sheet: &RawSheet) -> Option<usize> {
    sheet
        .rows
        .iter()
        .position(|row| !row.iter().all(is_blank))
}

/// Render a cell as trimmed text, as used for header names and category keys.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => match n.as_f64() {
            // Whole floats read from workbooks print without a trailing ".0".
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}
