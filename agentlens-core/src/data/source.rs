//! Data source abstraction for reading raw cell grids from various file formats.
//!
//! Sources do not interpret headers: they return every row as read, and
//! [`crate::data::header`] decides which row names the columns.

use crate::config::InputConfig;
use crate::error::DataLoadError;
use calamine::{Data, Range, Reader, open_workbook_auto};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// File formats understood by [`open_source`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Workbook,
    Delimited,
    Json,
    Jsonl,
}

impl SourceFormat {
    /// Pick a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(Self::Workbook),
            "csv" | "tsv" | "txt" => Some(Self::Delimited),
            "json" => Some(Self::Json),
            "jsonl" | "ndjson" => Some(Self::Jsonl),
            _ => None,
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Workbook => write!(f, "workbook"),
            SourceFormat::Delimited => write!(f, "delimited"),
            SourceFormat::Json => write!(f, "json"),
            SourceFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

/// Rows exactly as read from the source, header included.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSheet {
    pub rows: Vec<Vec<Value>>,
}

impl RawSheet {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(is_blank))
    }
}

/// Whether a cell carries no data (null or whitespace-only text).
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Information about a data source, carried into the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSourceInfo {
    pub source_type: SourceFormat,
    pub location: String,
    pub accessed_at: chrono::DateTime<chrono::Utc>,
}

/// Trait for reading a raw grid from a source.
pub trait DataSource {
    /// Read every row of the source.
    fn read(&self) -> Result<RawSheet, DataLoadError>;

    /// Return metadata about this source.
    fn source_info(&self) -> DataSourceInfo;
}

/// Build the right source for `path` from its extension and the input settings.
pub fn open_source(path: &Path, input: &InputConfig) -> Result<Box<dyn DataSource>, DataLoadError> {
    if !path.exists() {
        return Err(DataLoadError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string();
    let format =
        SourceFormat::from_extension(&ext).ok_or_else(|| DataLoadError::UnsupportedFormat {
            path: path.to_path_buf(),
            extension: ext.clone(),
        })?;

    tracing::debug!(path = %path.display(), %format, "Opening data source");

    let source: Box<dyn DataSource> = match format {
        SourceFormat::Workbook => Box::new(WorkbookSource {
            path: path.to_path_buf(),
            sheet: input.sheet.clone(),
        }),
        SourceFormat::Delimited => {
            let delimiter = input
                .delimiter
                .unwrap_or(if ext.eq_ignore_ascii_case("tsv") { '\t' } else { ',' });
            Box::new(DelimitedSource {
                path: path.to_path_buf(),
                delimiter,
            })
        }
        SourceFormat::Json => Box::new(JsonSource {
            path: path.to_path_buf(),
        }),
        SourceFormat::Jsonl => Box::new(JsonlSource {
            path: path.to_path_buf(),
        }),
    };
    Ok(source)
}

fn info(format: SourceFormat, path: &Path) -> DataSourceInfo {
    DataSourceInfo {
        source_type: format,
        location: path.display().to_string(),
        accessed_at: chrono::Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// WorkbookSource
// ---------------------------------------------------------------------------

/// Excel / OpenDocument workbook source.
pub struct WorkbookSource {
    pub path: PathBuf,
    /// Sheet to read; the first sheet when `None`.
    pub sheet: Option<String>,
}

impl DataSource for WorkbookSource {
    fn read(&self) -> Result<RawSheet, DataLoadError> {
        let spreadsheet_err = |e: calamine::Error| DataLoadError::Spreadsheet {
            path: self.path.clone(),
            message: e.to_string(),
        };

        let mut workbook = open_workbook_auto(&self.path).map_err(spreadsheet_err)?;

        let range = match &self.sheet {
            Some(name) => {
                if !workbook.sheet_names().iter().any(|s| s == name) {
                    return Err(DataLoadError::SheetNotFound {
                        sheet: name.clone(),
                    });
                }
                workbook.worksheet_range(name).map_err(spreadsheet_err)?
            }
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| DataLoadError::NoSheet {
                    path: self.path.clone(),
                })?
                .map_err(spreadsheet_err)?,
        };

        Ok(RawSheet {
            rows: range_to_rows(&range),
        })
    }

    fn source_info(&self) -> DataSourceInfo {
        info(SourceFormat::Workbook, &self.path)
    }
}

/// Rows in sheet coordinates. A calamine range starts at its first non-empty
/// cell, so leading blank rows and columns are restored as padding.
fn range_to_rows(range: &Range<Data>) -> Vec<Vec<Value>> {
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut rows: Vec<Vec<Value>> = (0..start_row).map(|_| Vec::new()).collect();
    rows.extend(range.rows().map(|row| {
        std::iter::repeat_n(Value::Null, start_col as usize)
            .chain(row.iter().map(cell_to_value))
            .collect()
    }));
    rows
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Bool(b) => Value::Bool(*b),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Data::Error(_) => Value::Null,
        other => Value::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// DelimitedSource
// ---------------------------------------------------------------------------

/// CSV / TSV file source.
pub struct DelimitedSource {
    pub path: PathBuf,
    pub delimiter: char,
}

impl DataSource for DelimitedSource {
    fn read(&self) -> Result<RawSheet, DataLoadError> {
        let delimiter = u8::try_from(self.delimiter).map_err(|_| DataLoadError::Spreadsheet {
            path: self.path.clone(),
            message: format!("delimiter {:?} is not a single-byte character", self.delimiter),
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_path(&self.path)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(
                record
                    .iter()
                    .map(|field| {
                        if field.trim().is_empty() {
                            Value::Null
                        } else {
                            Value::String(field.to_string())
                        }
                    })
                    .collect(),
            );
        }
        Ok(RawSheet { rows })
    }

    fn source_info(&self) -> DataSourceInfo {
        info(SourceFormat::Delimited, &self.path)
    }
}

// ---------------------------------------------------------------------------
// JsonSource / JsonlSource
// ---------------------------------------------------------------------------

/// JSON file holding an array of objects.
pub struct JsonSource {
    pub path: PathBuf,
}

impl DataSource for JsonSource {
    fn read(&self) -> Result<RawSheet, DataLoadError> {
        let content = std::fs::read_to_string(&self.path)?;
        let value: Value = serde_json::from_str(&content)?;
        match value {
            Value::Array(items) => objects_to_sheet(items),
            _ => Err(DataLoadError::JsonShape),
        }
    }

    fn source_info(&self) -> DataSourceInfo {
        info(SourceFormat::Json, &self.path)
    }
}

/// JSON Lines file, one object per line.
pub struct JsonlSource {
    pub path: PathBuf,
}

impl DataSource for JsonlSource {
    fn read(&self) -> Result<RawSheet, DataLoadError> {
        let content = std::fs::read_to_string(&self.path)?;
        let mut items = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value = serde_json::from_str(line).map_err(|source| DataLoadError::JsonLine {
                line: idx + 1,
                source,
            })?;
            items.push(value);
        }
        objects_to_sheet(items)
    }

    fn source_info(&self) -> DataSourceInfo {
        info(SourceFormat::Jsonl, &self.path)
    }
}

/// Flatten objects into a grid whose first row is the union of their keys.
///
/// Keys within an object come out sorted (`serde_json::Map` is ordered by key);
/// keys first seen in later objects are appended after earlier ones.
fn objects_to_sheet(items: Vec<Value>) -> Result<RawSheet, DataLoadError> {
    let mut columns: Vec<String> = Vec::new();
    for item in &items {
        let Value::Object(map) = item else {
            return Err(DataLoadError::JsonShape);
        };
        for key in map.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }

    let mut rows = Vec::with_capacity(items.len() + 1);
    rows.push(columns.iter().cloned().map(Value::String).collect());
    for item in &items {
        rows.push(
            columns
                .iter()
                .map(|col| item.get(col).cloned().unwrap_or(Value::Null))
                .collect(),
        );
    }
    Ok(RawSheet { rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;
    use serde_json::json;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            SourceFormat::from_extension("XLSX"),
            Some(SourceFormat::Workbook)
        );
        assert_eq!(
            SourceFormat::from_extension("ods"),
            Some(SourceFormat::Workbook)
        );
        assert_eq!(
            SourceFormat::from_extension("tsv"),
            Some(SourceFormat::Delimited)
        );
        assert_eq!(
            SourceFormat::from_extension("ndjson"),
            Some(SourceFormat::Jsonl)
        );
        assert_eq!(SourceFormat::from_extension("parquet"), None);
    }

    #[test]
    fn test_open_source_missing_file() {
        let err = match open_source(Path::new("/nonexistent/data.xlsx"), &InputConfig::default())
        {
            Err(e) => e,
            Ok(_) => panic!("expected an error"),
        };
        assert!(matches!(err, DataLoadError::NotFound { .. }));
    }

    #[test]
    fn test_open_source_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.parquet");
        std::fs::write(&path, b"PAR1").unwrap();
        let err = match open_source(&path, &InputConfig::default()) {
            Err(e) => e,
            Ok(_) => panic!("expected an error"),
        };
        assert!(
            matches!(err, DataLoadError::UnsupportedFormat { ref extension, .. } if extension == "parquet")
        );
    }

    #[test]
    fn test_csv_source_reads_quoted_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        std::fs::write(
            &path,
            "agent_type,task_category\n\"Planner, v2\",Research\nCoder,\n",
        )
        .unwrap();

        let sheet = open_source(&path, &InputConfig::default())
            .unwrap()
            .read()
            .unwrap();
        assert_eq!(sheet.row_count(), 3);
        assert_eq!(sheet.rows[1][0], json!("Planner, v2"));
        assert_eq!(sheet.rows[2][1], Value::Null);
    }

    #[test]
    fn test_tsv_defaults_to_tab() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.tsv");
        std::fs::write(&path, "a\tb\n1\t2\n").unwrap();
        let sheet = open_source(&path, &InputConfig::default())
            .unwrap()
            .read()
            .unwrap();
        assert_eq!(sheet.rows[1], vec![json!("1"), json!("2")]);
    }

    #[test]
    fn test_json_source_unions_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, r#"[{"a": 1}, {"a": 2, "b": true}]"#).unwrap();
        let sheet = JsonSource { path }.read().unwrap();
        assert_eq!(sheet.rows[0], vec![json!("a"), json!("b")]);
        assert_eq!(sheet.rows[1], vec![json!(1), Value::Null]);
        assert_eq!(sheet.rows[2], vec![json!(2), json!(true)]);
    }

    #[test]
    fn test_json_source_rejects_scalar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        std::fs::write(&path, "42").unwrap();
        assert!(matches!(
            JsonSource { path }.read(),
            Err(DataLoadError::JsonShape)
        ));
    }

    #[test]
    fn test_jsonl_source_reports_bad_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.jsonl");
        std::fs::write(&path, "{\"a\": 1}\n\n{broken\n").unwrap();
        let err = JsonlSource { path }.read().unwrap_err();
        assert!(matches!(err, DataLoadError::JsonLine { line: 3, .. }));
    }

    #[test]
    fn test_json_columns_are_sorted_per_object() {
        let sheet = objects_to_sheet(vec![
            json!({"score": 1, "agent_type": "Planner"}),
            json!({"model_architecture": "Dense", "agent_type": "Coder"}),
        ])
        .unwrap();
        assert_eq!(
            sheet.rows[0],
            vec![json!("agent_type"), json!("score"), json!("model_architecture")]
        );
        assert_eq!(sheet.rows[2], vec![json!("Coder"), Value::Null, json!("Dense")]);
    }

    /// Two sheets: "Agents" with a blank first row, then "Other" offset by one column.
    fn write_workbook(path: &Path) {
        let mut workbook = Workbook::new();
        {
            let sheet = workbook.add_worksheet();
            sheet.set_name("Agents").unwrap();
            sheet.write_string(1, 0, "agent_type").unwrap();
            sheet.write_string(1, 1, "multimodal_capability").unwrap();
            sheet.write_string(1, 2, "bias_detection_score").unwrap();
            sheet.write_string(2, 0, "Planner").unwrap();
            sheet.write_boolean(2, 1, true).unwrap();
            sheet.write_number(2, 2, 0.5).unwrap();
        }
        {
            let sheet = workbook.add_worksheet();
            sheet.set_name("Other").unwrap();
            sheet.write_string(0, 1, "x").unwrap();
        }
        workbook.save(path).unwrap();
    }

    #[test]
    fn test_workbook_first_sheet_keeps_sheet_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents.xlsx");
        write_workbook(&path);

        let sheet = open_source(&path, &InputConfig::default())
            .unwrap()
            .read()
            .unwrap();
        assert_eq!(sheet.row_count(), 3);
        assert!(sheet.rows[0].iter().all(is_blank));
        assert_eq!(sheet.rows[1][0], json!("agent_type"));
        assert_eq!(sheet.rows[2], vec![json!("Planner"), json!(true), json!(0.5)]);
    }

    #[test]
    fn test_workbook_named_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents.xlsx");
        write_workbook(&path);

        let sheet = WorkbookSource {
            path,
            sheet: Some("Other".into()),
        }
        .read()
        .unwrap();
        assert_eq!(sheet.rows, vec![vec![Value::Null, json!("x")]]);
    }

    #[test]
    fn test_workbook_missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents.xlsx");
        write_workbook(&path);

        let err = WorkbookSource {
            path,
            sheet: Some("Missing".into()),
        }
        .read()
        .unwrap_err();
        assert!(matches!(err, DataLoadError::SheetNotFound { ref sheet } if sheet == "Missing"));
    }

    #[test]
    fn test_range_to_rows_pads_leading_blanks() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("agent_type".into()));
        range.set_value((3, 2), Data::Int(4));

        let rows = range_to_rows(&range);
        assert_eq!(rows.len(), 4);
        assert!(rows[0].is_empty() && rows[1].is_empty());
        assert_eq!(rows[2], vec![Value::Null, json!("agent_type"), Value::Null]);
        assert_eq!(rows[3], vec![Value::Null, Value::Null, json!(4)]);
    }

    #[test]
    fn test_range_to_rows_empty_range() {
        let range: Range<Data> = Range::empty();
        assert!(range_to_rows(&range).is_empty());
    }

    #[test]
    fn test_cell_to_value_variants() {
        assert_eq!(cell_to_value(&Data::Int(3)), json!(3));
        assert_eq!(cell_to_value(&Data::Float(0.25)), json!(0.25));
        assert_eq!(cell_to_value(&Data::Float(f64::NAN)), Value::Null);
        assert_eq!(cell_to_value(&Data::Bool(false)), json!(false));
        assert_eq!(cell_to_value(&Data::String("Coder".into())), json!("Coder"));
        assert_eq!(cell_to_value(&Data::Empty), Value::Null);
        assert_eq!(
            cell_to_value(&Data::Error(calamine::CellErrorType::Div0)),
            Value::Null
        );
    }

    #[test]
    fn test_workbook_source_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();
        let err = WorkbookSource { path, sheet: None }.read().unwrap_err();
        assert!(matches!(err, DataLoadError::Spreadsheet { .. }));
    }

    #[test]
    fn test_raw_sheet_blank_detection() {
        let sheet = RawSheet {
            rows: vec![vec![Value::Null, json!("   ")]],
        };
        assert!(sheet.is_empty());
        assert!(!is_blank(&json!(0)));
    }

    #[test]
    fn test_source_info_location() {
        let src = DelimitedSource {
            path: PathBuf::from("data.csv"),
            delimiter: ',',
        };
        let info = src.source_info();
        assert_eq!(info.source_type, SourceFormat::Delimited);
        assert_eq!(info.location, "data.csv");
    }
}
