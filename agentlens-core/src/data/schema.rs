//! Column type inference for loaded datasets.

use crate::data::header::DataBatch;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Column data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Float,
    String,
    Boolean,
    Null,
}

/// Infer column type from a sample of values.
///
/// Text cells that parse as numbers or booleans count as such, since
/// delimited sources deliver every cell as text.
pub fn infer_column_type(values: &[&Value]) -> ColumnType {
    let non_null: Vec<_> = values.iter().filter(|v| !v.is_null()).collect();
    if non_null.is_empty() {
        return ColumnType::Null;
    }

    let mut has_int = false;
    let mut has_float = false;
    let mut has_bool = false;
    let mut has_string = false;

    for v in &non_null {
        match v {
            Value::Number(n) => {
                if n.is_f64() {
                    has_float = true;
                } else {
                    has_int = true;
                }
            }
            Value::Bool(_) => has_bool = true,
            Value::String(s) => {
                let s = s.trim();
                if s.parse::<i64>().is_ok() {
                    has_int = true;
                } else if s.parse::<f64>().is_ok() {
                    has_float = true;
                } else if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
                    has_bool = true;
                } else {
                    has_string = true;
                }
            }
            _ => has_string = true,
        }
    }

    if has_string || (has_bool && (has_int || has_float)) {
        return ColumnType::String;
    }
    if has_float {
        return ColumnType::Float;
    }
    if has_int {
        return ColumnType::Integer;
    }
    ColumnType::Boolean
}

/// Infer the type of every column in a batch.
pub fn infer_schema(batch: &DataBatch) -> BTreeMap<String, ColumnType> {
    batch
        .columns
        .iter()
        .enumerate()
        .filter(|(_, name)| !name.is_empty())
        .map(|(i, name)| {
            let values: Vec<&Value> = batch.rows.iter().filter_map(|row| row.get(i)).collect();
            (name.clone(), infer_column_type(&values))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_infer_column_type_int() {
        let values = [json!(1), json!(2), json!("3")];
        let refs: Vec<&Value> = values.iter().collect();
        assert_eq!(infer_column_type(&refs), ColumnType::Integer);
    }

    #[test]
    fn test_infer_column_type_mixed_numbers_is_float() {
        let values = [json!(1), json!("0.75")];
        let refs: Vec<&Value> = values.iter().collect();
        assert_eq!(infer_column_type(&refs), ColumnType::Float);
    }

    #[test]
    fn test_infer_column_type_bool_text() {
        let values = [json!("TRUE"), json!(false), Value::Null];
        let refs: Vec<&Value> = values.iter().collect();
        assert_eq!(infer_column_type(&refs), ColumnType::Boolean);
    }

    #[test]
    fn test_infer_column_type_null() {
        let values = [Value::Null];
        let refs: Vec<&Value> = values.iter().collect();
        assert_eq!(infer_column_type(&refs), ColumnType::Null);
    }

    #[test]
    fn test_infer_schema() {
        let batch = DataBatch {
            columns: vec!["name".to_string(), "score".to_string(), String::new()],
            rows: vec![
                vec![json!("Planner"), json!(0.5), json!(1)],
                vec![json!("Coder"), json!("n/a"), json!(2)],
            ],
            header_row: 0,
        };
        let schema = infer_schema(&batch);
        assert_eq!(schema.len(), 2);
        assert_eq!(schema["name"], ColumnType::String);
        assert_eq!(schema["score"], ColumnType::String);
    }
}
