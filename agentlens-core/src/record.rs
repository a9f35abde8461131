//! Typed agent performance records and cell coercion.

use crate::config::ColumnsConfig;
use crate::data::header::{DataBatch, cell_text};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of the performance dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub agent_type: Option<String>,
    pub model_architecture: Option<String>,
    pub task_category: Option<String>,
    pub multimodal_capability: bool,
    pub bias_detection_score: Option<f64>,
}

impl AgentRecord {
    /// Shorthand used heavily by tests and fixtures.
    pub fn new(
        agent_type: &str,
        model_architecture: &str,
        task_category: &str,
        multimodal_capability: bool,
        bias_detection_score: Option<f64>,
    ) -> Self {
        Self {
            agent_type: Some(agent_type.to_string()),
            model_architecture: Some(model_architecture.to_string()),
            task_category: Some(task_category.to_string()),
            multimodal_capability,
            bias_detection_score,
        }
    }
}

/// Record fields, each backed by one configurable source column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    AgentType,
    ModelArchitecture,
    TaskCategory,
    MultimodalCapability,
    BiasDetectionScore,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::AgentType,
        Field::ModelArchitecture,
        Field::TaskCategory,
        Field::MultimodalCapability,
        Field::BiasDetectionScore,
    ];

    /// Source column name for this field under `columns`.
    pub fn column_name(self, columns: &ColumnsConfig) -> &str {
        match self {
            Field::AgentType => &columns.agent_type,
            Field::ModelArchitecture => &columns.model_architecture,
            Field::TaskCategory => &columns.task_category,
            Field::MultimodalCapability => &columns.multimodal_capability,
            Field::BiasDetectionScore => &columns.bias_detection_score,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::AgentType => write!(f, "agent_type"),
            Field::ModelArchitecture => write!(f, "model_architecture"),
            Field::TaskCategory => write!(f, "task_category"),
            Field::MultimodalCapability => write!(f, "multimodal_capability"),
            Field::BiasDetectionScore => write!(f, "bias_detection_score"),
        }
    }
}

/// Counts of cells that could not be coerced cleanly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercionStats {
    /// Non-empty capability cells that were not a recognizable boolean (read as `false`).
    pub unrecognized_flags: usize,
    /// Non-empty score cells that were not a finite number (read as null).
    pub invalid_scores: usize,
}

/// Parse a capability flag. `None` means the cell was non-empty but unrecognized.
pub fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Null => Some(false),
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "" => Some(false),
            "true" | "t" | "yes" | "y" | "1" | "1.0" => Some(true),
            "false" | "f" | "no" | "n" | "0" | "0.0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Parse a score cell. Non-numeric and non-finite values become `None`.
pub fn parse_score(value: &Value) -> Option<f64> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f)
}

/// Parse a category cell. Blank cells become `None`.
pub fn parse_category(value: &Value) -> Option<String> {
    let text = cell_text(value);
    (!text.is_empty()).then_some(text)
}

/// Column positions of each field within a batch; `None` for absent columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnMap {
    pub agent_type: Option<usize>,
    pub model_architecture: Option<usize>,
    pub task_category: Option<usize>,
    pub multimodal_capability: Option<usize>,
    pub bias_detection_score: Option<usize>,
}

impl ColumnMap {
    pub fn resolve(batch: &DataBatch, columns: &ColumnsConfig) -> Self {
        Self {
            agent_type: batch.column_index(&columns.agent_type),
            model_architecture: batch.column_index(&columns.model_architecture),
            task_category: batch.column_index(&columns.task_category),
            multimodal_capability: batch.column_index(&columns.multimodal_capability),
            bias_detection_score: batch.column_index(&columns.bias_detection_score),
        }
    }

    pub fn index(&self, field: Field) -> Option<usize> {
        match field {
            Field::AgentType => self.agent_type,
            Field::ModelArchitecture => self.model_architecture,
            Field::TaskCategory => self.task_category,
            Field::MultimodalCapability => self.multimodal_capability,
            Field::BiasDetectionScore => self.bias_detection_score,
        }
    }

    /// Fields whose column is absent.
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.index(*f).is_none())
            .collect()
    }
}

/// Convert every batch row into a record. Absent columns yield null / `false`.
pub fn parse_records(batch: &DataBatch, map: &ColumnMap) -> (Vec<AgentRecord>, CoercionStats) {
    let mut stats = CoercionStats::default();
    let null = Value::Null;

    let records = batch
        .rows
        .iter()
        .map(|row| {
            let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i)).unwrap_or(&null);

            let flag_cell = cell(map.multimodal_capability);
            let multimodal_capability = parse_flag(flag_cell).unwrap_or_else(|| {
                stats.unrecognized_flags += 1;
                false
            });

            let score_cell = cell(map.bias_detection_score);
            let bias_detection_score = parse_score(score_cell);
            if bias_detection_score.is_none() && !crate::data::source::is_blank(score_cell) {
                stats.invalid_scores += 1;
            }

            AgentRecord {
                agent_type: parse_category(cell(map.agent_type)),
                model_architecture: parse_category(cell(map.model_architecture)),
                task_category: parse_category(cell(map.task_category)),
                multimodal_capability,
                bias_detection_score,
            }
        })
        .collect();

    (records, stats)
}
