//! Dataset loading: source → header → typed records.

use crate::config::{AnalyzerConfig, MissingColumnPolicy};
use crate::data::header::{HeaderStrategy, resolve_header};
use crate::data::schema::{ColumnType, infer_schema};
use crate::data::source::{DataSource, DataSourceInfo, open_source};
use crate::error::DataLoadError;
use crate::record::{AgentRecord, CoercionStats, ColumnMap, Field, parse_records};
use std::collections::BTreeMap;
use std::path::Path;

/// A loaded dataset. Immutable once built.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<AgentRecord>,
    /// Expected fields whose column was absent (only ever non-empty under the lenient policy).
    pub missing: Vec<Field>,
    pub columns: Vec<String>,
    pub column_types: BTreeMap<String, ColumnType>,
    pub header_row: usize,
    pub coercion: CoercionStats,
    pub source: DataSourceInfo,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the column backing `field` was present.
    pub fn has(&self, field: Field) -> bool {
        !self.missing.contains(&field)
    }
}

/// Load the dataset at `path` according to `config`.
pub fn load_dataset(path: &Path, config: &AnalyzerConfig) -> Result<Dataset, DataLoadError> {
    let source = open_source(path, &config.input)?;
    load_from_source(source.as_ref(), config)
}

/// Load from an already constructed source.
pub fn load_from_source(
    source: &dyn DataSource,
    config: &AnalyzerConfig,
) -> Result<Dataset, DataLoadError> {
    let info = source.source_info();
    let sheet = source.read()?;
    if sheet.is_empty() {
        return Err(DataLoadError::Empty {
            path: info.location.clone().into(),
        });
    }

    let expected = config.columns.expected();
    let strategy =
        HeaderStrategy::from_config(config.input.header_row, config.input.header_scan_rows);
    let batch = resolve_header(sheet, strategy, &expected)?;

    let map = ColumnMap::resolve(&batch, &config.columns);
    let missing = map.missing();
    if !missing.is_empty() {
        let names: Vec<String> = missing
            .iter()
            .map(|f| f.column_name(&config.columns).to_string())
            .collect();
        match config.ranking.missing_columns {
            MissingColumnPolicy::Strict => {
                return Err(DataLoadError::MissingColumn { columns: names });
            }
            MissingColumnPolicy::Lenient => {
                tracing::warn!(
                    columns = %names.join(", "),
                    "Expected columns missing; dependent rankings will be empty"
                );
            }
        }
    }

    tracing::debug!(
        rows = batch.row_count(),
        header_row = batch.header_row,
        "Parsing records"
    );
    let (records, coercion) = parse_records(&batch, &map);
    if coercion.unrecognized_flags > 0 {
        tracing::warn!(
            count = coercion.unrecognized_flags,
            column = %config.columns.multimodal_capability,
            "Unrecognized capability values treated as false"
        );
    }
    if coercion.invalid_scores > 0 {
        tracing::warn!(
            count = coercion.invalid_scores,
            column = %config.columns.bias_detection_score,
            "Non-numeric scores treated as missing"
        );
    }

    let column_types = infer_schema(&batch);
    tracing::info!(
        records = records.len(),
        header_row = batch.header_row,
        source = %info.location,
        "Successfully processed dataset"
    );

    Ok(Dataset {
        records,
        missing,
        columns: batch.columns,
        column_types,
        header_row: batch.header_row,
        coercion,
        source: info,
    })
}
