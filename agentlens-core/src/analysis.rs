//! Analysis run: dataset overview plus the three rankings.

use crate::config::RankingConfig;
use crate::data::schema::ColumnType;
use crate::dataset::Dataset;
use crate::ranking::{
    CapabilityRank, GroupKey, MedianRank, ScoreField, rank_by_capability_ratio,
    rank_by_median_score,
};
use crate::record::{AgentRecord, Field};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Summary of what was loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetOverview {
    pub total_rows: usize,
    pub columns: Vec<String>,
    pub column_types: BTreeMap<String, ColumnType>,
    pub multimodal_count: usize,
    pub agent_types: usize,
    pub model_architectures: usize,
    pub task_categories: usize,
    pub scored_records: usize,
}

impl DatasetOverview {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let records = &dataset.records;
        Self {
            total_rows: records.len(),
            columns: dataset
                .columns
                .iter()
                .filter(|c| !c.is_empty())
                .cloned()
                .collect(),
            column_types: dataset.column_types.clone(),
            multimodal_count: records.iter().filter(|r| r.multimodal_capability).count(),
            agent_types: distinct(records, GroupKey::AgentType),
            model_architectures: distinct(records, GroupKey::ModelArchitecture),
            task_categories: distinct(records, GroupKey::TaskCategory),
            scored_records: records
                .iter()
                .filter(|r| r.bias_detection_score.is_some())
                .count(),
        }
    }
}

fn distinct(records: &[AgentRecord], key: GroupKey) -> usize {
    records
        .iter()
        .filter_map(|r| key.value(r))
        .collect::<HashSet<_>>()
        .len()
}

/// Results of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub overview: DatasetOverview,
    pub agent_type_multimodal: Vec<CapabilityRank>,
    pub model_architecture_multimodal: Vec<CapabilityRank>,
    pub task_category_bias: Vec<MedianRank>,
    pub source: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// Run all rankings over `dataset`.
///
/// A ranking whose grouping or value column is missing from the dataset is empty.
pub fn analyze(dataset: &Dataset, config: &RankingConfig) -> AnalysisReport {
    let records = &dataset.records;
    let limit = config.top_n;

    let capability = |key: GroupKey| {
        if dataset.has(key.field()) && dataset.has(Field::MultimodalCapability) {
            rank_by_capability_ratio(records, key, limit)
        } else {
            tracing::warn!(group_key = ?key, "Skipping capability ranking: column missing");
            Vec::new()
        }
    };

    let score = ScoreField::BiasDetectionScore;
    let task_category_bias =
        if dataset.has(GroupKey::TaskCategory.field()) && dataset.has(score.field()) {
            rank_by_median_score(records, GroupKey::TaskCategory, score, limit)
        } else {
            tracing::warn!("Skipping median ranking: column missing");
            Vec::new()
        };

    let report = AnalysisReport {
        overview: DatasetOverview::from_dataset(dataset),
        agent_type_multimodal: capability(GroupKey::AgentType),
        model_architecture_multimodal: capability(GroupKey::ModelArchitecture),
        task_category_bias,
        source: dataset.source.location.clone(),
        generated_at: chrono::Utc::now(),
    };

    tracing::info!(
        records = report.overview.total_rows,
        agent_types = report.agent_type_multimodal.len(),
        model_architectures = report.model_architecture_multimodal.len(),
        task_categories = report.task_category_bias.len(),
        "Analysis complete"
    );
    report
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::data::source::{DataSourceInfo, SourceFormat};
    use crate::dataset::Dataset;
    use crate::record::{AgentRecord, CoercionStats};
    use std::collections::BTreeMap;

    pub fn dataset(records: Vec<AgentRecord>) -> Dataset {
        Dataset {
            records,
            missing: Vec::new(),
            columns: vec!["agent_type".into()],
            column_types: BTreeMap::new(),
            header_row: 0,
            coercion: CoercionStats::default(),
            source: DataSourceInfo {
                source_type: SourceFormat::Delimited,
                location: "fixture.csv".into(),
                accessed_at: chrono::Utc::now(),
            },
        }
    }

    pub fn sample_records() -> Vec<AgentRecord> {
        vec![
            AgentRecord::new("Planner", "Transformer", "Research", true, Some(0.75)),
            AgentRecord::new("Planner", "Mixture", "Research", false, Some(0.25)),
            AgentRecord::new("Coder", "Transformer", "Coding", true, Some(0.625)),
            AgentRecord::new("Critic", "Dense", "Review", false, None),
        ]
    }
}
