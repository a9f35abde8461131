//! Ranking aggregation: group records, sort descending, keep the top N.
//!
//! Groups keep the order in which their key was first seen, and sorting is
//! stable, so equal values rank in first-seen order. Records with a null key
//! belong to no group.

use crate::record::{AgentRecord, Field};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default number of entries per ranking.
pub const DEFAULT_TOP_N: usize = 3;

/// Categorical column to group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    AgentType,
    ModelArchitecture,
    TaskCategory,
}

impl GroupKey {
    pub fn value(self, record: &AgentRecord) -> Option<&str> {
        match self {
            GroupKey::AgentType => record.agent_type.as_deref(),
            GroupKey::ModelArchitecture => record.model_architecture.as_deref(),
            GroupKey::TaskCategory => record.task_category.as_deref(),
        }
    }

    pub fn field(self) -> Field {
        match self {
            GroupKey::AgentType => Field::AgentType,
            GroupKey::ModelArchitecture => Field::ModelArchitecture,
            GroupKey::TaskCategory => Field::TaskCategory,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GroupKey::AgentType => "Agent Types",
            GroupKey::ModelArchitecture => "Model Architectures",
            GroupKey::TaskCategory => "Task Categories",
        }
    }
}

/// Numeric column whose per-group median is ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreField {
    BiasDetectionScore,
}

impl ScoreField {
    pub fn value(self, record: &AgentRecord) -> Option<f64> {
        match self {
            ScoreField::BiasDetectionScore => record.bias_detection_score,
        }
    }

    pub fn field(self) -> Field {
        match self {
            ScoreField::BiasDetectionScore => Field::BiasDetectionScore,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreField::BiasDetectionScore => "Bias Detection Median",
        }
    }
}

/// Capability counts for one group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupStat {
    pub total_count: usize,
    pub positive_count: usize,
}

impl GroupStat {
    pub fn record(&mut self, positive: bool) {
        self.total_count += 1;
        if positive {
            self.positive_count += 1;
        }
    }

    /// `positive_count / total_count`, or `0.0` for an empty group.
    pub fn ratio(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            self.positive_count as f64 / self.total_count as f64
        }
    }
}

/// One entry of a capability-ratio ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityRank {
    pub key: String,
    pub ratio: f64,
    pub positive_count: usize,
    pub total_count: usize,
}

impl CapabilityRank {
    /// Ratio as a percentage rounded to `precision` decimals.
    pub fn percent(&self, precision: u32) -> f64 {
        round_to(self.ratio * 100.0, precision)
    }
}

/// One entry of a median-score ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedianRank {
    pub key: String,
    pub median: f64,
}

/// Groups in first-seen order, each accumulating a value.
struct Groups<'a, T> {
    order: Vec<(&'a str, T)>,
    index: HashMap<&'a str, usize>,
}

impl<'a, T: Default> Groups<'a, T> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn entry(&mut self, key: &'a str) -> &mut T {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                self.order.push((key, T::default()));
                let idx = self.order.len() - 1;
                self.index.insert(key, idx);
                idx
            }
        };
        &mut self.order[idx].1
    }
}

/// Rank groups of `group_key` by the share of records with the capability flag set.
///
/// Returns at most `limit` entries, non-increasing by ratio.
pub fn rank_by_capability_ratio(
    records: &[AgentRecord],
    group_key: GroupKey,
    limit: usize,
) -> Vec<CapabilityRank> {
    let mut groups: Groups<'_, GroupStat> = Groups::new();
    for record in records {
        if let Some(key) = group_key.value(record) {
            groups.entry(key).record(record.multimodal_capability);
        }
    }

    let mut ranked: Vec<CapabilityRank> = groups
        .order
        .into_iter()
        .map(|(key, stat)| CapabilityRank {
            key: key.to_string(),
            ratio: stat.ratio(),
            positive_count: stat.positive_count,
            total_count: stat.total_count,
        })
        .collect();

    tracing::debug!(group_key = ?group_key, groups = ranked.len(), "Ranked capability ratios");

    ranked.sort_by(|a, b| b.ratio.total_cmp(&a.ratio));
    ranked.truncate(limit);
    ranked
}

/// Rank groups of `group_key` by the median of `score_field`.
///
/// Null scores are dropped; groups left with no scores are excluded.
pub fn rank_by_median_score(
    records: &[AgentRecord],
    group_key: GroupKey,
    score_field: ScoreField,
    limit: usize,
) -> Vec<MedianRank> {
    let mut groups: Groups<'_, Vec<f64>> = Groups::new();
    for record in records {
        let Some(key) = group_key.value(record) else {
            continue;
        };
        let scores = groups.entry(key);
        if let Some(score) = score_field.value(record).filter(|s| s.is_finite()) {
            scores.push(score);
        }
    }

    let mut ranked: Vec<MedianRank> = groups
        .order
        .into_iter()
        .filter_map(|(key, mut scores)| {
            median(&mut scores).map(|median| MedianRank {
                key: key.to_string(),
                median,
            })
        })
        .collect();

    tracing::debug!(group_key = ?group_key, groups = ranked.len(), "Ranked median scores");

    ranked.sort_by(|a, b| b.median.total_cmp(&a.median));
    ranked.truncate(limit);
    ranked
}

/// Median of `values` (sorted in place). Mean of the two middles for even counts.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        // Halve first: the sum of two finite values can overflow.
        Some(values[mid - 1] / 2.0 + values[mid] / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Round half away from zero to `precision` decimals.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}
