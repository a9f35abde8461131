//! Dashboard JSON summary.
//!
//! Parallel arrays (`labels`, `ratios`, ...) so chart libraries can bind them
//! directly. Ratios are percentages; medians are emitted unrounded.

use crate::analysis::{AnalysisReport, DatasetOverview};
use crate::error::AnalysisError;
use crate::ranking::{CapabilityRank, MedianRank};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Chart series for one capability-ratio ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatioSeries {
    pub labels: Vec<String>,
    pub ratios: Vec<f64>,
    pub counts: Vec<usize>,
    pub totals: Vec<usize>,
}

impl RatioSeries {
    pub fn from_ranks(ranks: &[CapabilityRank], precision: u32) -> Self {
        Self {
            labels: ranks.iter().map(|r| r.key.clone()).collect(),
            ratios: ranks.iter().map(|r| r.percent(precision)).collect(),
            counts: ranks.iter().map(|r| r.positive_count).collect(),
            totals: ranks.iter().map(|r| r.total_count).collect(),
        }
    }
}

/// Chart series for one median ranking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedianSeries {
    pub labels: Vec<String>,
    pub medians: Vec<f64>,
}

impl MedianSeries {
    pub fn from_ranks(ranks: &[MedianRank]) -> Self {
        Self {
            labels: ranks.iter().map(|r| r.key.clone()).collect(),
            medians: ranks.iter().map(|r| r.median).collect(),
        }
    }
}

/// The file consumed by the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_records: usize,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub source: String,
    pub data_overview: DatasetOverview,
    pub agent_type_multimodal: RatioSeries,
    pub model_architecture_multimodal: RatioSeries,
    pub task_category_bias: MedianSeries,
}

impl DashboardSummary {
    pub fn from_report(report: &AnalysisReport, percent_precision: u32) -> Self {
        Self {
            total_records: report.overview.total_rows,
            generated_at: report.generated_at,
            source: report.source.clone(),
            data_overview: report.overview.clone(),
            agent_type_multimodal: RatioSeries::from_ranks(
                &report.agent_type_multimodal,
                percent_precision,
            ),
            model_architecture_multimodal: RatioSeries::from_ranks(
                &report.model_architecture_multimodal,
                percent_precision,
            ),
            task_category_bias: MedianSeries::from_ranks(&report.task_category_bias),
        }
    }
}

/// Write `summary` as pretty-printed UTF-8 JSON, creating parent directories.
pub fn write_summary(path: &Path, summary: &DashboardSummary) -> Result<(), AnalysisError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), "Wrote dashboard summary");
    Ok(())
}
