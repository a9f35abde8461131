//! # agentlens-core
//!
//! Loads a spreadsheet of AI-agent performance records and ranks it three ways:
//! agent types and model architectures by the share of multimodal-capable
//! records, and task categories by median bias-detection score.
//!
//! The pipeline is `load_dataset` → [`analysis::analyze`] → [`report`]:
//!
//! ```no_run
//! use agentlens_core::{AnalyzerConfig, analyze, load_dataset, render_terminal};
//!
//! let config = AnalyzerConfig::default();
//! let dataset = load_dataset("agents.xlsx".as_ref(), &config)?;
//! let report = analyze(&dataset, &config.ranking);
//! print!("{}", render_terminal(&report, &config.output));
//! # Ok::<(), agentlens_core::DataLoadError>(())
//! ```

pub mod analysis;
pub mod config;
pub mod data;
pub mod dataset;
pub mod error;
pub mod ranking;
pub mod record;
pub mod report;

pub use analysis::{AnalysisReport, DatasetOverview, analyze};
pub use config::{AnalyzerConfig, MissingColumnPolicy, load_config};
pub use dataset::{Dataset, load_dataset};
pub use error::{AnalysisError, ConfigError, DataLoadError};
pub use ranking::{
    CapabilityRank, GroupKey, GroupStat, MedianRank, ScoreField, median, rank_by_capability_ratio,
    rank_by_median_score,
};
pub use record::{AgentRecord, Field};
pub use report::{DashboardSummary, render_terminal, write_summary};
