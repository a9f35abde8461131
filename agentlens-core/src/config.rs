//! Configuration system for agentlens.
//!
//! Uses `figment` for layered configuration: defaults -> config files -> environment -> CLI args.
//! Configuration is loaded from `~/.config/agentlens/config.toml` and/or
//! `.agentlens/config.toml` in the workspace directory, plus an optional explicit file.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Top-level configuration for an analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub columns: ColumnsConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the dataset lives and how its header is located.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Dataset path (usually supplied on the command line).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Worksheet name for workbook formats. The first sheet is used when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// 0-based header row. Auto-detected when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_row: Option<usize>,
    /// How many leading rows auto-detection inspects.
    #[serde(default = "default_header_scan_rows")]
    pub header_scan_rows: usize,
    /// Field delimiter for delimited text. Defaults to `,` (or tab for `.tsv`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<char>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: None,
            sheet: None,
            header_row: None,
            header_scan_rows: default_header_scan_rows(),
            delimiter: None,
        }
    }
}

fn default_header_scan_rows() -> usize {
    5
}

/// Source column names for each record field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnsConfig {
    #[serde(default = "default_agent_type")]
    pub agent_type: String,
    #[serde(default = "default_model_architecture")]
    pub model_architecture: String,
    #[serde(default = "default_task_category")]
    pub task_category: String,
    #[serde(default = "default_multimodal_capability")]
    pub multimodal_capability: String,
    #[serde(default = "default_bias_detection_score")]
    pub bias_detection_score: String,
}

impl Default for ColumnsConfig {
    fn default() -> Self {
        Self {
            agent_type: default_agent_type(),
            model_architecture: default_model_architecture(),
            task_category: default_task_category(),
            multimodal_capability: default_multimodal_capability(),
            bias_detection_score: default_bias_detection_score(),
        }
    }
}

impl ColumnsConfig {
    /// All expected column names, in record-field order.
    pub fn expected(&self) -> [&str; 5] {
        [
            self.agent_type.as_str(),
            self.model_architecture.as_str(),
            self.task_category.as_str(),
            self.multimodal_capability.as_str(),
            self.bias_detection_score.as_str(),
        ]
    }
}

fn default_agent_type() -> String {
    "agent_type".to_string()
}
fn default_model_architecture() -> String {
    "model_architecture".to_string()
}
fn default_task_category() -> String {
    "task_category".to_string()
}
fn default_multimodal_capability() -> String {
    "multimodal_capability".to_string()
}
fn default_bias_detection_score() -> String {
    "bias_detection_score".to_string()
}

/// What to do when an expected column is absent from the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingColumnPolicy {
    /// Fail the load, naming every absent column.
    #[default]
    Strict,
    /// Keep going; rankings that need an absent column come back empty.
    Lenient,
}

impl std::fmt::Display for MissingColumnPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MissingColumnPolicy::Strict => write!(f, "strict"),
            MissingColumnPolicy::Lenient => write!(f, "lenient"),
        }
    }
}

/// Ranking parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Number of entries kept per ranking.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub missing_columns: MissingColumnPolicy,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            missing_columns: MissingColumnPolicy::default(),
        }
    }
}

fn default_top_n() -> usize {
    3
}

/// Report output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Destination of the dashboard JSON summary.
    #[serde(default = "default_json_path")]
    pub json_path: PathBuf,
    #[serde(default = "default_true")]
    pub write_json: bool,
    /// Decimal places for ratio percentages (console and JSON).
    #[serde(default = "default_percent_precision")]
    pub percent_precision: u32,
    /// Decimal places for medians on the console.
    #[serde(default = "default_median_precision")]
    pub median_precision: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: default_json_path(),
            write_json: true,
            percent_precision: default_percent_precision(),
            median_precision: default_median_precision(),
        }
    }
}

fn default_json_path() -> PathBuf {
    PathBuf::from("analysis_results.json")
}
fn default_true() -> bool {
    true
}
fn default_percent_precision() -> u32 {
    2
}
fn default_median_precision() -> u32 {
    3
}

impl AnalyzerConfig {
    /// Reject values no analysis can run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ranking.top_n == 0 {
            return Err(ConfigError::invalid("ranking.top_n must be at least 1"));
        }
        if self.input.header_scan_rows == 0 && self.input.header_row.is_none() {
            return Err(ConfigError::invalid(
                "input.header_scan_rows must be at least 1 when header_row is unset",
            ));
        }
        if let Some(empty) = self
            .columns
            .expected()
            .iter()
            .position(|name| name.trim().is_empty())
        {
            return Err(ConfigError::invalid(format!(
                "column name #{} is empty",
                empty + 1
            )));
        }
        if self.output.percent_precision > 10 || self.output.median_precision > 10 {
            return Err(ConfigError::invalid("output precision must be at most 10"));
        }
        Ok(())
    }
}

/// User-level config file (`~/.config/agentlens/config.toml` on Linux).
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "agentlens", "agentlens")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Workspace-level config file.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".agentlens").join("config.toml")
}

/// Every config file location consulted, lowest priority first, with whether it exists.
pub fn config_sources(workspace: Option<&Path>, explicit: Option<&Path>) -> Vec<(PathBuf, bool)> {
    let mut sources = Vec::new();
    if let Some(user) = user_config_path() {
        let exists = user.exists();
        sources.push((user, exists));
    }
    if let Some(ws) = workspace {
        let path = workspace_config_path(ws);
        let exists = path.exists();
        sources.push((path, exists));
    }
    if let Some(path) = explicit {
        sources.push((path.to_path_buf(), path.exists()));
    }
    sources
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `AGENTLENS_`)
/// 2. Explicit config file (`--config`)
/// 3. Workspace-local config (`.agentlens/config.toml`)
/// 4. User config (`~/.config/agentlens/config.toml`)
/// 5. Built-in defaults
///
/// Command-line flags are applied by the caller on the returned value, which
/// should then be re-validated.
pub fn load_config(
    workspace: Option<&Path>,
    config_file: Option<&Path>,
) -> Result<AnalyzerConfig, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(AnalyzerConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(path) = config_file {
        if !path.exists() {
            return Err(ConfigError::invalid(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        figment = figment.merge(Toml::file(path));
    }

    // Environment variables (AGENTLENS_RANKING__TOP_N, AGENTLENS_OUTPUT__JSON_PATH, etc.)
    figment = figment.merge(Env::prefixed("AGENTLENS_").split("__"));

    let config: AnalyzerConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}
