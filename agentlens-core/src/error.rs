//! Error types for the agentlens core library.
//!
//! Uses `thiserror` for public API error types. Loading problems are grouped
//! under [`DataLoadError`]; configuration problems under [`ConfigError`].

use std::path::PathBuf;

/// Top-level error type for the agentlens core library.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Data load error: {0}")]
    DataLoad(#[from] DataLoadError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while reading a dataset and turning it into records.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Unsupported file format '{extension}' for {}", path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("Failed to read spreadsheet {}: {message}", path.display())]
    Spreadsheet { path: PathBuf, message: String },

    #[error("Workbook {} contains no worksheets", path.display())]
    NoSheet { path: PathBuf },

    #[error("Worksheet '{sheet}' not found")]
    SheetNotFound { sheet: String },

    #[error("Dataset {} is empty", path.display())]
    Empty { path: PathBuf },

    #[error("Header row {row} is out of range (dataset has {rows} rows)")]
    HeaderRowOutOfRange { row: usize, rows: usize },

    #[error("Missing expected column(s): {}", columns.join(", "))]
    MissingColumn { columns: Vec<String> },

    #[error("Malformed JSON on line {line}: {source}")]
    JsonLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON dataset must be an array of objects")]
    JsonShape,

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

/// Convenience alias for results in this crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;
