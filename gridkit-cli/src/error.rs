//! CLI error type

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read table config {path}: {source}")]
    ReadTable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid table config: {0}")]
    InvalidTable(serde_json::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("A backend URL is required (--url or GRIDKIT_URL)")]
    MissingUrl,

    #[error("No data directory available for the offline preset database")]
    NoDataDir,

    #[error("Invalid filter '{0}', expected KEY=VALUE")]
    InvalidFilter(String),

    #[error(transparent)]
    Api(#[from] gridkit_lib::error::ApiError),

    #[error(transparent)]
    Engine(#[from] gridkit_lib::Error),

    #[error("Save of {field} on row {id} was rejected: another save is in flight")]
    SaveRejected { id: String, field: String },
}
