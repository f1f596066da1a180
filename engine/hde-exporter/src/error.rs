//! Error types for the metrics exporter

use hde_client::ClientError;
use metrics_exporter_prometheus::BuildError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for exporter operations
pub type Result<T> = std::result::Result<T, ExporterError>;

#[derive(Error, Debug)]
pub enum ExporterError {
    #[error("Upstream error: {0}")]
    Upstream(#[from] ClientError),

    #[error("Scrape timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Failed to read {path}: {source}")]
    StaticData { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse {path}: {source}")]
    StaticDataFormat { path: PathBuf, source: serde_json::Error },

    #[error("Metrics error: {0}")]
    Metrics(#[from] BuildError),

    #[error("Server error: {0}")]
    Server(#[from] warp::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}
