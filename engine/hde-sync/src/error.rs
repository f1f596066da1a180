//! Error types for the news synchroniser

use hde_client::ClientError;
use thiserror::Error;

/// Result type for news synchronisation operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Errors that abort a reconciliation cycle
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Upstream error: {0}")]
    Upstream(#[from] ClientError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Cancelled while waiting for a rate limit permit")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SyncError {
    /// Whether the failure came from the upstream API (transport or status)
    pub fn is_upstream(&self) -> bool {
        matches!(self, SyncError::Upstream(_))
    }
}
