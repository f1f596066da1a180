//! Error types for the war API client

use thiserror::Error;

/// Result type for war API client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur while talking to the upstream war API
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Transport error on {route}: {source}")]
    Transport {
        route: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected status {status} from {route}")]
    UnexpectedStatus { route: &'static str, status: u16 },

    #[error("Failed to decode {route} response: {source}")]
    Decode {
        route: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Empty body on successful {route} response")]
    EmptyBody { route: &'static str },

    #[error("Request to {route} timed out")]
    Timeout { route: &'static str },

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ClientError {
    /// Route the failing call was made against
    pub fn route(&self) -> Option<&'static str> {
        match self {
            ClientError::Transport { route, .. }
            | ClientError::UnexpectedStatus { route, .. }
            | ClientError::Decode { route, .. }
            | ClientError::EmptyBody { route }
            | ClientError::Timeout { route } => Some(route),
            ClientError::InvalidBaseUrl(_) => None,
        }
    }
}
