//! Command line / environment settings shared by both services
//!
//! Every flag can also be given through an `HDE_`-prefixed environment
//! variable; a `.env` file in the working directory is honoured.

use anyhow::{anyhow, Result};
use clap::Args;
use std::time::Duration;

use crate::logging::{validate_level, LogFormat};

/// Logging flags
#[derive(Debug, Clone, Args)]
pub struct LoggingArgs {
    /// Log level (trace, debug, info, warn, error); defaults per service
    #[arg(long = "log-level", env = "HDE_LOG_LEVEL")]
    pub level: Option<String>,

    /// Log output format
    #[arg(long = "log-format", env = "HDE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub format: LogFormat,
}

impl LoggingArgs {
    /// Configured level, or `default` when none was given
    pub fn level_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.level.as_deref().unwrap_or(default)
    }

    pub fn validate(&self) -> Result<()> {
        match &self.level {
            Some(level) => validate_level(level),
            None => Ok(()),
        }
    }
}

/// Load a `.env` file if present
pub fn load_dotenv() {
    match dotenv::dotenv() {
        Ok(_) => {}
        Err(e) if e.not_found() => {}
        Err(e) => eprintln!("Ignoring unreadable .env file: {}", e),
    }
}

/// Reject zero-length durations
pub fn require_positive(name: &str, value: Duration) -> Result<Duration> {
    if value.is_zero() {
        return Err(anyhow!("Invalid {}: must be greater than zero", name));
    }
    Ok(value)
}
