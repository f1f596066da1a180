//! Logging and tracing setup

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Output format of the log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Single-line `key=value` output
    Text,
    /// One JSON object per line
    Json,
    /// Multi-line human friendly output
    Pretty,
}

/// Accepted log levels
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Check a log level name
pub fn validate_level(level: &str) -> Result<()> {
    if LOG_LEVELS.contains(&level) {
        Ok(())
    } else {
        Err(anyhow!("Invalid log level: {}", level))
    }
}

/// Initialize logging with the given level and format.
///
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn initialize_logging_with_config(level: &str, format: LogFormat) -> Result<()> {
    validate_level(level)?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let fmt_layer = match format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(false)
            .with_target(true)
            .with_file(false)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_target(false)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(true)
            .boxed(),
        LogFormat::Text => fmt::layer().with_target(false).with_ansi(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
