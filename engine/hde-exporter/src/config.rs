use clap::Parser;
use hde_client::{WarId, DEFAULT_API_URL};
use hde_runtime::{require_positive, LoggingArgs};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ExporterError, Result};

/// Configuration for the metrics exporter
#[derive(Debug, Clone, Parser)]
#[command(name = "hde-exporter", version)]
#[command(about = "Expose the Helldivers 2 war statistics as Prometheus metrics")]
pub struct ExporterConfig {
    /// Name of the collector
    #[arg(long, env = "HDE_COLLECTOR", default_value = "helldivers2-api")]
    pub collector: String,

    /// URL of the API
    #[arg(long, env = "HDE_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Address to expose the metrics on (`:PORT` listens on every interface)
    #[arg(long, env = "HDE_EXPOSE_ADDRESS", default_value = ":9101")]
    pub expose_address: String,

    /// HTTP path the metrics are served under
    #[arg(long, env = "HDE_METRICS_PATH", default_value = "/metrics")]
    pub metrics_path: String,

    /// Directory where the static json data is stored
    #[arg(long, env = "HDE_JSON_DATA_DIR", default_value = "/data")]
    pub json_data_dir: PathBuf,

    /// War to export
    #[arg(long = "war-id", env = "HDE_WAR_ID", default_value_t = 801)]
    pub war_id: WarId,

    /// Seconds between two scrapes
    #[arg(long, env = "HDE_SCRAPE_INTERVAL_SECS", default_value_t = 30)]
    pub scrape_interval_secs: u64,

    /// Deadline for the three requests of one scrape, in seconds
    #[arg(long, env = "HDE_REQUEST_TIMEOUT_SECS", default_value_t = 5)]
    pub request_timeout_secs: u64,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

impl ExporterConfig {
    pub const DEFAULT_LOG_LEVEL: &'static str = "info";

    pub fn scrape_interval(&self) -> Duration {
        Duration::from_secs(self.scrape_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn log_level(&self) -> &str {
        self.logging.level_or(Self::DEFAULT_LOG_LEVEL)
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        parse_listen_addr(&self.expose_address)
    }

    /// Path segments of the metrics endpoint, e.g. `["metrics"]`
    pub fn metrics_path_segments(&self) -> Vec<String> {
        self.metrics_path.split('/').filter(|s| !s.is_empty()).map(str::to_string).collect()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let invalid = |e: anyhow::Error| ExporterError::Configuration(e.to_string());

        self.logging.validate().map_err(invalid)?;
        require_positive("scrape interval", self.scrape_interval()).map_err(invalid)?;
        require_positive("request timeout", self.request_timeout()).map_err(invalid)?;
        self.listen_addr()?;

        if !self.metrics_path.starts_with('/') {
            return Err(ExporterError::Configuration(format!(
                "Metrics path must start with '/': {}",
                self.metrics_path
            )));
        }

        if self.collector.trim().is_empty() {
            let message = "Collector name must not be empty".to_string();
            return Err(ExporterError::Configuration(message));
        }

        Ok(())
    }
}

/// Parse a listen address; a bare `:PORT` binds every interface
pub fn parse_listen_addr(address: &str) -> Result<SocketAddr> {
    let invalid = || ExporterError::Configuration(format!("Invalid listen address: {}", address));

    if let Some(port) = address.strip_prefix(':') {
        let port: u16 = port.parse().map_err(|_| invalid())?;
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
    }

    address.parse().map_err(|_| invalid())
}
