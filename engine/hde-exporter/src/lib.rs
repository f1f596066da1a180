//! Helldivers 2 metrics exporter
//!
//! Scrapes the war status, war info and war statistics endpoints on a fixed
//! interval and serves the result in the Prometheus text format.

pub mod config;
pub mod error;
pub mod planets;
pub mod registry;
pub mod scraper;
pub mod server;

#[cfg(test)]
mod tests;

pub use config::{parse_listen_addr, ExporterConfig};
pub use error::{ExporterError, Result};
pub use planets::PlanetNames;
pub use registry::{MetricsRegistry, StatGauge, STAT_GAUGES};
pub use scraper::{ScrapeReport, Scraper, WarSnapshot};
pub use server::{bind, metrics_routes};
