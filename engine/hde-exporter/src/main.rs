//! Metrics exporter entry point
//!
//! Loads the planet names, then runs the scrape loop and the metrics server
//! side by side until a shutdown signal arrives. Failed scrapes are logged
//! and retried on the next tick.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use hde_client::HttpWarApi;
use hde_exporter::{bind, ExporterConfig, MetricsRegistry, PlanetNames, Scraper};
use hde_runtime::{
    initialize_logging_with_config, load_dotenv, setup_shutdown_token, ErrorPolicy,
    PeriodicScheduler,
};

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let config = ExporterConfig::parse();

    // Initialize logging first
    initialize_logging_with_config(config.log_level(), config.logging.format)?;
    config.validate().context("Invalid configuration")?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        collector = %config.collector,
        "Starting hde-exporter"
    );

    let planets =
        PlanetNames::load(&config.json_data_dir).context("Failed to load static assets")?;

    let registry = Arc::new(MetricsRegistry::new().context("Failed to build metrics registry")?);
    registry.set_build_info(env!("CARGO_PKG_VERSION"), &config.collector);

    let api = HttpWarApi::new(&config.api_url, config.request_timeout())
        .context("Failed to create API client")?;
    let scraper = Scraper::new(
        Arc::new(api),
        registry.clone(),
        planets,
        config.war_id,
        config.request_timeout(),
    );

    let cancel = setup_shutdown_token();
    let (_, server) = bind(
        registry,
        config.listen_addr()?,
        &config.metrics_path_segments(),
        cancel.clone(),
    )
    .context("Failed to start metrics server")?;
    let server_handle = tokio::spawn(server);

    let scheduler =
        PeriodicScheduler::new("scrape", config.scrape_interval(), ErrorPolicy::Continue);
    let scraper = &scraper;
    let runs = scheduler
        .run(&cancel, move || async move { scraper.scrape().await.map(|_| ()) })
        .await?;

    server_handle.await.context("Metrics server task failed")?;
    info!(runs, "hde-exporter shutdown complete");
    Ok(())
}
