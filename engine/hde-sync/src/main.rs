//! News synchroniser entry point
//!
//! Connects to Postgres, applies migrations, then reconciles the news feed of
//! every configured war once per poll interval until a shutdown signal
//! arrives. Any failed cycle terminates the process with a non-zero status.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

use hde_client::HttpWarApi;
use hde_runtime::{
    initialize_logging_with_config, load_dotenv, setup_shutdown_token, ErrorPolicy,
    PeriodicScheduler,
};
use hde_sync::{run_migrations, NewsReconciler, PgNewsStore, RateLimiter, SyncConfig};

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let config = SyncConfig::parse();

    // Initialize logging first
    initialize_logging_with_config(config.log_level(), config.logging.format)?;
    config.validate().context("Invalid configuration")?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting hde-sync");
    info!(
        api_url = %config.api_url,
        wars = ?config.war_ids,
        language = %config.language,
        poll_interval_secs = config.poll_interval_secs,
        "Configuration loaded"
    );

    let store = PgNewsStore::connect(&config.postgres_url, config.max_connections)
        .await
        .context("Failed to connect to database")?;
    run_migrations(store.pool(), &config.migrations_dir)
        .await
        .context("Failed to perform database migrations")?;

    let api = HttpWarApi::new(&config.api_url, config.request_timeout())
        .context("Failed to create API client")?;
    let limiter = RateLimiter::new(config.rate_limit_per_second, config.rate_limit_burst);
    let reconciler =
        NewsReconciler::new(Arc::new(limiter), Arc::new(api), Arc::new(store), &config.language);

    let cancel = setup_shutdown_token();
    let scopes = config.scopes();
    let scheduler = PeriodicScheduler::new("news", config.poll_interval(), ErrorPolicy::Abort);

    let reconciler = &reconciler;
    let scopes = scopes.as_slice();
    let token = &cancel;
    let runs = scheduler
        .run(&cancel, move || async move {
            reconciler.reconcile_all(scopes, token).await.map(|_| ())
        })
        .await
        .context("News reconciliation failed")?;

    info!(runs, "hde-sync shutdown complete");
    Ok(())
}
