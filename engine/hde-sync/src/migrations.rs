//! Forward-only schema migrations

use sqlx::migrate::Migrator;
use sqlx::PgPool;
use std::path::Path;
use tracing::info;

use crate::error::Result;

/// Load the ordered migration files from `dir`
pub async fn load_migrations(dir: &Path) -> Result<Migrator> {
    let migrator = Migrator::new(dir.to_path_buf()).await?;
    Ok(migrator)
}

/// Apply every pending migration found in `dir`
pub async fn run_migrations(pool: &PgPool, dir: &Path) -> Result<()> {
    info!(migrations_dir = %dir.display(), "Performing database migrations");
    let migrator = load_migrations(dir).await?;
    migrator.run(pool).await?;
    info!(migrations = migrator.iter().count(), "Database migrations complete");
    Ok(())
}
