//! Helldivers 2 news synchroniser
//!
//! Polls the news feed of one or more wars and appends every new dispatch to
//! Postgres. The last persisted `published_at` acts as the cursor, so the
//! process can be restarted at any point without losing or duplicating rows.

pub mod config;
pub mod error;
pub mod migrations;
pub mod rate_limiter;
pub mod reconciler;
pub mod store;


pub use config::SyncConfig;
pub use error::{Result, SyncError};
pub use migrations::{load_migrations, run_migrations};
pub use rate_limiter::RateLimiter;
pub use reconciler::{next_cursor, CycleReport, NewsReconciler, NewsScope, RESOURCE_NEWS};
pub use store::{NewsStore, PgNewsStore, MAX_ROWS_PER_STATEMENT};
