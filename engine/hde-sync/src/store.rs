//! News persistence

use async_trait::async_trait;
use hde_client::{NewsItem, WarId};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::Result;

/// Postgres accepts at most 65535 bind parameters per statement; every news
/// row binds four.
pub const MAX_ROWS_PER_STATEMENT: usize = 16_000;

/// Storage seam of the reconciler.
///
/// The cursor is not stored: it is derived from the rows already persisted.
#[async_trait]
pub trait NewsStore: Send + Sync {
    /// Highest `published_at` stored for `war_id`, 0 when there is none
    async fn high_water_mark(&self, war_id: WarId) -> Result<i64>;

    /// Insert `items`, silently skipping any `(war_id, id)` already stored.
    /// Returns the number of rows actually written.
    async fn insert_news(&self, war_id: WarId, items: &[NewsItem]) -> Result<u64>;
}

/// Postgres-backed [`NewsStore`]
#[derive(Debug, Clone)]
pub struct PgNewsStore {
    pool: PgPool,
}

impl PgNewsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool against `database_url`
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await?;
        info!(max_connections, "Connected to database");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Number of news rows stored for `war_id`
    pub async fn count_news(&self, war_id: WarId) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM news WHERE war_id = $1")
            .bind(war_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    fn insert_statement<'a>(war_id: WarId, rows: &'a [NewsItem]) -> QueryBuilder<'a, Postgres> {
        let mut builder: QueryBuilder<'a, Postgres> =
            QueryBuilder::new("INSERT INTO news (war_id, id, published_at, message) ");
        builder.push_values(rows, |mut row, item| {
            row.push_bind(war_id)
                .push_bind(item.id)
                .push_bind(item.published)
                .push_bind(item.message.as_str());
        });
        builder.push(" ON CONFLICT (war_id, id) DO NOTHING");
        builder
    }
}

#[async_trait]
impl NewsStore for PgNewsStore {
    async fn high_water_mark(&self, war_id: WarId) -> Result<i64> {
        let mark = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(MAX(published_at), 0)::BIGINT FROM news WHERE war_id = $1",
        )
        .bind(war_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(mark)
    }

    async fn insert_news(&self, war_id: WarId, items: &[NewsItem]) -> Result<u64> {
        if items.is_empty() {
            return Ok(0);
        }

        // A single statement is atomic on its own; oversized batches are split
        // and wrapped in a transaction to keep the all-or-nothing behaviour.
        if items.len() <= MAX_ROWS_PER_STATEMENT {
            let result = Self::insert_statement(war_id, items).build().execute(&self.pool).await?;
            debug!(war_id, rows = items.len(), inserted = result.rows_affected(), "Inserted news");
            return Ok(result.rows_affected());
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;
        for chunk in items.chunks(MAX_ROWS_PER_STATEMENT) {
            let result = Self::insert_statement(war_id, chunk).build().execute(&mut *tx).await?;
            inserted += result.rows_affected();
        }
        tx.commit().await?;

        debug!(war_id, rows = items.len(), inserted, "Inserted news in chunks");
        Ok(inserted)
    }
}
