use hde_client::{NewsItem, WarApi, WarId};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::Result;
use crate::rate_limiter::RateLimiter;
use crate::store::NewsStore;

/// Resource name used in logs
pub const RESOURCE_NEWS: &str = "news";

/// The (resource, war) pair a news cursor is tracked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NewsScope {
    pub war_id: WarId,
}

impl NewsScope {
    pub fn new(war_id: WarId) -> Self {
        Self { war_id }
    }
}

/// Outcome of one reconciliation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub war_id: WarId,
    /// Records returned by the upstream
    pub fetched: usize,
    /// Records that were not already stored
    pub inserted: u64,
    /// Cursor read before fetching
    pub previous_cursor: i64,
    /// Cursor after this cycle
    pub cursor: i64,
}

/// New cursor after a batch: the highest `published` seen, never lower than
/// the current cursor whatever order the upstream returned the items in.
pub fn next_cursor(current: i64, batch: &[NewsItem]) -> i64 {
    batch.iter().map(|item| item.published).fold(current, i64::max)
}

/// Cursor-based reconciler for the news feed.
///
/// Shares one rate limiter, one store and one upstream client across every
/// scope it is asked to reconcile.
pub struct NewsReconciler {
    limiter: Arc<RateLimiter>,
    api: Arc<dyn WarApi>,
    store: Arc<dyn NewsStore>,
    language: String,
}

impl NewsReconciler {
    pub fn new(
        limiter: Arc<RateLimiter>,
        api: Arc<dyn WarApi>,
        store: Arc<dyn NewsStore>,
        language: impl Into<String>,
    ) -> Self {
        Self { limiter, api, store, language: language.into() }
    }

    /// Run one fetch-and-persist pass for `scope`.
    ///
    /// Nothing is written unless the upstream answered 200, and the whole
    /// batch goes to storage in a single insert.
    pub async fn reconcile_cycle(
        &self,
        scope: NewsScope,
        cancel: &CancellationToken,
    ) -> Result<CycleReport> {
        let war_id = scope.war_id;
        debug!(manager = RESOURCE_NEWS, war_id, "Reconciling");

        let wait_time = self.limiter.acquire(cancel).await?;
        debug!(
            manager = RESOURCE_NEWS,
            war_id,
            wait_time_secs = wait_time.as_secs_f64(),
            "Rate limiter wait time"
        );

        let cursor = self.store.high_water_mark(war_id).await.map_err(|e| {
            error!(manager = RESOURCE_NEWS, war_id, error = %e, "Failed to get max published_at");
            e
        })?;
        debug!(manager = RESOURCE_NEWS, war_id, from_timestamp = cursor, "Got max published_at");

        let batch = self.fetch_batch(war_id, cursor.saturating_add(1)).await?;

        let report = if batch.is_empty() {
            debug!(manager = RESOURCE_NEWS, war_id, "No news");
            CycleReport { war_id, fetched: 0, inserted: 0, previous_cursor: cursor, cursor }
        } else {
            debug!(manager = RESOURCE_NEWS, war_id, count = batch.len(), "Got news");
            let inserted = self.store.insert_news(war_id, &batch).await.map_err(|e| {
                error!(manager = RESOURCE_NEWS, war_id, error = %e, "Failed to insert news");
                e
            })?;
            CycleReport {
                war_id,
                fetched: batch.len(),
                inserted,
                previous_cursor: cursor,
                cursor: next_cursor(cursor, &batch),
            }
        };

        info!(
            manager = RESOURCE_NEWS,
            war_id,
            reconciled = report.fetched,
            inserted = report.inserted,
            from_timestamp = report.cursor,
            "Reconciled"
        );
        Ok(report)
    }

    /// Reconcile every scope in order, stopping at the first failure
    pub async fn reconcile_all(
        &self,
        scopes: &[NewsScope],
        cancel: &CancellationToken,
    ) -> Result<Vec<CycleReport>> {
        let mut reports = Vec::with_capacity(scopes.len());
        for scope in scopes {
            reports.push(self.reconcile_cycle(*scope, cancel).await?);
        }
        Ok(reports)
    }

    async fn fetch_batch(&self, war_id: WarId, from_timestamp: i64) -> Result<Vec<NewsItem>> {
        let response = self
            .api
            .news_feed(war_id, from_timestamp, &self.language)
            .await
            .map_err(|e| {
                error!(manager = RESOURCE_NEWS, war_id, error = %e, "Failed to get news");
                e
            })?;

        let status = response.status;
        response.into_result().map_err(|e| {
            error!(manager = RESOURCE_NEWS, war_id, status_code = status, "Failed to get news");
            e.into()
        })
    }
}
