//! Token bucket rate limiting for upstream API calls

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

use crate::error::{Result, SyncError};

/// Token bucket shared by every reconciliation scope of the process.
///
/// The bucket starts full, holds at most `burst` tokens and refills
/// continuously at `rate_per_second`.
pub struct RateLimiter {
    rate_per_second: f64,
    burst: u32,
    state: Mutex<BucketState>,
}

struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl BucketState {
    fn refill(&mut self, now: Instant, rate_per_second: f64, burst: u32) {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rate_per_second).min(burst as f64);
        self.last_refill = now;
    }
}

impl RateLimiter {
    /// Create a new rate limiter
    pub fn new(rate_per_second: f64, burst: u32) -> Self {
        Self {
            rate_per_second,
            burst,
            state: Mutex::new(BucketState { tokens: burst as f64, last_refill: Instant::now() }),
        }
    }

    /// Take a token if one is available right now
    pub async fn try_acquire(&self) -> bool {
        self.reserve().await.is_none()
    }

    /// Wait for a token.
    ///
    /// Returns how long the caller waited, or [`SyncError::Cancelled`] if
    /// `cancel` fired first.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<Duration> {
        let started = Instant::now();

        loop {
            let wait = match self.reserve().await {
                None => return Ok(started.elapsed()),
                Some(wait) => wait,
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SyncError::Cancelled),
                _ = sleep(wait) => {}
            }
        }
    }

    /// Tokens currently in the bucket
    pub async fn available(&self) -> f64 {
        let mut state = self.state.lock().await;
        state.refill(Instant::now(), self.rate_per_second, self.burst);
        state.tokens
    }

    /// Consume a token and return `None`, or return the time until one is available
    async fn reserve(&self) -> Option<Duration> {
        let mut state = self.state.lock().await;
        state.refill(Instant::now(), self.rate_per_second, self.burst);

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            return None;
        }

        // Tiny rates overflow `Duration`; tokio saturates the sleep deadline.
        let missing = 1.0 - state.tokens;
        Some(Duration::try_from_secs_f64(missing / self.rate_per_second).unwrap_or(Duration::MAX))
    }
}
