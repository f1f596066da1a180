use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// What to do when one run of the task fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop the scheduler and hand the error back to the caller
    Abort,
    /// Log the error and wait for the next run
    Continue,
}

/// Runs a task, then waits a fixed interval, until cancelled.
///
/// There is no backoff and no jitter: the pause between the end of one run
/// and the start of the next is always `interval`.
#[derive(Debug, Clone)]
pub struct PeriodicScheduler {
    name: &'static str,
    interval: Duration,
    policy: ErrorPolicy,
}

impl PeriodicScheduler {
    pub fn new(name: &'static str, interval: Duration, policy: ErrorPolicy) -> Self {
        Self { name, interval, policy }
    }

    /// Drive `task` until `cancel` fires.
    ///
    /// Returns the number of completed runs. Under [`ErrorPolicy::Abort`] the
    /// first failing run ends the loop with its error.
    pub async fn run<F, Fut, E>(&self, cancel: &CancellationToken, mut task: F) -> Result<u64, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        info!(scheduler = self.name, interval_secs = self.interval.as_secs(), "Starting scheduler");
        let mut runs = 0u64;

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                outcome = task() => outcome,
            };
            runs += 1;

            if let Err(e) = outcome {
                match self.policy {
                    ErrorPolicy::Abort => {
                        error!(scheduler = self.name, run = runs, error = %e, "Run failed, stopping");
                        return Err(e);
                    }
                    ErrorPolicy::Continue => {
                        warn!(scheduler = self.name, run = runs, error = %e, "Run failed");
                    }
                }
            }

            debug!(scheduler = self.name, run = runs, "Sleeping until next run");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = sleep(self.interval) => {}
            }
        }

        info!(scheduler = self.name, runs, "Scheduler stopped");
        Ok(runs)
    }
}
