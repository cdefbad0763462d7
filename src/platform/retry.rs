//! Timeouts and retries for remote calls
//!
//! Reads are retried with doubling backoff. Writes (branch, fork, file, PR)
//! go out once so a slow success is never duplicated.

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Retry and timeout settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts for an idempotent call (1 = no retry)
    pub attempts: u32,
    /// Delay before the second attempt; doubles afterwards
    pub base_delay: Duration,
    /// Upper bound on any single remote call
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(500),
            call_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Run an idempotent operation, retrying failures and timeouts
    ///
    /// Validation errors are returned immediately.
    pub async fn retry_read<T, F, Fut>(&self, op: &str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut delay = self.base_delay;
        let mut attempt = 1;
        loop {
            match with_timeout(self.call_timeout, op, call()).await {
                Ok(value) => return Ok(value),
                Err(err @ Error::Validation(_)) => return Err(err),
                Err(err) if attempt >= self.attempts => return Err(err),
                Err(err) => {
                    warn!(op, attempt, error = %err, "retrying read");
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                    attempt += 1;
                }
            }
        }
    }

    /// Run a side-effecting operation exactly once, bounded by the timeout
    pub async fn write_once<T, Fut>(&self, op: &str, call: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        with_timeout(self.call_timeout, op, call).await
    }
}

/// Bound a future by `limit`, mapping expiry to [`Error::Timeout`]
pub async fn with_timeout<T, Fut>(limit: Duration, op: &str, call: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| Error::Timeout(op.to_string()))?
}
