//! Caller-driven retry with exponential backoff
//!
//! Only retryable adapter errors (rate-limited, server error, transport)
//! are retried; everything else is returned to the caller immediately.

use std::future::Future;
use std::time::Duration;

use log::warn;

use crate::error::ExchangeError;

/// Exponential backoff policy for retryable adapter failures
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or
    /// the attempt budget is exhausted.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, ExchangeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ExchangeError>>,
    {
        let mut delay = self.base_delay;
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() && attempt < self.max_attempts => {
                    warn!(
                        "retryable exchange error (attempt {attempt}/{}): {error}",
                        self.max_attempts
                    );
                    // Rate-limit responses carry their own delay hint
                    let wait = match &error {
                        ExchangeError::RateLimited { retry_after_ms } => {
                            Duration::from_millis(*retry_after_ms).max(delay)
                        }
                        _ => delay,
                    };
                    tokio::time::sleep(wait).await;
                    delay *= 2;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
