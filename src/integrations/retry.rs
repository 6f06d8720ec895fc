//! Retry with exponential backoff for provider calls
//!
//! Transient provider failures (network resets, 5xx, rate limits) are
//! retried with capped exponential backoff; everything else surfaces on the
//! first attempt.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Backoff policy for a retried call
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,

    pub initial_backoff: Duration,

    /// Upper bound for any single wait, including server-requested ones
    pub max_backoff: Duration,

    pub multiplier: f64,

    /// Spread waits by up to 25% so parallel fetches don't retry in lockstep
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Wait before retry number `attempt` (0-based)
    ///
    /// Grows by `multiplier` per attempt up to `max_backoff`; with jitter on,
    /// up to a quarter more is added on top of the capped value.
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        let growth = self.multiplier.max(1.0).powi(attempt.min(i32::MAX as u32) as i32);
        let wait = Duration::try_from_secs_f64(self.initial_backoff.as_secs_f64() * growth)
            .map_or(self.max_backoff, |d| d.min(self.max_backoff));

        if !self.jitter {
            return wait;
        }
        wait + wait.mul_f64(spread(attempt) / 4.0)
    }
}

/// Value in `0.0..1.0` that differs between calls and threads
fn spread(attempt: u32) -> f64 {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hash, Hasher};

    let mut hasher = RandomState::new().build_hasher();
    attempt.hash(&mut hasher);
    std::thread::current().id().hash(&mut hasher);
    (hasher.finish() >> 11) as f64 / (1u64 << 53) as f64
}

/// How a failed call should be handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry,
    /// Retry after a server-provided delay (e.g. `Retry-After`)
    RetryAfter(Duration),
    NoRetry,
}

/// Errors that know whether they are transient
pub trait RetryableError {
    fn retry_decision(&self) -> RetryDecision;
}

/// Run `operation` until it succeeds, fails permanently, or retries run out
///
/// Returns the last error when giving up.
pub async fn with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        let wait = match err.retry_decision() {
            RetryDecision::NoRetry => {
                debug!(operation = operation_name, attempt, error = %err, "Permanent failure");
                return Err(err);
            }
            _ if attempt >= config.max_retries => {
                warn!(
                    operation = operation_name,
                    attempts = attempt + 1,
                    error = %err,
                    "Giving up after retries"
                );
                return Err(err);
            }
            RetryDecision::RetryAfter(d) => d.min(config.max_backoff),
            RetryDecision::Retry => config.backoff_duration(attempt),
        };

        warn!(
            operation = operation_name,
            attempt = attempt + 1,
            max_attempts = config.max_retries + 1,
            backoff_ms = wait.as_millis() as u64,
            error = %err,
            "Retrying provider call"
        );
        sleep(wait).await;
        attempt += 1;
    }
}
