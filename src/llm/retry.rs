//! Bounded exponential backoff around generation calls.
//!
//! Only overloaded and rate-limited failures are retried. Delays are
//! deterministic (no jitter): `base × 2^attempt` for overloaded, twice that for
//! rate limits. After `max_attempts` calls the last error is returned.

use std::future::Future;
use std::time::Duration;

use super::error::{LlmError, RetryClass};

/// Retry behavior for generation calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of calls, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry of an overloaded call.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt bound and base delay.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay to wait after the zero-based `attempt` failed with `class`.
    ///
    /// Returns `None` for permanent errors.
    pub fn delay_for(&self, class: RetryClass, attempt: u32) -> Option<Duration> {
        let exponential = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        match class {
            RetryClass::Overloaded => Some(exponential),
            RetryClass::RateLimited => Some(exponential.saturating_mul(2)),
            RetryClass::Permanent => None,
        }
    }
}

/// Invoke `call` until it succeeds, fails permanently, or the policy's attempts
/// are exhausted.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut call: F) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        match call().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!("Generation call succeeded after {} retries", attempt);
                }
                return Ok(value);
            }
            Err(error) => {
                let class = error.retry_class();
                let is_last = attempt + 1 >= max_attempts;

                match policy.delay_for(class, attempt) {
                    Some(delay) if !is_last => {
                        tracing::warn!(
                            attempt = attempt + 1,
                            max_attempts,
                            class = ?class,
                            delay_ms = delay.as_millis() as u64,
                            "Generation call failed, retrying: {}",
                            error
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    Some(_) => {
                        tracing::error!(
                            "Generation call failed after {} attempts: {}",
                            max_attempts,
                            error
                        );
                        return Err(error);
                    }
                    None => {
                        tracing::debug!("Generation call failed (non-retryable): {}", error);
                        return Err(error);
                    }
                }
            }
        }
    }
}
