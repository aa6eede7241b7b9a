//! Exponential-backoff retry for transient I/O.
//!
//! Used for outbound deliveries that may hit a flaky network. It is never
//! applied to conditional updates: retrying those with a stale version token
//! would only reproduce the conflict.

use std::future::Future;
use std::time::Duration;

/// How many times to try an operation and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Always at least 1.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub initial_delay: Duration,
    /// Upper bound for any single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay,
        }
    }

    /// A policy that tries exactly once.
    pub const fn none() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Delay to wait after the given failed attempt (1-based).
    ///
    /// Doubles per attempt starting from `initial_delay`, capped at
    /// `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.initial_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    /// Four attempts with 1 s, 2 s, 4 s between them.
    fn default() -> Self {
        Self::new(4, Duration::from_secs(1), Duration::from_secs(8))
    }
}

/// Run `op` until it succeeds or the policy is exhausted.
///
/// `op` receives the 1-based attempt number. The error of the last attempt is
/// returned when every attempt fails.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(_) => {
                tokio::time::sleep(policy.delay_for(attempt)).await;
                attempt += 1;
            }
        }
    }
}
