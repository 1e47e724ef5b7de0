//! Retry logic with exponential backoff for webhook deliveries.
//!
//! Every failure is retryable: transport errors, timeouts and non-2xx
//! responses alike. The loop is strictly sequential and sleeps only between
//! attempts, never after the last one.
//!
//! Delays for `base = 1000ms`, `max_attempts = 3`: 1000ms → 2000ms.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Attempt cap and backoff base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Build a policy. A zero attempt cap is raised to one.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Total attempts, including the first.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the second attempt.
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Delay to wait after failed attempt `attempt` (1-based):
    /// `base * 2^(attempt-1)`. `None` once the cap is reached.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt >= self.max_attempts {
            return None;
        }
        let factor = 2u32.saturating_pow(attempt - 1);
        Some(self.base_delay.saturating_mul(factor))
    }

    /// Every delay the policy would sleep on perpetual failure, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.max_attempts).filter_map(|attempt| self.delay_after(attempt))
    }
}

/// The loop gave up. Carries the last failure.
#[derive(Debug)]
pub struct Exhausted<E> {
    /// Attempts made.
    pub attempts: u32,
    /// Failure from the final attempt.
    pub last_error: E,
}

/// Run `op` until it succeeds or the policy's attempt cap is reached.
///
/// `op` receives the 1-based attempt number. On success returns the value
/// together with the number of attempts it took.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    endpoint: &str,
    mut op: F,
) -> Result<(T, u32), Exhausted<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok((value, attempt)),
            Err(e) => {
                tracing::warn!(
                    endpoint,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "webhook attempt failed"
                );
                match policy.delay_after(attempt) {
                    Some(delay) => {
                        tracing::info!(
                            endpoint,
                            next_attempt = attempt + 1,
                            delay_ms = delay.as_millis() as u64,
                            "retrying webhook in {delay:?}"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        tracing::error!(
                            endpoint,
                            attempts = attempt,
                            error = %e,
                            "webhook delivery exhausted all attempts"
                        );
                        return Err(Exhausted {
                            attempts: attempt,
                            last_error: e,
                        });
                    }
                }
            }
        }
    }
}
