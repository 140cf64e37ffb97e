//! Retry policies and exponential backoff.
//!
//! The same backoff curve drives HTTP retries and push-stream reconnects.

use std::time::Duration;

/// Retry policy for an HTTP request.
#[derive(Debug, Clone, Default)]
pub enum RetryPolicy {
    /// No retries. Account opening and trades are never replayed.
    #[default]
    None,
    /// Retry on transport failures + 502/503/504, with backoff on 429.
    /// Uses the client's configured [`RetryConfig`].
    Idempotent,
    /// User-provided retry logic.
    Custom(RetryConfig),
}

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not counting the initial request).
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each retry.
    pub backoff_factor: f64,
    /// Spread each delay by ±25%.
    pub jitter: bool,
    /// HTTP status codes that trigger a retry.
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::idempotent()
    }
}

impl RetryConfig {
    /// The default config for idempotent (GET) requests.
    pub fn idempotent() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
            backoff_factor: 2.0,
            jitter: true,
            retryable_statuses: vec![429, 502, 503, 504],
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    pub fn is_retryable_status(&self, status: u16) -> bool {
        self.retryable_statuses.contains(&status)
    }

    /// Calculate delay for a given attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let capped = exponential_delay(
            self.initial_delay,
            self.backoff_factor,
            attempt,
            self.max_delay,
        );
        if self.jitter {
            with_jitter(capped, 0.25)
        } else {
            capped
        }
    }
}

/// `base * factor^attempt`, capped at `cap`.
pub fn exponential_delay(base: Duration, factor: f64, attempt: u32, cap: Duration) -> Duration {
    let exp = attempt.min(30) as i32;
    let ms = base.as_millis() as f64 * factor.powi(exp);
    let capped = ms.min(cap.as_millis() as f64).max(0.0);
    Duration::from_millis(capped as u64)
}

/// Spread `delay` uniformly by ±`fraction`.
pub fn with_jitter(delay: Duration, fraction: f64) -> Duration {
    let ms = delay.as_millis() as f64;
    let range = ms * fraction;
    let jitter = (rand::random::<f64>() - 0.5) * 2.0 * range;
    Duration::from_millis((ms + jitter).max(0.0) as u64)
}
