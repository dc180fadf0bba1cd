//! Retry utilities for calls that can fail transiently
//!
//! Used around Tvheadend deletes, where giving up early would leave a mux
//! orphaned on the server. Backoff is exponential with random jitter.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::RetrySettings;
use crate::errors::AppResult;

/// Configuration for retry behaviour
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Cap on the delay between retries
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    /// Add up to 25% random jitter to each delay
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn from_settings(settings: &RetrySettings) -> AppResult<Self> {
        Ok(Self {
            max_attempts: settings.max_attempts.max(1),
            initial_delay: crate::config::parse_duration(
                &settings.initial_delay,
                "retry.initial_delay",
            )?,
            max_delay: crate::config::parse_duration(&settings.max_delay, "retry.max_delay")?,
            ..Self::default()
        })
    }

    /// A single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

/// Execute an operation, retrying while `is_retryable` says the error is transient.
///
/// Returns the first success, the first non-retryable error, or the last
/// error once `max_attempts` is exhausted.
pub async fn with_retry<T, E, F, Fut, P>(
    config: &RetryConfig,
    mut operation: F,
    operation_name: &str,
    is_retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        "Operation '{}' succeeded on attempt {}/{}",
                        operation_name, attempt, max_attempts
                    );
                }
                return Ok(result);
            }
            Err(err) if !is_retryable(&err) => {
                debug!(
                    "Operation '{}' failed with non-retryable error: {}",
                    operation_name, err
                );
                return Err(err);
            }
            Err(err) if attempt >= max_attempts => {
                warn!(
                    "Operation '{}' failed after {} attempts: {}",
                    operation_name, max_attempts, err
                );
                return Err(err);
            }
            Err(err) => {
                let delay = calculate_delay(config, attempt);
                warn!(
                    "Operation '{}' failed on attempt {}/{}, retrying in {:?}: {}",
                    operation_name, attempt, max_attempts, delay, err
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

fn calculate_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let exponential = config.initial_delay.as_millis() as f64
        * config.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
    let delay_ms = exponential.min(config.max_delay.as_millis() as f64) as u64;

    let jitter_ms = if config.jitter && delay_ms >= 4 {
        rand::rng().random_range(0..=delay_ms / 4)
    } else {
        0
    };

    Duration::from_millis(delay_ms + jitter_ms)
}
