//! Retry policy for lookup calls
//!
//! The default is a fixed ten second pause between up to ten attempts.

use crate::api::error::ApiError;
use log::{debug, info, warn};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    /// Pause after each failed attempt
    pub delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::fixed(10, Duration::from_secs(10))
    }
}

impl RetryConfig {
    /// Same pause between every attempt
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// No pause between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self::fixed(max_attempts, Duration::ZERO)
    }
}

/// Every attempt failed; carries the last error seen
#[derive(Debug, Error)]
#[error("gave up after {attempts} attempts: {source}")]
pub struct RetryExhausted {
    pub attempts: u32,
    #[source]
    pub source: ApiError,
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Run `operation` until it succeeds or the attempt ceiling is reached
    pub async fn execute<F, Fut, T>(&self, label: &str, operation: F) -> Result<T, RetryExhausted>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            debug!("{} (attempt {}/{})", label, attempt, max_attempts);

            match operation().await {
                Ok(result) => {
                    if attempt > 1 {
                        info!("{} succeeded after {} attempts", label, attempt);
                    }
                    return Ok(result);
                }
                Err(error) if attempt >= max_attempts => {
                    warn!("{} failed permanently on attempt {}: {}", label, attempt, error);
                    return Err(RetryExhausted {
                        attempts: attempt,
                        source: error,
                    });
                }
                Err(error) => {
                    warn!("{} failed on attempt {}: {}", label, attempt, error);
                    debug!("Waiting {:?} before retry", self.config.delay);
                    tokio::time::sleep(self.config.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
