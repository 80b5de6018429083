// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use super::EmbeddingError;

/// Bounded exponential backoff for embedding calls
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based): base, 2x base, 4x base...
    pub fn delay_for(&self, attempt: u32, error: &EmbeddingError) -> Duration {
        let backoff = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay);
        match error.retry_after() {
            Some(hint) => hint.min(self.max_delay).max(backoff),
            None => backoff,
        }
    }

    /// Run `op` until it succeeds, fails permanently, or retries run out
    pub async fn run<F, Fut, T>(&self, mut op: F) -> Result<T, EmbeddingError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EmbeddingError>>,
    {
        let mut attempt = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.delay_for(attempt, &e);
                    warn!(
                        "Embedding attempt {}/{} failed: {} (retrying in {}ms)",
                        attempt + 1,
                        self.max_retries + 1,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
