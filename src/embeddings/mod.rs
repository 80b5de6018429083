// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text embeddings
//!
//! [`Embedder`] maps text to a fixed-length dense vector. The remote
//! implementation retries transient failures with bounded backoff; the
//! hashing implementation runs locally and is used offline and in tests.

pub mod hashing;
pub mod openai;
pub mod retry;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use hashing::HashingEmbedder;
pub use openai::OpenAiEmbedder;
pub use retry::RetryPolicy;

#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    #[error("Embedding provider rate limited the request")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Embedding provider unavailable: {0}")]
    Unavailable(String),

    #[error("Embedding input rejected: {0}")]
    MalformedInput(String),

    #[error("Embedding provider rejected credentials (status {status})")]
    Unauthorized { status: u16 },

    #[error("Embedding has {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl EmbeddingError {
    /// Rate limits and outages are worth another attempt; nothing else is
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            EmbeddingError::RateLimited { .. } | EmbeddingError::Unavailable(_)
        )
    }

    /// Server-suggested wait before retrying, when one was given
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            EmbeddingError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed `text` into a vector of exactly [`Embedder::dimension`] components
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    fn dimension(&self) -> usize;

    fn model_name(&self) -> &str;
}
