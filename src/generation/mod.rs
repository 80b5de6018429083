// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Generative model call contract: prompt in, text out

pub mod openai;

use async_trait::async_trait;
use thiserror::Error;

pub use openai::OpenAiChatModel;

#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("Generative model unavailable: {0}")]
    Unavailable(String),

    #[error("Generative model rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Generative model rejected credentials (status {status})")]
    Unauthorized { status: u16 },

    #[error("Generative model returned no text")]
    EmptyResponse,
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Answer `user` under the `system` instruction
    async fn complete(&self, system: &str, user: &str) -> Result<String, GenerationError>;

    fn model_name(&self) -> &str;
}
