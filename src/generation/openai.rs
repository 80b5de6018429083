// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Chat completions via an OpenAI-compatible API
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

use super::{ChatModel, GenerationError};

// --- OpenAI-compatible serde structs ---

#[derive(serde::Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(serde::Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(serde::Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}

#[derive(serde::Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(serde::Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(serde::Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

pub struct OpenAiChatModel {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model_name: String,
    temperature: f32,
}

impl OpenAiChatModel {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model_name: &str,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Unavailable(format!("HTTP client: {}", e)))?;
        let endpoint = format!("{}/v1/chat/completions", base_url.trim_end_matches('/'));

        info!(
            "Chat model configured: endpoint={}, model={}",
            endpoint, model_name
        );

        Ok(Self {
            client,
            endpoint,
            api_key,
            model_name: model_name.to_string(),
            temperature,
        })
    }
}

fn classify_status(status: StatusCode, body: String) -> GenerationError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Unauthorized {
            status: status.as_u16(),
        },
        s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => {
            GenerationError::Unavailable(format!("{}: {}", s, body))
        }
        s => GenerationError::Rejected {
            status: s.as_u16(),
            message: body,
        },
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, system: &str, user: &str) -> Result<String, GenerationError> {
        let start = std::time::Instant::now();
        let request = ChatRequest {
            model: &self.model_name,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.temperature,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder
            .send()
            .await
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(status, response.text().await.unwrap_or_default()));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Unavailable(format!("malformed response: {}", e)))?;
        let tokens_used = chat_response.usage.map(|u| u.total_tokens).unwrap_or(0);
        let text = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or(GenerationError::EmptyResponse)?;

        debug!(
            "Chat completion: {} chars, {} tokens, {}ms",
            text.len(),
            tokens_used,
            start.elapsed().as_millis()
        );
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
