// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::ApiError;
use super::http_server::AppState;
use super::middleware::AuthenticatedUser;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    /// Number of chunks to retrieve
    pub k: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

pub async fn chat_handler(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;
    if request.message.trim().is_empty() {
        return Err(ApiError::Validation("Message is required".to_string()));
    }

    let k = state.limits.clamp_k(request.k);
    debug!("Chat query from user {} (k={})", identity.user_id, k);

    let response = state.services.retrieval.answer(&request.message, k).await?;
    Ok(Json(ChatResponse { response }))
}
