// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

use crate::auth::AuthError;
use crate::rag::{ExtractError, RagError};
use crate::users::UserStoreError;

const INTERNAL_MESSAGE: &str = "Internal server error";

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    Validation(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound,
    Conflict(String),
    PayloadTooLarge { limit: usize },
    /// Embedding, index or model failure; details stay in the logs
    Upstream,
    Internal,
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound => 404,
            ApiError::Conflict(_) => 409,
            ApiError::PayloadTooLarge { .. } => 413,
            ApiError::Upstream | ApiError::Internal => 500,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let error = match self {
            ApiError::Validation(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Conflict(msg) => msg.clone(),
            ApiError::NotFound => "Not found".to_string(),
            ApiError::PayloadTooLarge { limit } => {
                format!("File exceeds the {} byte upload limit", limit)
            }
            ApiError::Upstream | ApiError::Internal => INTERNAL_MESSAGE.to_string(),
        };
        ErrorResponse { error }
    }

    pub fn authentication_required() -> Self {
        ApiError::Unauthorized("Authentication required".to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound => write!(f, "Not found"),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::PayloadTooLarge { limit } => write!(f, "Payload larger than {} bytes", limit),
            ApiError::Upstream => write!(f, "Upstream service failure"),
            ApiError::Internal => write!(f, "Internal error"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_response())).into_response()
    }
}

impl From<RagError> for ApiError {
    fn from(err: RagError) -> Self {
        match err {
            RagError::InvalidQuery(msg) => ApiError::Validation(msg),
            RagError::Chunking(e) => {
                error!("Chunking misconfigured: {}", e);
                ApiError::Internal
            }
            other => {
                error!("RAG pipeline failed: {}", other);
                ApiError::Upstream
            }
        }
    }
}

impl From<UserStoreError> for ApiError {
    fn from(err: UserStoreError) -> Self {
        match err {
            UserStoreError::DuplicateEmail(_) => {
                ApiError::Conflict("User with this email already exists".to_string())
            }
            other => {
                error!("User store failed: {}", other);
                ApiError::Internal
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => ApiError::authentication_required(),
            AuthError::InvalidToken(_) | AuthError::UnknownSubject(_) => {
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
            AuthError::Forbidden { .. } => ApiError::Forbidden(err.to_string()),
            AuthError::Store(e) => e.into(),
        }
    }
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Unsupported | ExtractError::Empty => ApiError::Validation(err.to_string()),
            ExtractError::Parse(e) => {
                error!("PDF parsing failed: {}", e);
                ApiError::Internal
            }
        }
    }
}
