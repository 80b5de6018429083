// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PDF upload and ingestion
//!
//! Size and type checks run before any parsing, so an oversized or
//! non-PDF upload never reaches the chunker or the index.

use axum::extract::State;
use axum::http::{header::CONTENT_LENGTH, HeaderMap, StatusCode};
use axum::Json;
use axum_extra::extract::multipart::{Multipart, MultipartError};
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::errors::ApiError;
use super::http_server::AppState;
use super::middleware::AuthenticatedUser;
use crate::rag::ExtractError;
use crate::vector::ChunkMetadata;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
    pub chunks: usize,
}

struct UploadedFile {
    filename: String,
    content_type: Option<String>,
    bytes: Bytes,
}

fn multipart_error(err: MultipartError, limit: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge { limit }
    } else {
        ApiError::Validation(err.body_text())
    }
}

async fn read_file_field(
    multipart: &mut Multipart,
    limit: usize,
) -> Result<Option<UploadedFile>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        if bytes.len() > limit {
            return Err(ApiError::PayloadTooLarge { limit });
        }
        return Ok(Some(UploadedFile {
            filename,
            content_type,
            bytes,
        }));
    }
    Ok(None)
}

pub async fn upload_handler(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let limit = state.limits.max_upload_bytes;

    // Reject declared oversize bodies before reading anything
    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.map_or(false, |len| len > limit + super::http_server::MULTIPART_OVERHEAD) {
        return Err(ApiError::PayloadTooLarge { limit });
    }

    let file = read_file_field(&mut multipart, limit)
        .await?
        .ok_or_else(|| ApiError::Validation("No file provided".to_string()))?;

    if !state
        .extractor
        .accepts(&file.filename, file.content_type.as_deref(), &file.bytes)
    {
        return Err(ExtractError::Unsupported.into());
    }

    let extractor = state.extractor.clone();
    let bytes = file.bytes;
    let text = tokio::task::spawn_blocking(move || extractor.extract(&bytes))
        .await
        .map_err(|e| {
            error!("PDF extraction task failed: {}", e);
            ApiError::Internal
        })??;

    let metadata = ChunkMetadata::new(&file.filename, &identity.email, &Utc::now().to_rfc3339());
    let report = state.services.ingestion.ingest(&text, metadata).await?;

    info!(
        "User {} uploaded {} ({} chunks)",
        identity.user_id, file.filename, report.chunk_count
    );
    Ok(Json(UploadResponse {
        message: "Document processed successfully".to_string(),
        filename: file.filename,
        chunks: report.chunk_count,
    }))
}
