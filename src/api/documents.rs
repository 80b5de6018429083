// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::extract::State;
use axum::Json;

use super::errors::ApiError;
use super::http_server::AppState;
use super::middleware::AuthenticatedUser;
use crate::rag::CatalogView;

pub async fn documents_handler(
    State(state): State<AppState>,
    AuthenticatedUser(_identity): AuthenticatedUser,
) -> Result<Json<CatalogView>, ApiError> {
    let view = state.services.catalog.list().await?;
    Ok(Json(view))
}
