// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Route gate middleware and the authenticated-caller extractor

use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::{debug, error};

use super::errors::ApiError;
use super::http_server::AppState;
use crate::auth::{GateDecision, Identity};

/// Resolve the caller and apply the routing decision for the request path.
///
/// On pass the resolved [`Identity`] is stored in the request extensions.
pub async fn gate_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let identity = match state.gate.resolve(request.headers()).await {
        Ok(identity) => identity,
        Err(e) => {
            error!("Cannot resolve caller for {}: {}", path, e);
            return ApiError::Internal.into_response();
        }
    };

    match state.gate.decide(&path, identity) {
        GateDecision::Pass(identity) => {
            if let Some(identity) = identity {
                request.extensions_mut().insert(identity);
            }
            next.run(request).await
        }
        GateDecision::Redirect(location) => {
            debug!("Redirecting {} to {}", path, location);
            Redirect::temporary(&location).into_response()
        }
        GateDecision::Unauthorized => ApiError::authentication_required().into_response(),
    }
}

/// The caller resolved by [`gate_middleware`]
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or_else(ApiError::authentication_required)
    }
}
