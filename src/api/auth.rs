// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Registration and login

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::errors::ApiError;
use super::http_server::AppState;
use crate::auth::{Identity, Role, TOKEN_COOKIE};
use crate::users::{NewUser, User};

const DEFAULT_COMPANY: &str = "N/A";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub company: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".to_string())
}

/// Issue a token for `user` and mirror it into the `token` cookie
fn issue_session(
    state: &AppState,
    jar: CookieJar,
    user: User,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let identity = Identity {
        user_id: user.id,
        email: user.email.clone(),
        role: user.role,
    };
    let token = state.gate.codec().issue(&identity).map_err(|e| {
        error!("Failed to sign token: {}", e);
        ApiError::Internal
    })?;

    let cookie = Cookie::build((TOKEN_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    Ok((jar.add(cookie), Json(AuthResponse { token, user })))
}

pub async fn register_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let name = request.name.trim().to_string();
    let email = normalize_email(&request.email);
    if name.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(ApiError::Validation(
            "Name, email, and password are required".to_string(),
        ));
    }
    let role = match request.role.as_deref().map(str::trim) {
        None | Some("") => Role::default(),
        Some(role) => role.parse::<Role>().map_err(ApiError::Validation)?,
    };
    let company = request
        .company
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_COMPANY.to_string());

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict(
            "User with this email already exists".to_string(),
        ));
    }

    let hasher = state.passwords;
    let password = request.password;
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .map_err(|e| {
            error!("Password hashing task failed: {}", e);
            ApiError::Internal
        })?;

    // The unique index still guards against a concurrent registration
    let user = state
        .users
        .create(NewUser {
            email,
            name,
            role,
            company,
            password_hash,
        })
        .await?;
    info!("Registered user {} ({})", user.id, user.role);

    issue_session(&state, jar, user)
}

pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::Validation(e.body_text()))?;

    let email = normalize_email(&request.email);
    if email.is_empty() || request.password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let hasher = state.passwords;
    let password = request.password;
    let encoded = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || hasher.verify(&password, &encoded))
        .await
        .map_err(|e| {
            error!("Password verification task failed: {}", e);
            ApiError::Internal
        })?;
    if !valid {
        return Err(invalid_credentials());
    }

    info!("User {} logged in", user.id);
    issue_session(&state, jar, user)
}
