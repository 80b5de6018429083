// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request gate: token extraction, subject resolution and routing decisions
//!
//! Paths fall in four classes:
//! - Public: always pass
//! - AuthOnly: login/register pages; authenticated callers are sent home
//! - ProtectedApi: unauthenticated callers get 401
//! - ProtectedPage: unauthenticated callers are sent to the login page

use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::token::{Identity, Role, TokenCodec, TokenError};
use crate::users::{UserRepository, UserStoreError};

pub const TOKEN_COOKIE: &str = "token";
const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingToken,

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    #[error("User {0} no longer exists")]
    UnknownSubject(i64),

    #[error("{required} access required")]
    Forbidden { required: Role },

    #[error("User store unavailable: {0}")]
    Store(#[from] UserStoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathClass {
    Public,
    AuthOnly,
    ProtectedApi,
    ProtectedPage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Continue to the handler, with the subject when one was resolved
    Pass(Option<Identity>),
    Redirect(String),
    Unauthorized,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    pub public: Vec<String>,
    pub auth_only: Vec<String>,
    pub api_prefixes: Vec<String>,
    pub login_path: String,
    pub home_path: String,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self {
            public: ["/", "/health", "/auth/login", "/auth/register"]
                .map(String::from)
                .to_vec(),
            auth_only: ["/login", "/register"].map(String::from).to_vec(),
            api_prefixes: ["/auth/", "/chat", "/upload", "/documents"]
                .map(String::from)
                .to_vec(),
            login_path: "/login".to_string(),
            home_path: "/chat".to_string(),
        }
    }
}

impl RouteTable {
    pub fn classify(&self, path: &str) -> PathClass {
        if self.public.iter().any(|p| p == path) {
            PathClass::Public
        } else if self.auth_only.iter().any(|p| p == path) {
            PathClass::AuthOnly
        } else if self.api_prefixes.iter().any(|prefix| matches_prefix(path, prefix)) {
            PathClass::ProtectedApi
        } else {
            PathClass::ProtectedPage
        }
    }
}

/// `/chat` matches `/chat` and `/chat/...`, not `/chatter`
fn matches_prefix(path: &str, prefix: &str) -> bool {
    if prefix.ends_with('/') {
        return path.starts_with(prefix);
    }
    path == prefix
        || path
            .strip_prefix(prefix)
            .map_or(false, |rest| rest.starts_with('/'))
}

pub struct AuthGate {
    codec: TokenCodec,
    users: Arc<dyn UserRepository>,
    routes: RouteTable,
}

impl AuthGate {
    pub fn new(codec: TokenCodec, users: Arc<dyn UserRepository>) -> Self {
        Self::with_routes(codec, users, RouteTable::default())
    }

    pub fn with_routes(
        codec: TokenCodec,
        users: Arc<dyn UserRepository>,
        routes: RouteTable,
    ) -> Self {
        Self {
            codec,
            users,
            routes,
        }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Bearer header first, then the `token` cookie
    pub fn extract(headers: &HeaderMap) -> Option<String> {
        let bearer = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|t| !t.is_empty());
        if let Some(token) = bearer {
            return Some(token.to_string());
        }

        CookieJar::from_headers(headers)
            .get(TOKEN_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty())
    }

    /// Verify the token and check the subject still exists.
    ///
    /// Deleting a user is the only way to cut a live token short.
    pub async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.codec.verify(token)?;
        match self.users.find_by_id(claims.user_id).await? {
            Some(_) => Ok(claims.identity()),
            None => Err(AuthError::UnknownSubject(claims.user_id)),
        }
    }

    pub fn authorize(identity: &Identity, required: Role) -> Result<(), AuthError> {
        if identity.role.satisfies(required) {
            Ok(())
        } else {
            Err(AuthError::Forbidden { required })
        }
    }

    /// Resolve the caller from request headers.
    ///
    /// Missing or rejected credentials resolve to anonymous; only a user
    /// store failure is an error.
    pub async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Identity>, UserStoreError> {
        let Some(token) = Self::extract(headers) else {
            return Ok(None);
        };
        match self.authenticate(&token).await {
            Ok(identity) => Ok(Some(identity)),
            Err(AuthError::Store(e)) => {
                warn!("User store failed while resolving credentials: {}", e);
                Err(e)
            }
            Err(e) => {
                debug!("Rejected credentials: {}", e);
                Ok(None)
            }
        }
    }

    /// Routing state machine over the path class and resolved subject
    pub fn decide(&self, path: &str, identity: Option<Identity>) -> GateDecision {
        match (self.routes.classify(path), identity) {
            (PathClass::Public, identity) => GateDecision::Pass(identity),
            (PathClass::AuthOnly, Some(_)) => GateDecision::Redirect(self.routes.home_path.clone()),
            (PathClass::AuthOnly, None) => GateDecision::Pass(None),
            (PathClass::ProtectedApi | PathClass::ProtectedPage, Some(identity)) => {
                GateDecision::Pass(Some(identity))
            }
            (PathClass::ProtectedApi, None) => GateDecision::Unauthorized,
            (PathClass::ProtectedPage, None) => {
                GateDecision::Redirect(self.routes.login_path.clone())
            }
        }
    }
}
