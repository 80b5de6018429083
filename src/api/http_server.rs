// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::errors::ApiError;
use super::middleware::gate_middleware;
use super::{auth, chat, documents, health, upload};
use crate::auth::{AuthGate, PasswordHasher, TokenCodec};
use crate::config::AppConfig;
use crate::rag::{PdfTextExtractor, RagServices, TextExtractor};
use crate::users::{PoolConfig, SqliteUserRepository, UserRepository};
use crate::version;

/// Room for multipart framing around the file part
pub(crate) const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Debug, Clone, Copy)]
pub struct RequestLimits {
    pub max_upload_bytes: usize,
    pub top_k: usize,
    pub max_top_k: usize,
}

impl RequestLimits {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_upload_bytes: config.server.max_upload_bytes,
            top_k: config.rag.top_k,
            max_top_k: config.rag.max_top_k,
        }
    }

    /// Requested result count, defaulted and clamped to `1..=max_top_k`
    pub fn clamp_k(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.top_k)
            .clamp(1, self.max_top_k.max(1))
    }
}

#[derive(Clone)]
pub struct AppState {
    pub gate: Arc<AuthGate>,
    pub users: Arc<dyn UserRepository>,
    pub passwords: PasswordHasher,
    pub services: RagServices,
    pub extractor: Arc<dyn TextExtractor>,
    pub limits: RequestLimits,
}

impl AppState {
    pub fn new(
        codec: TokenCodec,
        users: Arc<dyn UserRepository>,
        passwords: PasswordHasher,
        services: RagServices,
        extractor: Arc<dyn TextExtractor>,
        limits: RequestLimits,
    ) -> Self {
        Self {
            gate: Arc::new(AuthGate::new(codec, users.clone())),
            users,
            passwords,
            services,
            extractor,
            limits,
        }
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let pool = PoolConfig {
            max_connections: config.database.max_connections,
            acquire_timeout: config.database.acquire_timeout,
            ..PoolConfig::default()
        };
        let users = SqliteUserRepository::open(&config.database.path, pool)
            .await
            .with_context(|| format!("Failed to open user store at {}", config.database.path))?;

        Ok(Self::new(
            TokenCodec::new(config.auth.jwt_secret.as_bytes(), config.auth.token_ttl),
            Arc::new(users),
            PasswordHasher::new(config.auth.password_iterations),
            RagServices::from_config(config)?,
            Arc::new(PdfTextExtractor),
            RequestLimits::from_config(config),
        ))
    }
}

pub fn create_app(state: AppState) -> Router {
    let upload_limit = state.limits.max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/", get(root_handler))
        // Health check
        .route("/health", get(health::health_handler))
        // Credentials
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        // Question answering
        .route("/chat", post(chat::chat_handler))
        // Document management
        .route(
            "/upload",
            post(upload::upload_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/documents", get(documents::documents_handler))
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(state.clone(), gate_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(state: AppState, bind_addr: &str) -> Result<()> {
    let addr = bind_addr
        .parse::<SocketAddr>()
        .with_context(|| format!("Invalid bind address {}", bind_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("API server listening on {}", addr);

    axum::serve(listener, create_app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}

async fn root_handler() -> impl IntoResponse {
    Json(json!({
        "service": "support-rag-node",
        "build": version::get_version_info(),
    }))
}

async fn not_found_handler() -> ApiError {
    ApiError::NotFound
}
