// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! JSON HTTP surface

pub mod auth;
pub mod chat;
pub mod documents;
pub mod errors;
pub mod health;
pub mod http_server;
pub mod middleware;
pub mod upload;

pub use errors::{ApiError, ErrorResponse};
pub use http_server::{create_app, start_server, AppState, RequestLimits};
pub use middleware::AuthenticatedUser;
