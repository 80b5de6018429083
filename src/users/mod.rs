// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! User records
//!
//! The auth layer only ever talks to [`UserRepository`]; the SQLite
//! implementation behind it is injected at startup.

pub mod pool;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::auth::Role;

pub use pool::{ConnectionPool, PoolConfig, PooledConnection};
pub use sqlite::SqliteUserRepository;

/// Stored user. The password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub company: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub role: Role,
    pub company: String,
    pub password_hash: String,
}

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("User with email {0} already exists")]
    DuplicateEmail(String),

    #[error("Timed out after {0}ms waiting for a database connection")]
    PoolTimeout(u64),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database task failed: {0}")]
    Task(String),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserStoreError>;

    /// Insert a user; fails with `DuplicateEmail` when the email is taken
    async fn create(&self, user: NewUser) -> Result<User, UserStoreError>;
}
