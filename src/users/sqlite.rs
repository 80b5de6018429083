// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::path::Path;
use tracing::info;

use super::{ConnectionPool, NewUser, PoolConfig, User, UserRepository, UserStoreError};
use crate::auth::Role;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    name TEXT NOT NULL,
    role TEXT NOT NULL DEFAULT 'user',
    company TEXT NOT NULL DEFAULT 'N/A',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

const SELECT_COLUMNS: &str =
    "SELECT id, email, password, name, role, company, created_at, updated_at FROM users";

/// User records in SQLite, accessed through a bounded connection pool
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: ConnectionPool,
}

impl SqliteUserRepository {
    /// Open (creating if needed) the database at `path` and apply the schema
    pub async fn open(path: impl AsRef<Path>, config: PoolConfig) -> Result<Self, UserStoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| UserStoreError::Task(format!("create {}: {}", parent.display(), e)))?;
        }

        let repo = Self {
            pool: ConnectionPool::new(path, config),
        };
        repo.pool
            .run(|conn| {
                conn.execute_batch(SCHEMA)?;
                Ok(())
            })
            .await?;

        info!("User store ready at {}", path.display());
        Ok(repo)
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }
}

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let role: String = row.get(4)?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
        // Unknown roles in the table degrade to the least privileged one
        role: role.parse().unwrap_or(Role::User),
        company: row.get(5)?,
        created_at: row.get::<_, DateTime<Utc>>(6)?,
        updated_at: row.get::<_, DateTime<Utc>>(7)?,
    })
}

fn find_one(
    conn: &Connection,
    clause: &str,
    param: &dyn rusqlite::ToSql,
) -> Result<Option<User>, UserStoreError> {
    let sql = format!("{} WHERE {}", SELECT_COLUMNS, clause);
    Ok(conn
        .query_row(&sql, [param], row_to_user)
        .optional()?)
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserStoreError> {
        let email = email.to_string();
        self.pool
            .run(move |conn| find_one(conn, "email = ?1", &email))
            .await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, UserStoreError> {
        self.pool
            .run(move |conn| find_one(conn, "id = ?1", &id))
            .await
    }

    async fn create(&self, user: NewUser) -> Result<User, UserStoreError> {
        self.pool
            .run(move |conn| {
                let now = Utc::now();
                let inserted = conn.execute(
                    "INSERT INTO users (email, password, name, role, company, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
                    params![
                        user.email,
                        user.password_hash,
                        user.name,
                        user.role.as_str(),
                        user.company,
                        now
                    ],
                );

                match inserted {
                    Ok(_) => {}
                    Err(rusqlite::Error::SqliteFailure(err, _))
                        if err.code == ErrorCode::ConstraintViolation =>
                    {
                        return Err(UserStoreError::DuplicateEmail(user.email));
                    }
                    Err(e) => return Err(e.into()),
                }

                let id = conn.last_insert_rowid();
                find_one(conn, "id = ?1", &id)?.ok_or_else(|| {
                    UserStoreError::Task(format!("user {} vanished after insert", id))
                })
            })
            .await
    }
}
