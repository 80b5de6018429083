// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use rusqlite::Connection;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use super::UserStoreError;

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub max_connections: usize,
    pub acquire_timeout: Duration,
    pub busy_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 20,
            acquire_timeout: Duration::from_secs(2),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStats {
    pub max_connections: usize,
    pub idle_connections: usize,
    pub active_connections: usize,
}

/// Bounded pool of SQLite connections.
///
/// At most `max_connections` are checked out at once; `acquire` waits up to
/// `acquire_timeout` for one to come back and then fails.
#[derive(Clone)]
pub struct ConnectionPool {
    path: PathBuf,
    config: PoolConfig,
    idle: Arc<Mutex<Vec<Connection>>>,
    permits: Arc<Semaphore>,
}

/// A checked-out connection, returned to the pool on drop
pub struct PooledConnection {
    conn: Option<Connection>,
    idle: Arc<Mutex<Vec<Connection>>>,
    _permit: OwnedSemaphorePermit,
}

impl ConnectionPool {
    pub fn new(path: impl Into<PathBuf>, config: PoolConfig) -> Self {
        let max = config.max_connections.max(1);
        Self {
            path: path.into(),
            permits: Arc::new(Semaphore::new(max)),
            idle: Arc::new(Mutex::new(Vec::with_capacity(max))),
            config,
        }
    }

    pub fn stats(&self) -> ConnectionStats {
        let max = self.config.max_connections.max(1);
        let idle = self.idle.lock().map(|idle| idle.len()).unwrap_or(0);
        ConnectionStats {
            max_connections: max,
            idle_connections: idle,
            active_connections: max - self.permits.available_permits(),
        }
    }

    pub async fn acquire(&self) -> Result<PooledConnection, UserStoreError> {
        let timeout_ms = self.config.acquire_timeout.as_millis() as u64;
        let permit = tokio::time::timeout(
            self.config.acquire_timeout,
            self.permits.clone().acquire_owned(),
        )
        .await
        .map_err(|_| UserStoreError::PoolTimeout(timeout_ms))?
        .map_err(|_| UserStoreError::Task("connection pool closed".to_string()))?;

        let reused = self.idle.lock().ok().and_then(|mut idle| idle.pop());
        let conn = match reused {
            Some(conn) => conn,
            None => {
                debug!("Opening new SQLite connection to {}", self.path.display());
                self.open()?
            }
        };

        Ok(PooledConnection {
            conn: Some(conn),
            idle: self.idle.clone(),
            _permit: permit,
        })
    }

    /// Run blocking work against a pooled connection off the async runtime
    pub async fn run<F, T>(&self, work: F) -> Result<T, UserStoreError>
    where
        F: FnOnce(&Connection) -> Result<T, UserStoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.acquire().await?;
        tokio::task::spawn_blocking(move || work(&conn))
            .await
            .map_err(|e| UserStoreError::Task(e.to_string()))?
    }

    fn open(&self) -> Result<Connection, UserStoreError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.config.busy_timeout)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        Ok(conn)
    }
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // Only taken in Drop
        self.conn.as_ref().expect("pooled connection already released")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if let Ok(mut idle) = self.idle.lock() {
                idle.push(conn);
            }
        }
    }
}
