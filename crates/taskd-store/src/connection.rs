//! `SQLite` connection pool with the task schema applied on connect.
//!
//! Uses `r2d2` connection pooling with `r2d2_sqlite` backend. A checked-out
//! [`PooledConnection`] is one request's session: it returns to the pool when
//! dropped, on every exit path.

use std::path::Path;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::info;

use crate::errors::Result;
use crate::schema;

/// Alias for the connection pool type.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Alias for a pooled connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Configuration for the connection pool.
#[derive(Clone, Debug)]
pub struct ConnectionConfig {
    /// Maximum pool size (default: 8).
    pub pool_size: u32,
    /// Busy timeout in milliseconds (default: 5000).
    pub busy_timeout_ms: u32,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            pool_size: 8,
            busy_timeout_ms: 5_000,
        }
    }
}

/// Runs pragmas and schema DDL on each new connection.
#[derive(Debug)]
struct SchemaCustomizer {
    busy_timeout_ms: u32,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for SchemaCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(&schema::pragmas(self.busy_timeout_ms))?;
        conn.execute_batch(schema::CREATE_TABLES)?;
        Ok(())
    }
}

/// Create a file-backed connection pool, creating parent directories as
/// needed.
pub fn new_file(path: &Path, config: &ConnectionConfig) -> Result<ConnectionPool> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let manager = SqliteConnectionManager::file(path);
    let pool = Pool::builder()
        .max_size(config.pool_size)
        .connection_timeout(Duration::from_secs(5))
        .connection_customizer(Box::new(SchemaCustomizer {
            busy_timeout_ms: config.busy_timeout_ms,
        }))
        .build(manager)?;

    info!(path = %path.display(), pool_size = config.pool_size, "task database opened");
    Ok(pool)
}

/// Create an in-memory connection pool (for testing).
///
/// Each `SQLite` in-memory connection is its own database, so the pool holds
/// exactly one connection and never recycles it.
pub fn new_in_memory() -> Result<ConnectionPool> {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder()
        .max_size(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connection_timeout(Duration::from_secs(5))
        .connection_customizer(Box::new(SchemaCustomizer {
            busy_timeout_ms: ConnectionConfig::default().busy_timeout_ms,
        }))
        .build(manager)?;
    Ok(pool)
}
