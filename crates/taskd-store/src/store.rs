//! [`TaskStore`]: the storage handle passed into request handlers.
//!
//! Every operation checks out one pooled session, runs the repository call
//! on a blocking thread, and drops the session before returning.

use std::path::Path;

use tracing::{debug, instrument};

use crate::connection::{self, ConnectionConfig, ConnectionPool, PooledConnection};
use crate::errors::{Result, StoreError};
use crate::repository::TaskRepository;
use crate::types::{NewTask, Task, TaskUpdate};

/// Cloneable handle over the connection pool.
#[derive(Clone)]
pub struct TaskStore {
    pool: ConnectionPool,
}

impl TaskStore {
    /// Wrap an existing pool.
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Open (or create) a file-backed store.
    pub fn open(path: &Path, config: &ConnectionConfig) -> Result<Self> {
        Ok(Self::new(connection::new_file(path, config)?))
    }

    /// Open an in-memory store (for testing).
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(connection::new_in_memory()?))
    }

    /// Check out one session. It returns to the pool when dropped.
    pub fn session(&self) -> Result<PooledConnection> {
        Ok(self.pool.get()?)
    }

    /// Run `f` with a fresh session on the blocking thread pool.
    async fn with_session<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&PooledConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let conn = pool.get()?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Internal(format!("store task failed: {e}")))?
    }

    /// Insert a new task.
    #[instrument(skip(self, new), fields(title = %new.title))]
    pub async fn create(&self, new: NewTask) -> Result<Task> {
        self.with_session(move |conn| TaskRepository::create(conn, &new))
            .await
    }

    /// Fetch a task, failing with [`StoreError::NotFound`] if absent.
    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Task> {
        self.with_session(move |conn| {
            TaskRepository::get(conn, id)?.ok_or(StoreError::NotFound(id))
        })
        .await
    }

    /// Replace a task's mutable fields, failing with
    /// [`StoreError::NotFound`] if absent.
    #[instrument(skip(self, update))]
    pub async fn update(&self, id: i64, update: TaskUpdate) -> Result<Task> {
        self.with_session(move |conn| {
            TaskRepository::update(conn, id, &update)?.ok_or(StoreError::NotFound(id))
        })
        .await
    }

    /// Remove a task, failing with [`StoreError::NotFound`] if absent.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.with_session(move |conn| {
            if TaskRepository::delete(conn, id)? {
                Ok(())
            } else {
                Err(StoreError::NotFound(id))
            }
        })
        .await
    }

    /// Verify a session can be checked out and answers a trivial query.
    pub async fn ping(&self) -> Result<()> {
        self.with_session(|conn| {
            let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0))?;
            debug!(one, "store ping");
            Ok(())
        })
        .await
    }

    /// Pool state: `(connections, idle_connections)`.
    pub fn pool_state(&self) -> (u32, u32) {
        let state = self.pool.state();
        (state.connections, state.idle_connections)
    }
}
