//! Error types for the task store.

use thiserror::Error;

/// Errors that can occur during task store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error (checkout timeout, pool build failure).
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Filesystem error while preparing the database location.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored row could not be decoded.
    #[error("corrupt row in tasks.{column}: {detail}")]
    CorruptRow {
        /// Column that failed to decode.
        column: &'static str,
        /// Decoder message.
        detail: String,
    },

    /// No task exists with the given id.
    #[error("task not found: {0}")]
    NotFound(i64),

    /// The blocking worker running a store operation failed.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Whether this error means the requested task does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;
