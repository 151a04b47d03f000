//! DDL for the task database.
//!
//! Applied with `IF NOT EXISTS` on every new pooled connection, so the table
//! is present before the first request without a migration step.

/// Single-table schema. `AUTOINCREMENT` keeps ids from being reused after the
/// highest row is deleted.
pub const CREATE_TABLES: &str = r"
CREATE TABLE IF NOT EXISTS tasks (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    title       TEXT    NOT NULL,
    description TEXT    NOT NULL,
    completed   INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_tasks_title ON tasks(title);
";

/// Connection pragmas. `busy_timeout` lets concurrent writers wait on the
/// `SQLite` lock instead of failing immediately.
pub fn pragmas(busy_timeout_ms: u32) -> String {
    format!(
        "PRAGMA journal_mode = WAL;\
         PRAGMA busy_timeout = {busy_timeout_ms};\
         PRAGMA synchronous = NORMAL;"
    )
}
