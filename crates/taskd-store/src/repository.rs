//! SQL data access layer for tasks.
//!
//! All methods take a `&Connection` and are stateless: they translate
//! between Rust types and SQL and nothing else. Lookups return `Option` so
//! callers decide what a missing row means.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::errors::{Result, StoreError};
use crate::types::{NewTask, Task, TaskUpdate};

const SELECT_TASK: &str =
    "SELECT id, title, description, completed, created_at FROM tasks WHERE id = ?1";

/// Raw column values, before timestamp decoding.
struct TaskRow {
    id: i64,
    title: String,
    description: String,
    completed: bool,
    created_at: String,
}

impl TaskRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            completed: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    fn into_task(self) -> Result<Task> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| StoreError::CorruptRow {
                column: "created_at",
                detail: e.to_string(),
            })?
            .with_timezone(&Utc);
        Ok(Task {
            id: self.id,
            title: self.title,
            description: self.description,
            completed: self.completed,
            created_at,
        })
    }
}

/// Get current UTC timestamp as RFC 3339 with microseconds.
fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Task repository for SQL CRUD operations.
pub struct TaskRepository;

impl TaskRepository {
    /// Insert a task and return the persisted row.
    pub fn create(conn: &Connection, new: &NewTask) -> Result<Task> {
        let _ = conn.execute(
            "INSERT INTO tasks (title, description, completed, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![new.title, new.description, new.completed, now_rfc3339()],
        )?;
        let id = conn.last_insert_rowid();

        Self::get(conn, id)?.ok_or(StoreError::NotFound(id))
    }

    /// Get a task by id.
    pub fn get(conn: &Connection, id: i64) -> Result<Option<Task>> {
        conn.query_row(SELECT_TASK, params![id], TaskRow::from_row)
            .optional()?
            .map(TaskRow::into_task)
            .transpose()
    }

    /// Overwrite title, description, and completed. Returns the updated
    /// task, or `None` if not found.
    pub fn update(conn: &Connection, id: i64, update: &TaskUpdate) -> Result<Option<Task>> {
        let changed = conn.execute(
            "UPDATE tasks SET title = ?1, description = ?2, completed = ?3 WHERE id = ?4",
            params![update.title, update.description, update.completed, id],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        Self::get(conn, id)
    }

    /// Delete a task. Returns `false` if no row had that id.
    pub fn delete(conn: &Connection, id: i64) -> Result<bool> {
        let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }
}
