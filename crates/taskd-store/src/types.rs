//! Task record and its input shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// System-assigned, never reused.
    pub id: i64,
    /// Short title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Completion flag.
    pub completed: bool,
    /// Insert time, set once.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a task.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTask {
    /// Short title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Defaults to `false`.
    #[serde(default)]
    pub completed: bool,
}

/// Full replacement of a task's mutable fields.
///
/// Any `id` or `created_at` sent alongside is ignored.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TaskUpdate {
    /// New title.
    pub title: String,
    /// New description.
    pub description: String,
    /// New completion flag.
    pub completed: bool,
}
