//! Task route handlers: create, read, update, delete.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use taskd_store::{NewTask, Task, TaskUpdate};
use tracing::{debug, info};

use crate::errors::ApiError;
use crate::server::AppState;

/// Confirmation body for a successful delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Always `"Task deleted successfully"`.
    pub message: &'static str,
}

/// POST /tasks/
pub async fn create_task(
    State(state): State<AppState>,
    Json(new): Json<NewTask>,
) -> Result<Json<Task>, ApiError> {
    let task = state.store.create(new).await?;
    info!(task_id = task.id, "task created");
    Ok(Json(task))
}

/// GET /tasks/{id}
pub async fn read_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    let task = state.store.get(id).await.inspect_err(|e| {
        if e.is_not_found() {
            debug!(task_id = id, "task not found");
        }
    })?;
    Ok(Json(task))
}

/// PUT /tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<TaskUpdate>,
) -> Result<Json<Task>, ApiError> {
    let task = state.store.update(id, update).await.inspect_err(|e| {
        if e.is_not_found() {
            debug!(task_id = id, "update of missing task");
        }
    })?;
    info!(task_id = id, completed = task.completed, "task updated");
    Ok(Json(task))
}

/// DELETE /tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DeleteResponse>, ApiError> {
    state.store.delete(id).await.inspect_err(|e| {
        if e.is_not_found() {
            debug!(task_id = id, "delete of missing task");
        }
    })?;
    info!(task_id = id, "task deleted");
    Ok(Json(DeleteResponse {
        message: "Task deleted successfully",
    }))
}
