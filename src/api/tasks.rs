//! Task API endpoints.
//!
//! Each handler runs the same pipeline: parse → validate → business checks → execute
//! → respond. Any stage can short-circuit with an [`ApiError`]. There is no storage
//! behind these handlers; "execute" fabricates the task a store would have returned.
//!
//! - `GET /tasks` - List tasks
//! - `POST /tasks` - Create task
//! - `GET /tasks/:id` - Get task
//! - `PUT /tasks/:id` - Update task
//! - `DELETE /tasks/:id` - Delete task
//!
//! The collection also answers on `/tasks/`.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use super::error::ApiResult;
use super::extract::{JsonBody, TaskId};
use super::routes::AppState;
use super::types::{
    CreateTaskRequest, DeletedTask, Priority, SuccessResponse, TaskListResponse, TaskResponse,
    UpdateTaskRequest,
};
use crate::error::AppError;
use crate::validation::validate_request;

/// Identifier that simulates a task missing from the store.
pub const MISSING_TASK_ID: Uuid = Uuid::nil();

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_LIMIT: u32 = 10;

/// Create task routes, to be merged into the versioned API router.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/", get(list_tasks).post(create_task))
        .route("/tasks/:id", get(get_task).put(update_task).delete(delete_task))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/tasks - List tasks.
async fn list_tasks() -> Json<TaskListResponse> {
    let tasks = sample_tasks();
    Json(TaskListResponse {
        total: tasks.len(),
        tasks,
        page: DEFAULT_PAGE,
        limit: DEFAULT_LIMIT,
    })
}

/// GET /api/v1/tasks/:id - Get a single task.
async fn get_task(TaskId(id): TaskId) -> ApiResult<Json<SuccessResponse<TaskResponse>>> {
    ensure_exists(id)?;

    let now = Utc::now();
    let task = TaskResponse {
        id: id.to_string(),
        title: "Individual Task".to_string(),
        description: "Retrieved by ID".to_string(),
        priority: Priority::Medium,
        completed: false,
        due_date: None,
        created_at: now - Duration::hours(2),
        updated_at: now - Duration::hours(1),
    };

    Ok(Json(SuccessResponse::new("Task retrieved successfully", task)))
}

/// POST /api/v1/tasks - Create a task.
async fn create_task(
    JsonBody(req): JsonBody<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<TaskResponse>>)> {
    validate_request(&req)?;

    let priority = parse_priority(&req.priority)?.unwrap_or_default();
    let now = Utc::now();
    let task = TaskResponse {
        id: Uuid::new_v4().to_string(),
        title: req.title,
        description: req.description,
        priority,
        completed: false,
        due_date: Some(req.due_date).filter(|d| !d.is_empty()),
        created_at: now,
        updated_at: now,
    };

    tracing::info!(task_id = %task.id, priority = %task.priority, "Task created");

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new("Task created successfully", task)),
    ))
}

/// PUT /api/v1/tasks/:id - Update a task.
async fn update_task(
    TaskId(id): TaskId,
    JsonBody(req): JsonBody<UpdateTaskRequest>,
) -> ApiResult<Json<SuccessResponse<TaskResponse>>> {
    validate_request(&req)?;

    if req.is_empty() {
        return Err(AppError::invalid_input()
            .with_detail("update", "At least one field must be provided to update")
            .into());
    }

    ensure_exists(id)?;

    let now = Utc::now();
    let mut task = TaskResponse {
        id: id.to_string(),
        title: "Updated Task".to_string(),
        description: "Task has been updated".to_string(),
        priority: Priority::High,
        completed: true,
        due_date: None,
        created_at: now - Duration::hours(24),
        updated_at: now,
    };

    if let Some(priority) = parse_priority(req.priority.as_deref().unwrap_or_default())? {
        task.priority = priority;
    }
    if let Some(title) = req.title {
        task.title = title;
    }
    if let Some(description) = req.description {
        task.description = description;
    }
    if let Some(due_date) = req.due_date {
        task.due_date = Some(due_date);
    }
    if let Some(completed) = req.completed {
        task.completed = completed;
    }

    tracing::info!(task_id = %task.id, "Task updated");

    Ok(Json(SuccessResponse::new("Task updated successfully", task)))
}

/// DELETE /api/v1/tasks/:id - Delete a task.
async fn delete_task(TaskId(id): TaskId) -> ApiResult<Json<SuccessResponse<DeletedTask>>> {
    ensure_exists(id)?;

    tracing::info!(task_id = %id, "Task deleted");

    Ok(Json(SuccessResponse::new(
        "Task deleted successfully",
        DeletedTask {
            deleted_id: id.to_string(),
        },
    )))
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn ensure_exists(id: Uuid) -> Result<(), AppError> {
    if id == MISSING_TASK_ID {
        return Err(AppError::task_not_found());
    }
    Ok(())
}

/// Parse an already-validated priority. Empty means "not given".
fn parse_priority(raw: &str) -> Result<Option<Priority>, AppError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|e: String| AppError::internal().with_source(anyhow::anyhow!(e)))
}

fn sample_tasks() -> Vec<TaskResponse> {
    let now = Utc::now();
    vec![
        TaskResponse {
            id: "3f1b6c2e-5a4d-4e8f-9b0a-1c2d3e4f5a61".to_string(),
            title: "Learn Rust".to_string(),
            description: "Study ownership and borrowing".to_string(),
            priority: Priority::High,
            completed: false,
            due_date: None,
            created_at: now - Duration::hours(24),
            updated_at: now - Duration::hours(24),
        },
        TaskResponse {
            id: "8a7e2d4c-0b9f-4c6a-8e1d-2f3a4b5c6d72".to_string(),
            title: "Build API".to_string(),
            description: "Create a REST API with axum".to_string(),
            priority: Priority::Medium,
            completed: true,
            due_date: None,
            created_at: now - Duration::hours(12),
            updated_at: now - Duration::hours(6),
        },
    ]
}
