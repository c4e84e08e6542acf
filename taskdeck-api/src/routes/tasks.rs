/// Task endpoints
///
/// Owner-scoped CRUD over the task collection. The session guard runs in
/// front of every handler here, so each one receives the authenticated user
/// as a `CurrentUser` extension; the owner written to and filtered by the
/// database always comes from that extension, never from the request body.
///
/// # Endpoints
///
/// - `GET    /api/tasks` - List own tasks, newest first
/// - `POST   /api/tasks` - Create a task
/// - `GET    /api/tasks/:id` - Fetch an owned task
/// - `PUT    /api/tasks/:id` - Partially update an owned task
/// - `DELETE /api/tasks/:id` - Delete an owned task
///
/// A task that exists but belongs to someone else answers the same 404 as
/// one that does not exist, and a path id that cannot be a task id at all
/// answers the same 404 again.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskdeck_shared::auth::middleware::CurrentUser;
use taskdeck_shared::models::task::{CreateTask, Task, TaskPriority, UpdateTask};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Create task request
///
/// There is deliberately no owner field: anything like `createdBy` in the
/// body is dropped during deserialization.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Task title; required, at most 100 characters after trimming
    #[serde(default)]
    #[validate(custom(function = "validate_title"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Completion flag (defaults to false)
    #[serde(default)]
    pub completed: bool,

    /// Optional due date, RFC 3339
    #[validate(custom(function = "validate_due_date"))]
    pub due_date: Option<String>,

    /// Priority: "High", "Medium" or "Low" (defaults to "Medium")
    #[validate(custom(function = "validate_priority"))]
    pub priority: Option<String>,

    /// Tag list (defaults to empty)
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Update task request
///
/// Every field is optional; only present fields are validated and applied.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(custom(function = "validate_title"))]
    pub title: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New completion flag
    pub completed: Option<bool>,

    /// New due date, RFC 3339
    #[validate(custom(function = "validate_due_date"))]
    pub due_date: Option<String>,

    /// New priority
    #[validate(custom(function = "validate_priority"))]
    pub priority: Option<String>,

    /// New tag list (replaces the previous list)
    pub tags: Option<Vec<String>>,
}

/// Delete confirmation response
#[derive(Debug, Serialize)]
pub struct DeleteTaskResponse {
    /// Confirmation message
    pub message: String,
}

fn field_error(code: &'static str, message: &str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.to_string().into());
    err
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(field_error("required", "title is required"));
    }
    if trimmed.chars().count() > 100 {
        return Err(field_error(
            "length",
            "title must be at most 100 characters",
        ));
    }
    Ok(())
}

fn validate_due_date(value: &str) -> Result<(), ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|_| field_error("format", "dueDate must be a valid RFC 3339 timestamp"))
}

fn validate_priority(value: &str) -> Result<(), ValidationError> {
    TaskPriority::parse(value)
        .map(|_| ())
        .ok_or_else(|| field_error("enum", "priority must be one of High, Medium, Low"))
}

/// Parses a validated RFC 3339 string into a timestamp
fn parse_due_date(value: Option<&str>) -> Option<DateTime<Utc>> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parses a path segment as a task id
///
/// A segment that cannot be a UUID answers the same 404 as a missing task,
/// so callers cannot tell bad syntax from a record they do not own.
fn parse_task_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::NotFound("Task not found".to_string()))
}

/// List tasks endpoint handler
///
/// Returns every task owned by the authenticated user, newest first.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<Task>>> {
    let tasks = Task::list_by_owner(&state.db, user.id).await?;
    Ok(Json(tasks))
}

/// Create task endpoint handler
///
/// Validates the body, then persists a task owned by the authenticated
/// user. On validation failure nothing is written and the response carries
/// one entry per failing field.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    req.validate()?;

    let task = Task::create(
        &state.db,
        user.id,
        CreateTask {
            title: req.title.trim().to_string(),
            description: req.description,
            completed: req.completed,
            due_date: parse_due_date(req.due_date.as_deref()),
            priority: req
                .priority
                .as_deref()
                .and_then(TaskPriority::parse)
                .unwrap_or_default(),
            tags: req.tags,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Get task endpoint handler
pub async fn get_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let task_id = parse_task_id(&id)?;

    let task = Task::find_by_id_and_owner(&state.db, task_id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Update task endpoint handler
///
/// Validates only the fields present, then applies a partial merge. An
/// empty body is a valid no-op update and returns the unchanged record.
pub async fn update_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    let task_id = parse_task_id(&id)?;

    req.validate()?;

    let task = Task::update(
        &state.db,
        task_id,
        user.id,
        UpdateTask {
            title: req.title.map(|t| t.trim().to_string()),
            description: req.description,
            completed: req.completed,
            due_date: parse_due_date(req.due_date.as_deref()),
            priority: req.priority.as_deref().and_then(TaskPriority::parse),
            tags: req.tags,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(task))
}

/// Delete task endpoint handler
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteTaskResponse>> {
    let task_id = parse_task_id(&id)?;

    let deleted = Task::delete(&state.db, task_id, user.id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    Ok(Json(DeleteTaskResponse {
        message: "Task deleted".to_string(),
    }))
}
