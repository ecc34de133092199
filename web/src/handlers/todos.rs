//! Todo resource handlers.
//!
//! Each handler validates its input before touching the repository, so a
//! rejected write persists nothing. Handlers are stateless; every request is
//! independent.

use crate::error::AppError;
use crate::extractors::{JsonBody, RequestId, TodoIdPath};
use crate::state::AppState;
use crate::WebResult;
use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Instant;
use todolist_core::repository::TodoRepository;
use todolist_core::todo::{Todo, TodoText, TodoUpdate, ValidationError};
use todolist_runtime::metrics::HttpMetrics;

/// Body of `POST /api/todos`.
#[derive(Debug, Default, Deserialize)]
pub struct CreateTodoRequest {
    /// Raw text; anything other than a non-blank string is rejected
    #[serde(default)]
    pub text: Option<Value>,
}

/// Body of `PUT /api/todos/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTodoRequest {
    /// Raw text, validated like on create
    #[serde(default)]
    pub text: Option<Value>,
    /// New completion flag; absent or null means `false`
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Body of `PATCH /api/todos/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct PatchTodoRequest {
    /// Required completion flag
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Text from a loosely-typed JSON field: non-strings count as missing.
fn parse_text(raw: Option<&Value>) -> Result<TodoText, ValidationError> {
    TodoText::parse_optional(raw.and_then(Value::as_str))
}

/// Record the request in metrics and pass the result through.
fn observe<T>(operation: &'static str, started: Instant, result: WebResult<T>) -> WebResult<T> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(error) => error.outcome(),
    };
    HttpMetrics::record_request(operation, outcome, started.elapsed());
    result
}

/// `GET /api/todos`: every todo, newest first.
///
/// # Errors
///
/// 500 `Failed to fetch todos` if the repository fails.
pub async fn list_todos<R>(State(state): State<AppState<R>>) -> WebResult<Json<Vec<Todo>>>
where
    R: TodoRepository + Clone,
{
    let started = Instant::now();

    let result = state
        .repository()
        .list()
        .await
        .map(Json)
        .map_err(|e| AppError::from_repository(e, "Failed to fetch todos"));

    observe("list", started, result)
}

/// `GET /api/todos/:id`.
///
/// # Errors
///
/// - 404 `Todo not found`
/// - 500 `Failed to fetch todo`
pub async fn get_todo<R>(
    State(state): State<AppState<R>>,
    TodoIdPath(id): TodoIdPath,
) -> WebResult<Json<Todo>>
where
    R: TodoRepository + Clone,
{
    let started = Instant::now();

    let result = state
        .repository()
        .get(id)
        .await
        .map(Json)
        .map_err(|e| AppError::from_repository(e, "Failed to fetch todo"));

    observe("get", started, result)
}

/// `POST /api/todos`: create a pending todo.
///
/// # Errors
///
/// - 400 if `text` is missing, not a string, blank, or too long
/// - 500 `Failed to create todo`
pub async fn create_todo<R>(
    State(state): State<AppState<R>>,
    request_id: RequestId,
    JsonBody(body): JsonBody<CreateTodoRequest>,
) -> WebResult<(StatusCode, Json<Todo>)>
where
    R: TodoRepository + Clone,
{
    let started = Instant::now();

    let result = async {
        let text = parse_text(body.text.as_ref())?;

        let todo = state
            .repository()
            .create(text)
            .await
            .map_err(|e| AppError::from_repository(e, "Failed to create todo"))?;

        tracing::info!(request_id = %request_id.0, id = %todo.id, "Todo created");
        Ok::<_, AppError>((StatusCode::CREATED, Json(todo)))
    }
    .await;

    observe("create", started, result)
}

/// `PUT /api/todos/:id`: replace text and completion flag.
///
/// # Errors
///
/// - 400 if `text` is invalid (checked before the id is looked up)
/// - 404 `Todo not found`
/// - 500 `Failed to update todo`
pub async fn update_todo<R>(
    State(state): State<AppState<R>>,
    request_id: RequestId,
    TodoIdPath(id): TodoIdPath,
    JsonBody(body): JsonBody<UpdateTodoRequest>,
) -> WebResult<Json<Todo>>
where
    R: TodoRepository + Clone,
{
    let started = Instant::now();

    let result = async {
        let update = TodoUpdate {
            text: parse_text(body.text.as_ref())?,
            completed: body.completed.unwrap_or(false),
        };

        let todo = state
            .repository()
            .update(id, update)
            .await
            .map_err(|e| AppError::from_repository(e, "Failed to update todo"))?;

        tracing::info!(request_id = %request_id.0, id = %id, "Todo updated");
        Ok::<_, AppError>(Json(todo))
    }
    .await;

    observe("update", started, result)
}

/// `PATCH /api/todos/:id`: set only the completion flag.
///
/// # Errors
///
/// - 400 `Completed status is required` if `completed` is absent or null
/// - 404 `Todo not found`
/// - 500 `Failed to update todo completion status`
pub async fn patch_todo<R>(
    State(state): State<AppState<R>>,
    request_id: RequestId,
    TodoIdPath(id): TodoIdPath,
    JsonBody(body): JsonBody<PatchTodoRequest>,
) -> WebResult<Json<Todo>>
where
    R: TodoRepository + Clone,
{
    let started = Instant::now();

    let result = async {
        let completed = body.completed.ok_or(ValidationError::MissingCompleted)?;

        let todo = state
            .repository()
            .set_completed(id, completed)
            .await
            .map_err(|e| {
                AppError::from_repository(e, "Failed to update todo completion status")
            })?;

        tracing::info!(request_id = %request_id.0, id = %id, completed, "Todo completion set");
        Ok::<_, AppError>(Json(todo))
    }
    .await;

    observe("patch", started, result)
}

/// `DELETE /api/todos/:id`.
///
/// # Errors
///
/// - 404 `Todo not found`
/// - 500 `Failed to delete todo`
pub async fn delete_todo<R>(
    State(state): State<AppState<R>>,
    request_id: RequestId,
    TodoIdPath(id): TodoIdPath,
) -> WebResult<StatusCode>
where
    R: TodoRepository + Clone,
{
    let started = Instant::now();

    let result = state
        .repository()
        .delete(id)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(|e| AppError::from_repository(e, "Failed to delete todo"));

    if result.is_ok() {
        tracing::info!(request_id = %request_id.0, id = %id, "Todo deleted");
    }

    observe("delete", started, result)
}
