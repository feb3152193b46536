//! Request handlers.

use super::AppState;
use crate::ai::flows;
use crate::config::API_KEY_ENV;
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::types::{Filter, PrioritiseResult, Stats, SubtaskSuggestion, Task};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SuggestRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PrioritiseRequest {
    #[serde(default)]
    pub todos: Option<Vec<String>>,
}

/// Body of `POST /api/todos` and `PATCH /api/todos/{id}`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TitleRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub filter: Option<Filter>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TodoListResponse {
    pub filter: Filter,
    pub todos: Vec<Task>,
    pub stats: Stats,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    ai_enabled: bool,
}

/// `POST /api/ai/suggest`
pub async fn ai_suggest(
    State(state): State<AppState>,
    payload: Result<Json<SuggestRequest>, JsonRejection>,
) -> ApiResult<Json<SubtaskSuggestion>> {
    let generator = state
        .generator()
        .cloned()
        .ok_or_else(|| ApiError::configuration_missing(API_KEY_ENV))?;

    let Json(request) = payload.map_err(|e| ApiError::invalid_body(e.body_text()))?;
    let title = request
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::missing_field("title"))?;

    flows::suggest_subtasks(generator.as_ref(), title)
        .await
        .map(Json)
        .map_err(|e| ApiError::upstream(&e))
}

/// `POST /api/ai/prioritise`
pub async fn ai_prioritise(
    State(state): State<AppState>,
    payload: Result<Json<PrioritiseRequest>, JsonRejection>,
) -> ApiResult<Json<PrioritiseResult>> {
    let generator = state
        .generator()
        .cloned()
        .ok_or_else(|| ApiError::configuration_missing(API_KEY_ENV))?;

    let Json(request) = payload.map_err(|e| ApiError::invalid_body(e.body_text()))?;
    let todos = request
        .todos
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            ApiError::new(
                ErrorCode::MissingRequiredField,
                "todos array is required and must not be empty",
            )
            .with_field("todos")
        })?;

    flows::prioritise_todos(generator.as_ref(), &todos)
        .await
        .map(Json)
        .map_err(|e| ApiError::upstream(&e))
}

/// `GET /api/todos?filter=all|active|completed`
pub async fn list_todos(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<TodoListResponse>> {
    let filter = query.filter.unwrap_or_default();
    let store = state.store()?;
    Ok(Json(TodoListResponse {
        filter,
        todos: filter.apply(&store.get_all()),
        stats: store.get_stats(),
    }))
}

/// `POST /api/todos`
pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<TitleRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload.map_err(|e| ApiError::invalid_body(e.body_text()))?;
    let title = request.title.ok_or_else(|| ApiError::missing_field("title"))?;
    let task = state.store()?.add(&title)?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// `GET /api/todos/stats`
pub async fn todo_stats(State(state): State<AppState>) -> ApiResult<Json<Stats>> {
    Ok(Json(state.store()?.get_stats()))
}

/// `POST /api/todos/{id}/toggle`
pub async fn toggle_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.store()?.toggle(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `PATCH /api/todos/{id}`
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<TitleRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(request) = payload.map_err(|e| ApiError::invalid_body(e.body_text()))?;
    let title = request.title.ok_or_else(|| ApiError::missing_field("title"))?;
    state.store()?.update(id, &title)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/todos/{id}`
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    state.store()?.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/todos/clear-completed`
pub async fn clear_completed(State(state): State<AppState>) -> ApiResult<StatusCode> {
    state.store()?.clear_completed()?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/health`
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        ai_enabled: state.ai_enabled(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "healthy",
            version: "0.1.0",
            ai_enabled: false,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["ai_enabled"], false);
    }

    #[test]
    fn test_requests_tolerate_missing_fields() {
        let req: SuggestRequest = serde_json::from_str("{}").unwrap();
        assert!(req.title.is_none());
        let req: PrioritiseRequest = serde_json::from_str("{}").unwrap();
        assert!(req.todos.is_none());
    }
}
