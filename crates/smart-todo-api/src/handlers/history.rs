//! Read-only task history, scoped to the caller's tasks.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use smart_todo_core::{TaskHistory, TaskHistoryRepository};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::handlers::parse_uuid_filter;
use crate::response::{page, ListResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HistoryQuery {
    /// Only entries for this task id
    pub task: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[utoipa::path(
    get, path = "/api/tasks/history", tag = "History",
    params(HistoryQuery),
    responses((status = 200, description = "Paginated history, newest first"))
)]
pub async fn list_history(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (limit, offset) = page(query.limit, query.offset);
    let task_id = parse_uuid_filter(query.task.as_deref(), "task")?;
    let (entries, total) = state
        .db
        .history
        .list(auth.user.id, task_id, limit, offset)
        .await?;
    Ok(Json(ListResponse::new(entries, total, limit, offset)))
}

#[utoipa::path(
    get, path = "/api/tasks/history/{id}", tag = "History",
    params(("id" = Uuid, Path, description = "History entry id")),
    responses(
        (status = 200, description = "History entry", body = TaskHistory),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_history(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskHistory>, ApiError> {
    state
        .db
        .history
        .get(auth.user.id, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("History entry not found".to_string()))
}
