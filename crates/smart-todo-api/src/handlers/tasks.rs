//! Task endpoints: CRUD, dashboard views, AI analysis, export and import.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use smart_todo_core::defaults::{PAGE_LIMIT_MAX, UPCOMING_DEADLINE_DAYS};
use smart_todo_core::{
    CategoryRepository, CreateTaskRequest, DashboardStats, ListTasksRequest,
    PriorityDistribution, Task, TaskPriority, TaskRepository, TaskStatus, UpdateTaskRequest,
};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::export::{export_response, ExportFormat};
use crate::handlers::{parse_filter, parse_uuid_filter};
use crate::response::{page, ListResponse};
use crate::services::TaskEnricher;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskListQuery {
    /// pending, in_progress, completed or cancelled
    pub status: Option<String>,
    /// low, medium, high or urgent
    pub priority: Option<String>,
    /// Category id
    pub category: Option<String>,
    /// Case-insensitive match on title or description
    pub search: Option<String>,
    /// created_at, deadline, ai_priority_score or priority; prefix `-` for descending
    pub ordering: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskBody {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default, alias = "category")]
    pub category_id: Option<Uuid>,
    #[serde(default, alias = "tags")]
    pub tag_ids: Vec<Uuid>,
    pub deadline: Option<DateTime<Utc>>,
    pub estimated_duration_minutes: Option<i32>,
    /// Enhance the description and suggest a deadline and category.
    #[serde(default)]
    pub enhance_with_ai: bool,
}

impl From<CreateTaskBody> for CreateTaskRequest {
    fn from(body: CreateTaskBody) -> Self {
        CreateTaskRequest {
            title: body.title,
            description: body.description,
            priority: body.priority,
            status: body.status,
            category_id: body.category_id,
            tag_ids: body.tag_ids,
            deadline: body.deadline,
            estimated_duration_minutes: body.estimated_duration_minutes,
            context_used: None,
            ai_insights: None,
        }
    }
}

#[utoipa::path(
    get, path = "/api/tasks/tasks", tag = "Tasks",
    params(TaskListQuery),
    responses((status = 200, description = "Paginated tasks"))
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(query): Query<TaskListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (limit, offset) = page(query.limit, query.offset);
    let req = ListTasksRequest {
        status: parse_filter(query.status.as_deref(), "status")?,
        priority: parse_filter(query.priority.as_deref(), "priority")?,
        category_id: parse_uuid_filter(query.category.as_deref(), "category")?,
        search: query.search.filter(|s| !s.trim().is_empty()),
        ordering: query.ordering,
        limit: Some(limit),
        offset: Some(offset),
    };

    let result = state.db.tasks.list(auth.user.id, req).await?;
    Ok(Json(ListResponse::new(result.tasks, result.total, limit, offset)))
}

#[utoipa::path(
    post, path = "/api/tasks/tasks", tag = "Tasks",
    request_body = CreateTaskBody,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 400, description = "Validation error")
    )
)]
pub async fn create_task(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<CreateTaskBody>,
) -> Result<impl IntoResponse, ApiError> {
    let enhance = body.enhance_with_ai;
    let task = state.db.tasks.insert(auth.user.id, body.into()).await?;

    let task = if enhance {
        match TaskEnricher::from_state(&state)
            .enrich_new(auth.user.id, &task)
            .await
        {
            Ok(enriched) => enriched,
            Err(e) => {
                warn!(task_id = %task.id, error = %e, "AI enhancement failed, keeping plain task");
                task
            }
        }
    } else {
        task
    };

    Ok((StatusCode::CREATED, Json(task)))
}

#[utoipa::path(
    get, path = "/api/tasks/tasks/{id}", tag = "Tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task", body = Task),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_task(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    state
        .db
        .tasks
        .get(auth.user.id, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))
}

/// Serves both PUT and PATCH; absent fields are left unchanged and an
/// explicit null clears `category_id`, `deadline` or `estimated_duration_minutes`.
#[utoipa::path(
    patch, path = "/api/tasks/tasks/{id}", tag = "Tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "Updated task", body = Task),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_task(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    let task = state.db.tasks.update(auth.user.id, id, body).await?;
    Ok(Json(task))
}

#[utoipa::path(
    delete, path = "/api/tasks/tasks/{id}", tag = "Tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_task(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.db.tasks.delete(auth.user.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Task not found".to_string()))
    }
}

#[utoipa::path(
    get, path = "/api/tasks/tasks/dashboard_stats", tag = "Tasks",
    responses((status = 200, description = "Dashboard counters", body = DashboardStats))
)]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<DashboardStats>, ApiError> {
    let stats = state
        .db
        .tasks
        .dashboard_stats(auth.user.id, Utc::now())
        .await?;
    Ok(Json(stats))
}

#[utoipa::path(
    get, path = "/api/tasks/tasks/priority_distribution", tag = "Tasks",
    responses((status = 200, description = "Open tasks per priority", body = PriorityDistribution))
)]
pub async fn priority_distribution(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<PriorityDistribution>, ApiError> {
    let distribution = state.db.tasks.priority_distribution(auth.user.id).await?;
    Ok(Json(distribution))
}

#[utoipa::path(
    get, path = "/api/tasks/tasks/upcoming_deadlines", tag = "Tasks",
    responses((status = 200, description = "Open tasks due within the next week", body = [Task]))
)]
pub async fn upcoming_deadlines(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<Vec<Task>>, ApiError> {
    let now = Utc::now();
    let tasks = state
        .db
        .tasks
        .upcoming_deadlines(auth.user.id, now, now + Duration::days(UPCOMING_DEADLINE_DAYS))
        .await?;
    Ok(Json(tasks))
}

#[utoipa::path(
    post, path = "/api/tasks/tasks/{id}/mark_completed", tag = "Tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Completed task", body = Task),
        (status = 404, description = "Not found")
    )
)]
pub async fn mark_completed(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    let task = state.db.tasks.mark_completed(auth.user.id, id).await?;
    info!(task_id = %id, "Task marked completed");
    Ok(Json(task))
}

#[utoipa::path(
    post, path = "/api/tasks/tasks/{id}/ai_analyze", tag = "Tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses(
        (status = 200, description = "Task with fresh AI insights", body = Task),
        (status = 404, description = "Not found")
    )
)]
pub async fn ai_analyze(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    let task = state
        .db
        .tasks
        .get(auth.user.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    let analyzed = TaskEnricher::from_state(&state)
        .analyze(auth.user.id, &task)
        .await?;
    Ok(Json(analyzed))
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExportQuery {
    /// `csv` or `json` (default)
    pub format: Option<String>,
}

#[utoipa::path(
    get, path = "/api/tasks/tasks/export_tasks", tag = "Tasks",
    params(ExportQuery),
    responses((status = 200, description = "tasks.csv or tasks.json attachment"))
)]
pub async fn export_tasks(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(query): Query<ExportQuery>,
) -> Result<Response, ApiError> {
    let mut tasks = Vec::new();
    loop {
        let batch = state
            .db
            .tasks
            .list(
                auth.user.id,
                ListTasksRequest {
                    limit: Some(PAGE_LIMIT_MAX),
                    offset: Some(tasks.len() as i64),
                    ..Default::default()
                },
            )
            .await?;
        let fetched = batch.tasks.len();
        tasks.extend(batch.tasks);
        if fetched == 0 || tasks.len() as i64 >= batch.total {
            break;
        }
    }

    info!(user_id = %auth.user.id, result_count = tasks.len(), "Exporting tasks");
    export_response(&tasks, ExportFormat::from_query(query.format.as_deref()))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ImportBody {
    #[serde(default)]
    pub tasks: Vec<JsonValue>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResult {
    pub imported_count: usize,
    pub errors: Vec<String>,
    pub message: String,
}

/// One task record as accepted by import. `category` may be a category id
/// or a name; unknown names are created.
#[derive(Debug, Deserialize)]
struct ImportedTask {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    priority: TaskPriority,
    #[serde(default)]
    status: TaskStatus,
    #[serde(default)]
    category_id: Option<Uuid>,
    #[serde(default)]
    deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    estimated_duration_minutes: Option<i32>,
}

/// Category reference carried by an import record.
#[derive(Debug, PartialEq, Eq)]
enum ImportedCategory<'a> {
    Id(Uuid),
    Name(&'a str),
}

/// Read `category` (an id or a name) or the `category_name` field of a JSON
/// export. Strings that parse as a UUID are taken as ids.
fn imported_category(item: &JsonValue) -> Option<ImportedCategory<'_>> {
    ["category", "category_name"]
        .iter()
        .filter_map(|key| item.get(*key).and_then(JsonValue::as_str))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(|value| match Uuid::parse_str(value) {
            Ok(id) => ImportedCategory::Id(id),
            Err(_) => ImportedCategory::Name(value),
        })
}

fn import_label(item: &JsonValue) -> &str {
    item.get("title")
        .and_then(JsonValue::as_str)
        .unwrap_or("Unknown")
}

async fn import_one(state: &AppState, user_id: Uuid, item: &JsonValue) -> Result<Task, String> {
    let record: ImportedTask = serde_json::from_value(item.clone()).map_err(|e| e.to_string())?;

    let category_id = match imported_category(item) {
        Some(ImportedCategory::Id(id)) => Some(id),
        Some(ImportedCategory::Name(name)) => Some(
            state
                .db
                .categories
                .get_or_create(name)
                .await
                .map_err(|e| e.to_string())?
                .id,
        ),
        None => record.category_id,
    };

    state
        .db
        .tasks
        .import(
            user_id,
            CreateTaskRequest {
                title: record.title,
                description: record.description,
                priority: record.priority,
                status: record.status,
                category_id,
                deadline: record.deadline,
                estimated_duration_minutes: record.estimated_duration_minutes,
                ..Default::default()
            },
        )
        .await
        .map_err(|e| ApiError::from(e).to_string())
}

#[utoipa::path(
    post, path = "/api/tasks/tasks/import_tasks", tag = "Tasks",
    request_body = ImportBody,
    responses((status = 200, description = "Import report", body = ImportResult))
)]
pub async fn import_tasks(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<ImportBody>,
) -> Result<Json<ImportResult>, ApiError> {
    let mut imported_count = 0;
    let mut errors = Vec::new();

    for item in &body.tasks {
        match import_one(&state, auth.user.id, item).await {
            Ok(_) => imported_count += 1,
            Err(e) => errors.push(format!("Task '{}': {}", import_label(item), e)),
        }
    }

    info!(
        user_id = %auth.user.id,
        imported_count,
        error_count = errors.len(),
        "Tasks imported"
    );
    Ok(Json(ImportResult {
        imported_count,
        errors,
        message: format!("Successfully imported {} tasks", imported_count),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_body_accepts_aliases_and_defaults() {
        let category = Uuid::now_v7();
        let body: CreateTaskBody = serde_json::from_value(json!({
            "title": "Pay rent",
            "category": category,
            "enhance_with_ai": true
        }))
        .unwrap();
        assert_eq!(body.category_id, Some(category));
        assert_eq!(body.priority, TaskPriority::Medium);
        assert_eq!(body.status, TaskStatus::Pending);
        assert!(body.enhance_with_ai);

        let req: CreateTaskRequest = body.into();
        assert_eq!(req.title, "Pay rent");
        assert!(req.context_used.is_none());
    }

    #[test]
    fn test_create_body_without_title_defers_to_validation() {
        let body: CreateTaskBody = serde_json::from_value(json!({})).unwrap();
        assert!(body.title.is_empty());
        assert!(!body.enhance_with_ai);
    }

    #[test]
    fn test_imported_category_lookup() {
        assert_eq!(
            imported_category(&json!({"category": "Work"})),
            Some(ImportedCategory::Name("Work"))
        );
        assert_eq!(
            imported_category(&json!({"category": " ", "category_name": "Home"})),
            Some(ImportedCategory::Name("Home"))
        );
        assert_eq!(imported_category(&json!({"category": 7})), None);
        assert_eq!(imported_category(&json!({})), None);
    }

    #[test]
    fn test_imported_category_uuid_is_an_id() {
        let id = Uuid::now_v7();
        assert_eq!(
            imported_category(&json!({"category": id.to_string()})),
            Some(ImportedCategory::Id(id))
        );
        assert_eq!(
            imported_category(&json!({"category_name": format!(" {id} ")})),
            Some(ImportedCategory::Id(id))
        );
    }

    #[test]
    fn test_import_label() {
        assert_eq!(import_label(&json!({"title": "A"})), "A");
        assert_eq!(import_label(&json!({"description": "x"})), "Unknown");
    }

    #[test]
    fn test_imported_task_rejects_bad_priority() {
        let err = serde_json::from_value::<ImportedTask>(json!({
            "title": "X",
            "priority": "critical"
        }));
        assert!(err.is_err());
    }
}
