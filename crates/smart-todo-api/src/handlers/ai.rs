//! Direct AI endpoints.
//!
//! Each handler gathers the caller's tasks and recent context, runs one AI
//! operation and returns the model payload as-is. The AI client never
//! fails, so only validation and storage errors surface here.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use smart_todo_core::defaults::{
    AVAILABLE_HOURS, SCHEDULING_CONTEXT_ENTRIES, TASK_CONTEXT_ENTRIES, TIME_BLOCK_TASK_LIMIT,
};
use smart_todo_core::{
    CategoryRepository, ContextEntryRepository, HistoryAction, SourceType, Task, TaskAiUpdate,
    TaskRepository,
};
use smart_todo_inference::responses::TaskPriorityAssessment;
use smart_todo_inference::TaskBrief;

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::handlers::context::day_bounds;
use crate::services::{recent_snippets, snippets};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeContextBody {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub source_type: SourceType,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TaskTextBody {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl TaskTextBody {
    fn required(&self) -> Result<(), ApiError> {
        if self.title.trim().is_empty() {
            return Err(ApiError::bad_request("Task title is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct TimeBlockingBody {
    /// Hours available for focused work; defaults to 8.
    pub available_hours: Option<u32>,
}

fn briefs(tasks: &[Task]) -> Vec<TaskBrief> {
    tasks.iter().map(TaskBrief::from).collect()
}

/// Match a model assessment back to one of the submitted tasks.
fn assessed_task<'a>(tasks: &'a [Task], assessment: &TaskPriorityAssessment) -> Option<&'a Task> {
    let id: Uuid = assessment.task_id.trim().parse().ok()?;
    tasks.iter().find(|t| t.id == id)
}

#[utoipa::path(
    post, path = "/api/ai/analyze-context", tag = "AI",
    request_body = AnalyzeContextBody,
    responses(
        (status = 200, description = "Context analysis payload"),
        (status = 400, description = "Content is required")
    )
)]
pub async fn analyze_context(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Json(body): Json<AnalyzeContextBody>,
) -> Result<impl IntoResponse, ApiError> {
    if body.content.trim().is_empty() {
        return Err(ApiError::bad_request("Content is required"));
    }
    let analysis = state
        .ai
        .analyze_context(&body.content, body.source_type)
        .await;
    Ok(Json(analysis))
}

/// Score open tasks and write each score back to its task.
#[utoipa::path(
    post, path = "/api/ai/prioritize-tasks", tag = "AI",
    responses((status = 200, description = "Prioritization payload"))
)]
pub async fn prioritize_tasks(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = auth.user.id;
    let tasks = state.db.tasks.list_open(user_id, None).await?;
    let context = recent_snippets(&state.db, user_id, SCHEDULING_CONTEXT_ENTRIES).await?;

    let prioritization = state.ai.prioritize_tasks(&briefs(&tasks), &context).await;

    for assessment in &prioritization.prioritized_tasks {
        let Some(task) = assessed_task(&tasks, assessment) else {
            debug!(task_id = %assessment.task_id, "Assessment does not match an open task");
            continue;
        };
        let update = TaskAiUpdate {
            ai_priority_score: Some(assessment.priority_score.clamp(0.0, 1.0)),
            ai_priority_reasoning: Some(assessment.reasoning.clone()),
            ..Default::default()
        };
        if let Err(e) = state
            .db
            .tasks
            .apply_ai_update(
                user_id,
                task.id,
                update,
                HistoryAction::AiPrioritized,
                json!(assessment),
            )
            .await
        {
            warn!(task_id = %task.id, error = %e, "Failed to store priority score");
        }
    }

    Ok(Json(prioritization))
}

#[utoipa::path(
    post, path = "/api/ai/suggest-deadline", tag = "AI",
    request_body = TaskTextBody,
    responses(
        (status = 200, description = "Deadline suggestion payload"),
        (status = 400, description = "Task title is required")
    )
)]
pub async fn suggest_deadline(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<TaskTextBody>,
) -> Result<impl IntoResponse, ApiError> {
    body.required()?;
    let context = recent_snippets(&state.db, auth.user.id, TASK_CONTEXT_ENTRIES).await?;
    let suggestion = state
        .ai
        .suggest_deadline(&body.title, &body.description, &context)
        .await;
    Ok(Json(suggestion))
}

#[utoipa::path(
    post, path = "/api/ai/categorize-task", tag = "AI",
    request_body = TaskTextBody,
    responses(
        (status = 200, description = "Categorization payload"),
        (status = 400, description = "Task title is required")
    )
)]
pub async fn categorize_task(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Json(body): Json<TaskTextBody>,
) -> Result<impl IntoResponse, ApiError> {
    body.required()?;
    let existing = state.db.categories.names().await?;
    let categorization = state
        .ai
        .categorize_task(&body.title, &body.description, &existing)
        .await;
    Ok(Json(categorization))
}

#[utoipa::path(
    post, path = "/api/ai/enhance-task", tag = "AI",
    request_body = TaskTextBody,
    responses(
        (status = 200, description = "Enhancement payload"),
        (status = 400, description = "Task title is required")
    )
)]
pub async fn enhance_task(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<TaskTextBody>,
) -> Result<impl IntoResponse, ApiError> {
    body.required()?;
    let context = recent_snippets(&state.db, auth.user.id, TASK_CONTEXT_ENTRIES).await?;
    let enhancement = state
        .ai
        .enhance_task_description(&body.title, &body.description, &context)
        .await;
    Ok(Json(enhancement))
}

/// Digest of today's context and open tasks. Nothing is stored.
#[utoipa::path(
    post, path = "/api/ai/daily-summary", tag = "AI",
    responses((status = 200, description = "Daily summary payload"))
)]
pub async fn daily_summary(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = auth.user.id;
    let (start, end) = day_bounds(Utc::now());
    let entries = state.db.context.created_between(user_id, start, end).await?;
    let tasks = state.db.tasks.list_open(user_id, None).await?;
    let summary = state
        .ai
        .generate_daily_summary(&snippets(&entries), &briefs(&tasks))
        .await;
    Ok(Json(summary))
}

#[utoipa::path(
    post, path = "/api/ai/schedule-suggestions", tag = "AI",
    responses((status = 200, description = "Schedule payload"))
)]
pub async fn schedule_suggestions(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = auth.user.id;
    let tasks = state.db.tasks.list_open(user_id, None).await?;
    let context = recent_snippets(&state.db, user_id, SCHEDULING_CONTEXT_ENTRIES).await?;
    let schedule = state
        .ai
        .generate_schedule_suggestions(&briefs(&tasks), &context)
        .await;
    Ok(Json(schedule))
}

#[utoipa::path(
    post, path = "/api/ai/time-blocking", tag = "AI",
    request_body = TimeBlockingBody,
    responses((status = 200, description = "Time block payload"))
)]
pub async fn time_blocking(
    State(state): State<AppState>,
    auth: RequireAuth,
    body: Option<Json<TimeBlockingBody>>,
) -> Result<impl IntoResponse, ApiError> {
    let available_hours = body
        .and_then(|Json(b)| b.available_hours)
        .unwrap_or(AVAILABLE_HOURS);
    let tasks = state
        .db
        .tasks
        .list_open(auth.user.id, Some(TIME_BLOCK_TASK_LIMIT))
        .await?;
    let blocks = state
        .ai
        .generate_time_blocks(&briefs(&tasks), available_hours)
        .await;
    Ok(Json(blocks))
}
