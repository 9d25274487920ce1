//! Daily summary endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use tracing::info;
use utoipa::IntoParams;
use uuid::Uuid;

use smart_todo_core::defaults::{DEADLINE_KEYWORDS, RECENT_SUMMARY_DAYS};
use smart_todo_core::{
    ContextEntry, ContextEntryRepository, CreateDailySummaryRequest, DailyContextSummary,
    DailySummaryRepository, TaskRepository,
};
use smart_todo_inference::{DailySummary, TaskBrief};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::handlers::context::day_bounds;
use crate::response::{page, ListResponse};
use crate::services::snippets;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn mentions_deadline(content: &str) -> bool {
    let content = content.to_lowercase();
    DEADLINE_KEYWORDS.iter().any(|k| content.contains(k))
}

fn count_i32(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Combine the day's entries and the model's digest into a storable summary.
pub(crate) fn summary_request(
    user_id: Uuid,
    date: NaiveDate,
    entries: &[ContextEntry],
    digest: &DailySummary,
) -> smart_todo_core::Result<CreateDailySummaryRequest> {
    Ok(CreateDailySummaryRequest {
        user_id,
        date,
        total_entries: count_i32(entries.len()),
        high_priority_indicators: count_i32(
            entries
                .iter()
                .filter(|e| !e.urgency_indicators.is_empty())
                .count(),
        ),
        new_task_suggestions: count_i32(digest.recommendations.len()),
        deadline_mentions: count_i32(
            entries.iter().filter(|e| mentions_deadline(&e.content)).count(),
        ),
        summary_text: digest.summary.clone(),
        key_themes: digest.key_themes.clone(),
        priority_areas: digest.priority_areas.clone(),
        recommended_actions: serde_json::to_value(&digest.recommendations)?,
        schedule_suggestions: serde_json::to_value(&digest.schedule_suggestions)?,
    })
}

#[utoipa::path(
    get, path = "/api/context/summaries", tag = "Summaries",
    params(SummaryListQuery),
    responses((status = 200, description = "Paginated summaries, newest first"))
)]
pub async fn list_summaries(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(query): Query<SummaryListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (limit, offset) = page(query.limit, query.offset);
    let (summaries, total) = state
        .db
        .summaries
        .list(auth.user.id, limit, offset)
        .await?;
    Ok(Json(ListResponse::new(summaries, total, limit, offset)))
}

#[utoipa::path(
    get, path = "/api/context/summaries/{id}", tag = "Summaries",
    params(("id" = Uuid, Path, description = "Summary id")),
    responses(
        (status = 200, description = "Summary", body = DailyContextSummary),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_summary(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<DailyContextSummary>, ApiError> {
    state
        .db
        .summaries
        .get(auth.user.id, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Summary not found".to_string()))
}

#[utoipa::path(
    delete, path = "/api/context/summaries/{id}", tag = "Summaries",
    params(("id" = Uuid, Path, description = "Summary id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found"))
)]
pub async fn delete_summary(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.db.summaries.delete(auth.user.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Summary not found".to_string()))
    }
}

#[utoipa::path(
    get, path = "/api/context/summaries/recent_summaries", tag = "Summaries",
    responses((status = 200, description = "Summaries from the last 7 days", body = [DailyContextSummary]))
)]
pub async fn recent_summaries(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<Vec<DailyContextSummary>>, ApiError> {
    let since = Utc::now().date_naive() - Duration::days(RECENT_SUMMARY_DAYS);
    Ok(Json(state.db.summaries.since(auth.user.id, since).await?))
}

/// Return today's summary, generating and storing it on first request.
#[utoipa::path(
    post, path = "/api/context/summaries/generate_today_summary", tag = "Summaries",
    responses((status = 200, description = "Today's summary", body = DailyContextSummary))
)]
pub async fn generate_today_summary(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<DailyContextSummary>, ApiError> {
    let user_id = auth.user.id;
    let now = Utc::now();
    let today = now.date_naive();

    if let Some(existing) = state.db.summaries.get_for_date(user_id, today).await? {
        return Ok(Json(existing));
    }

    let (start, end) = day_bounds(now);
    let entries = state.db.context.created_between(user_id, start, end).await?;
    let tasks = state.db.tasks.list_open(user_id, None).await?;
    let briefs: Vec<TaskBrief> = tasks.iter().map(TaskBrief::from).collect();

    let digest = state
        .ai
        .generate_daily_summary(&snippets(&entries), &briefs)
        .await;

    let summary = state
        .db
        .summaries
        .insert(summary_request(user_id, today, &entries, &digest)?)
        .await?;

    info!(
        user_id = %user_id,
        date = %today,
        total_entries = summary.total_entries,
        "Daily summary generated"
    );
    Ok(Json(summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use smart_todo_core::SourceType;

    fn entry(content: &str, urgency: &[&str]) -> ContextEntry {
        let now = Utc::now();
        ContextEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            source_type: SourceType::Notes,
            content: content.to_string(),
            processed_insights: json!({}),
            keywords: vec![],
            sentiment_score: None,
            urgency_indicators: urgency.iter().map(|s| s.to_string()).collect(),
            original_timestamp: None,
            created_at: now,
            updated_at: now,
            is_processed: true,
            relevance_score: 0.5,
            related_task_ids: vec![],
        }
    }

    #[test]
    fn test_mentions_deadline_is_case_insensitive() {
        assert!(mentions_deadline("Report DUE friday"));
        assert!(mentions_deadline("Deadline moved"));
        assert!(!mentions_deadline("Lunch with Sam"));
    }

    #[test]
    fn test_summary_request_counts() {
        let entries = vec![
            entry("Invoice due tomorrow", &["tomorrow"]),
            entry("Call the plumber", &[]),
            entry("Finish slides by noon", &["noon", "asap"]),
        ];
        let digest: DailySummary = serde_json::from_value(json!({
            "summary": "Busy day",
            "key_themes": ["finance"],
            "recommendations": [
                {"type": "task", "title": "Pay invoice", "description": ""}
            ]
        }))
        .unwrap();

        let date = Utc::now().date_naive();
        let req = summary_request(Uuid::nil(), date, &entries, &digest).unwrap();
        assert_eq!(req.total_entries, 3);
        assert_eq!(req.high_priority_indicators, 2);
        assert_eq!(req.deadline_mentions, 2);
        assert_eq!(req.new_task_suggestions, 1);
        assert_eq!(req.summary_text, "Busy day");
        assert_eq!(req.key_themes, vec!["finance"]);
        assert_eq!(req.recommended_actions[0]["title"], "Pay invoice");
        assert_eq!(req.schedule_suggestions, json!([]));
    }

    #[test]
    fn test_fallback_digest_produces_empty_summary() {
        let req = summary_request(
            Uuid::nil(),
            Utc::now().date_naive(),
            &[],
            &DailySummary::fallback(),
        )
        .unwrap();
        assert_eq!(req.total_entries, 0);
        assert_eq!(req.summary_text, "Daily summary not available");
        assert_eq!(req.recommended_actions, json!([]));
    }
}
