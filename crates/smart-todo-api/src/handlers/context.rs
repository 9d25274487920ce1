//! Context entry endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use smart_todo_core::defaults::{BULK_PROCESS_LIMIT, HIGH_RELEVANCE_THRESHOLD};
use smart_todo_core::{
    ContextEntry, ContextEntryRepository, CreateContextEntryRequest, ListContextEntriesRequest,
    SourceStat, SourceType, UpdateContextEntryRequest,
};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::handlers::parse_filter;
use crate::response::{page, ListResponse};
use crate::services::ContextProcessor;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EntryListQuery {
    /// whatsapp, email, notes, calendar or manual
    pub source_type: Option<String>,
    pub is_processed: Option<bool>,
    /// Case-insensitive match on content or keywords
    pub search: Option<String>,
    /// created_at, relevance_score or sentiment_score; prefix `-` for descending
    pub ordering: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEntryBody {
    #[serde(default)]
    pub source_type: SourceType,
    #[serde(default)]
    pub content: String,
    pub original_timestamp: Option<DateTime<Utc>>,
    /// Analyse the entry and create insights and suggested tasks.
    #[serde(default = "default_true")]
    pub process_with_ai: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkProcessResult {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_count: Option<usize>,
}

/// UTC bounds of the calendar day containing `now`.
pub(crate) fn day_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(now);
    (start, start + Duration::days(1))
}

#[utoipa::path(
    get, path = "/api/context/entries", tag = "Context",
    params(EntryListQuery),
    responses((status = 200, description = "Paginated context entries"))
)]
pub async fn list_entries(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(query): Query<EntryListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (limit, offset) = page(query.limit, query.offset);
    let req = ListContextEntriesRequest {
        source_type: parse_filter(query.source_type.as_deref(), "source_type")?,
        is_processed: query.is_processed,
        search: query.search.filter(|s| !s.trim().is_empty()),
        ordering: query.ordering,
        limit: Some(limit),
        offset: Some(offset),
    };
    let (entries, total) = state.db.context.list(auth.user.id, req).await?;
    Ok(Json(ListResponse::new(entries, total, limit, offset)))
}

#[utoipa::path(
    post, path = "/api/context/entries", tag = "Context",
    request_body = CreateEntryBody,
    responses(
        (status = 201, description = "Entry captured", body = ContextEntry),
        (status = 400, description = "Content is required")
    )
)]
pub async fn create_entry(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<CreateEntryBody>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = state
        .db
        .context
        .insert(
            auth.user.id,
            CreateContextEntryRequest {
                source_type: body.source_type,
                content: body.content,
                original_timestamp: body.original_timestamp,
            },
        )
        .await?;

    let entry = if body.process_with_ai {
        ContextProcessor::from_state(&state)
            .process_or_keep(auth.user.id, entry)
            .await
    } else {
        entry
    };

    Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
    get, path = "/api/context/entries/{id}", tag = "Context",
    params(("id" = Uuid, Path, description = "Context entry id")),
    responses(
        (status = 200, description = "Context entry", body = ContextEntry),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_entry(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<ContextEntry>, ApiError> {
    state
        .db
        .context
        .get(auth.user.id, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Context entry not found".to_string()))
}

#[utoipa::path(
    patch, path = "/api/context/entries/{id}", tag = "Context",
    params(("id" = Uuid, Path, description = "Context entry id")),
    request_body = UpdateContextEntryRequest,
    responses(
        (status = 200, description = "Updated entry", body = ContextEntry),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_entry(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateContextEntryRequest>,
) -> Result<Json<ContextEntry>, ApiError> {
    Ok(Json(state.db.context.update(auth.user.id, id, body).await?))
}

#[utoipa::path(
    delete, path = "/api/context/entries/{id}", tag = "Context",
    params(("id" = Uuid, Path, description = "Context entry id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found"))
)]
pub async fn delete_entry(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.db.context.delete(auth.user.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Context entry not found".to_string()))
    }
}

#[utoipa::path(
    get, path = "/api/context/entries/today_entries", tag = "Context",
    responses((status = 200, description = "Entries captured today (UTC)", body = [ContextEntry]))
)]
pub async fn today_entries(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<Vec<ContextEntry>>, ApiError> {
    let (start, end) = day_bounds(Utc::now());
    let entries = state
        .db
        .context
        .created_between(auth.user.id, start, end)
        .await?;
    Ok(Json(entries))
}

#[utoipa::path(
    get, path = "/api/context/entries/high_relevance", tag = "Context",
    responses((status = 200, description = "Entries with relevance >= 0.7", body = [ContextEntry]))
)]
pub async fn high_relevance(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<Vec<ContextEntry>>, ApiError> {
    let entries = state
        .db
        .context
        .high_relevance(auth.user.id, HIGH_RELEVANCE_THRESHOLD)
        .await?;
    Ok(Json(entries))
}

#[utoipa::path(
    get, path = "/api/context/entries/source_stats", tag = "Context",
    responses((status = 200, description = "Entry counts per source", body = [SourceStat]))
)]
pub async fn source_stats(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<Vec<SourceStat>>, ApiError> {
    Ok(Json(state.db.context.source_stats(auth.user.id).await?))
}

#[utoipa::path(
    post, path = "/api/context/entries/bulk_process", tag = "Context",
    responses((status = 200, description = "Processing report", body = BulkProcessResult))
)]
pub async fn bulk_process(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<BulkProcessResult>, ApiError> {
    let pending = state
        .db
        .context
        .unprocessed(auth.user.id, BULK_PROCESS_LIMIT)
        .await?;

    if pending.is_empty() {
        return Ok(Json(BulkProcessResult {
            message: "No unprocessed entries found".to_string(),
            processed_count: None,
        }));
    }

    let processor = ContextProcessor::from_state(&state);
    let mut processed_count = 0;
    for entry in &pending {
        match processor.reanalyze(auth.user.id, entry).await {
            Ok(_) => processed_count += 1,
            Err(e) => warn!(context_entry_id = %entry.id, error = %e, "Failed to process entry"),
        }
    }

    info!(
        user_id = %auth.user.id,
        processed_count,
        "Bulk processing complete"
    );
    Ok(Json(BulkProcessResult {
        message: format!("Processed {} entries", processed_count),
        processed_count: Some(processed_count),
    }))
}

#[utoipa::path(
    post, path = "/api/context/entries/{id}/reprocess", tag = "Context",
    params(("id" = Uuid, Path, description = "Context entry id")),
    responses(
        (status = 200, description = "Entry with a fresh analysis", body = ContextEntry),
        (status = 404, description = "Not found")
    )
)]
pub async fn reprocess(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<ContextEntry>, ApiError> {
    let entry = state
        .db
        .context
        .get(auth.user.id, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Context entry not found".to_string()))?;

    let entry = ContextProcessor::from_state(&state)
        .reanalyze(auth.user.id, &entry)
        .await?;
    Ok(Json(entry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_day_bounds() {
        let now = Utc.with_ymd_and_hms(2026, 5, 17, 22, 45, 10).unwrap();
        let (start, end) = day_bounds(now);
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 5, 17, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 5, 18, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_create_body_processes_by_default() {
        let body: CreateEntryBody =
            serde_json::from_value(json!({"content": "Dentist Tuesday"})).unwrap();
        assert!(body.process_with_ai);
        assert_eq!(body.source_type, SourceType::Manual);

        let body: CreateEntryBody = serde_json::from_value(json!({
            "content": "x",
            "source_type": "email",
            "process_with_ai": false
        }))
        .unwrap();
        assert!(!body.process_with_ai);
        assert_eq!(body.source_type, SourceType::Email);
    }

    #[test]
    fn test_bulk_result_omits_count_when_idle() {
        let idle = BulkProcessResult {
            message: "No unprocessed entries found".to_string(),
            processed_count: None,
        };
        assert_eq!(
            serde_json::to_value(&idle).unwrap(),
            json!({"message": "No unprocessed entries found"})
        );
    }
}
