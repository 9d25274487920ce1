//! Context insight endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use smart_todo_core::defaults::{HIGH_CONFIDENCE_THRESHOLD, PAGE_LIMIT_MAX};
use smart_todo_core::{
    ContextInsight, ContextInsightRepository, ListInsightsRequest, UpdateInsightRequest,
};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::handlers::parse_filter;
use crate::response::{page, ListResponse};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InsightListQuery {
    /// deadline, priority, category, task_creation, schedule, reminder, pattern or general
    pub insight_type: Option<String>,
    pub is_applied: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

fn not_found() -> ApiError {
    ApiError::NotFound("Insight not found".to_string())
}

#[utoipa::path(
    get, path = "/api/context/insights", tag = "Insights",
    params(InsightListQuery),
    responses((status = 200, description = "Paginated insights, most confident first"))
)]
pub async fn list_insights(
    State(state): State<AppState>,
    auth: RequireAuth,
    Query(query): Query<InsightListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (limit, offset) = page(query.limit, query.offset);
    let req = ListInsightsRequest {
        insight_type: parse_filter(query.insight_type.as_deref(), "insight_type")?,
        is_applied: query.is_applied,
        min_confidence: None,
        limit: Some(limit),
        offset: Some(offset),
    };
    let (insights, total) = state.db.insights.list(auth.user.id, req).await?;
    Ok(Json(ListResponse::new(insights, total, limit, offset)))
}

#[utoipa::path(
    get, path = "/api/context/insights/{id}", tag = "Insights",
    params(("id" = Uuid, Path, description = "Insight id")),
    responses(
        (status = 200, description = "Insight", body = ContextInsight),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_insight(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<ContextInsight>, ApiError> {
    state
        .db
        .insights
        .get(auth.user.id, id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

#[utoipa::path(
    patch, path = "/api/context/insights/{id}", tag = "Insights",
    params(("id" = Uuid, Path, description = "Insight id")),
    request_body = UpdateInsightRequest,
    responses(
        (status = 200, description = "Updated insight", body = ContextInsight),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_insight(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateInsightRequest>,
) -> Result<Json<ContextInsight>, ApiError> {
    Ok(Json(state.db.insights.update(auth.user.id, id, body).await?))
}

#[utoipa::path(
    delete, path = "/api/context/insights/{id}", tag = "Insights",
    params(("id" = Uuid, Path, description = "Insight id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found"))
)]
pub async fn delete_insight(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.db.insights.delete(auth.user.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}

#[utoipa::path(
    get, path = "/api/context/insights/high_confidence", tag = "Insights",
    responses((status = 200, description = "Insights with confidence >= 0.8", body = [ContextInsight]))
)]
pub async fn high_confidence(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<Vec<ContextInsight>>, ApiError> {
    let req = ListInsightsRequest {
        min_confidence: Some(HIGH_CONFIDENCE_THRESHOLD),
        limit: Some(PAGE_LIMIT_MAX),
        ..Default::default()
    };
    let (insights, _) = state.db.insights.list(auth.user.id, req).await?;
    Ok(Json(insights))
}

#[utoipa::path(
    get, path = "/api/context/insights/unapplied", tag = "Insights",
    responses((status = 200, description = "Insights not yet applied", body = [ContextInsight]))
)]
pub async fn unapplied(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<Json<Vec<ContextInsight>>, ApiError> {
    let req = ListInsightsRequest {
        is_applied: Some(false),
        limit: Some(PAGE_LIMIT_MAX),
        ..Default::default()
    };
    let (insights, _) = state.db.insights.list(auth.user.id, req).await?;
    Ok(Json(insights))
}

#[utoipa::path(
    post, path = "/api/context/insights/{id}/mark_applied", tag = "Insights",
    params(("id" = Uuid, Path, description = "Insight id")),
    responses(
        (status = 200, description = "Insight marked applied", body = ContextInsight),
        (status = 404, description = "Not found")
    )
)]
pub async fn mark_applied(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<ContextInsight>, ApiError> {
    Ok(Json(state.db.insights.mark_applied(auth.user.id, id).await?))
}
