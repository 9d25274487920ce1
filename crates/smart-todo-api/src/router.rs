//! Route table and middleware stack.

use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use smart_todo_core::defaults::{CORS_MAX_AGE_SECS, MAX_BODY_SIZE_BYTES};

use crate::config::ServerConfig;
use crate::handlers::{ai, auth, context, health, history, insights, labels, summaries, tasks};
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Time-ordered UUIDv7 request ids.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!("Rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": "rate_limit_exceeded",
                    "error_description": "Too many requests. Please wait before retrying."
                })),
            ));
        }
    }
    Ok(next.run(request).await)
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
        .route(
            "/profile",
            get(auth::get_profile)
                .put(auth::update_profile)
                .patch(auth::update_profile),
        )
}

fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(tasks::list_tasks).post(tasks::create_task))
        // Fixed paths are matched before `:id`.
        .route("/tasks/dashboard_stats", get(tasks::dashboard_stats))
        .route(
            "/tasks/priority_distribution",
            get(tasks::priority_distribution),
        )
        .route("/tasks/upcoming_deadlines", get(tasks::upcoming_deadlines))
        .route("/tasks/export_tasks", get(tasks::export_tasks))
        .route("/tasks/import_tasks", post(tasks::import_tasks))
        .route(
            "/tasks/:id",
            get(tasks::get_task)
                .put(tasks::update_task)
                .patch(tasks::update_task)
                .delete(tasks::delete_task),
        )
        .route("/tasks/:id/mark_completed", post(tasks::mark_completed))
        .route("/tasks/:id/ai_analyze", post(tasks::ai_analyze))
        .route(
            "/categories",
            get(labels::list_categories).post(labels::create_category),
        )
        .route("/categories/popular", get(labels::popular_categories))
        .route(
            "/categories/:id",
            get(labels::get_category)
                .put(labels::update_category)
                .patch(labels::update_category)
                .delete(labels::delete_category),
        )
        .route("/tags", get(labels::list_tags).post(labels::create_tag))
        .route("/tags/popular", get(labels::popular_tags))
        .route(
            "/tags/:id",
            get(labels::get_tag)
                .put(labels::update_tag)
                .patch(labels::update_tag)
                .delete(labels::delete_tag),
        )
        .route("/history", get(history::list_history))
        .route("/history/:id", get(history::get_history))
}

fn context_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/entries",
            get(context::list_entries).post(context::create_entry),
        )
        .route("/entries/today_entries", get(context::today_entries))
        .route("/entries/high_relevance", get(context::high_relevance))
        .route("/entries/source_stats", get(context::source_stats))
        .route("/entries/bulk_process", post(context::bulk_process))
        .route(
            "/entries/:id",
            get(context::get_entry)
                .put(context::update_entry)
                .patch(context::update_entry)
                .delete(context::delete_entry),
        )
        .route("/entries/:id/reprocess", post(context::reprocess))
        .route("/insights", get(insights::list_insights))
        .route("/insights/high_confidence", get(insights::high_confidence))
        .route("/insights/unapplied", get(insights::unapplied))
        .route(
            "/insights/:id",
            get(insights::get_insight)
                .put(insights::update_insight)
                .patch(insights::update_insight)
                .delete(insights::delete_insight),
        )
        .route("/insights/:id/mark_applied", post(insights::mark_applied))
        .route("/summaries", get(summaries::list_summaries))
        .route(
            "/summaries/generate_today_summary",
            post(summaries::generate_today_summary),
        )
        .route(
            "/summaries/recent_summaries",
            get(summaries::recent_summaries),
        )
        .route(
            "/summaries/:id",
            get(summaries::get_summary).delete(summaries::delete_summary),
        )
}

fn ai_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze-context", post(ai::analyze_context))
        .route("/prioritize-tasks", post(ai::prioritize_tasks))
        .route("/suggest-deadline", post(ai::suggest_deadline))
        .route("/categorize-task", post(ai::categorize_task))
        .route("/enhance-task", post(ai::enhance_task))
        .route("/daily-summary", post(ai::daily_summary))
        .route("/schedule-suggestions", post(ai::schedule_suggestions))
        .route("/time-blocking", post(ai::time_blocking))
}

/// Build the full application router.
pub fn app(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api/auth", auth_routes())
        .nest("/api/tasks", task_routes())
        .nest("/api/context", context_routes())
        .nest("/api/ai", ai_routes())
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(config.allowed_origins.clone()))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(CORS_MAX_AGE_SECS)),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE_BYTES))
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_uuid_v7() {
        let mut maker = MakeRequestUuidV7;
        let request = axum::http::Request::new(());
        let id = maker.make_request_id(&request).unwrap();
        let parsed: Uuid = id.header_value().to_str().unwrap().parse().unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }
}
