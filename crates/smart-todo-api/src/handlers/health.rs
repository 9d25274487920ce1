use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use smart_todo_db::log_pool_metrics;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    /// `healthy` or `degraded`
    pub status: &'static str,
    pub database: bool,
    pub ai_backend: bool,
    pub model: String,
    pub version: &'static str,
}

impl HealthStatus {
    fn new(database: bool, ai_backend: bool, model: String) -> Self {
        Self {
            status: if database && ai_backend {
                "healthy"
            } else {
                "degraded"
            },
            database,
            ai_backend,
            model,
            version: env!("CARGO_PKG_VERSION"),
        }
    }

    fn status_code(&self) -> StatusCode {
        if self.database && self.ai_backend {
            StatusCode::OK
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Database and AI backend reachability. No authentication.
#[utoipa::path(
    get, path = "/health", tag = "Health",
    responses(
        (status = 200, description = "All dependencies reachable", body = HealthStatus),
        (status = 503, description = "A dependency is down", body = HealthStatus)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.db.ping().await {
        Ok(()) => {
            log_pool_metrics(state.db.pool());
            true
        }
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            false
        }
    };
    let ai_backend = state.ai.health_check().await;

    let health = HealthStatus::new(database, ai_backend, state.ai.model_name().to_string());
    (health.status_code(), Json(health))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_when_any_dependency_down() {
        let ok = HealthStatus::new(true, true, "m".to_string());
        assert_eq!(ok.status, "healthy");
        assert_eq!(ok.status_code(), StatusCode::OK);

        let db_down = HealthStatus::new(false, true, "m".to_string());
        assert_eq!(db_down.status, "degraded");
        assert_eq!(db_down.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let ai_down = HealthStatus::new(true, false, "m".to_string());
        assert_eq!(ai_down.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
