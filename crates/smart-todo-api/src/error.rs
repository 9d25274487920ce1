//! HTTP error mapping.
//!
//! Every failure leaves the API as `{"error": "<message>"}` with a status
//! code derived from the core error kind.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use smart_todo_core::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Internal(Error),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Conflict(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(msg) => ApiError::NotFound(format!("Not found: {}", msg)),
            Error::TaskNotFound(_) => ApiError::NotFound("Task not found".to_string()),
            Error::ContextEntryNotFound(_) => {
                ApiError::NotFound("Context entry not found".to_string())
            }
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            Error::Forbidden(msg) => ApiError::Forbidden(msg),
            Error::Conflict(msg) => ApiError::Conflict(msg),
            err if err.is_unique_violation() => {
                ApiError::Conflict("A record with these values already exists".to_string())
            }
            Error::Database(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some("23503") =>
            {
                ApiError::BadRequest("Referenced record does not exist".to_string())
            }
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(err) => {
                error!(error = %err, "Request failed");
                err.to_string()
            }
            other => other.to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_core_errors_map_to_status_codes() {
        let cases = [
            (Error::NotFound("category x".into()), StatusCode::NOT_FOUND),
            (Error::TaskNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (Error::ContextEntryNotFound(Uuid::nil()), StatusCode::NOT_FOUND),
            (Error::InvalidInput("bad".into()), StatusCode::BAD_REQUEST),
            (Error::Unauthorized("no".into()), StatusCode::UNAUTHORIZED),
            (Error::Forbidden("no".into()), StatusCode::FORBIDDEN),
            (Error::Conflict("dup".into()), StatusCode::CONFLICT),
            (Error::Inference("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (Error::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                Error::Database(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_invalid_input_message_passes_through() {
        let err = ApiError::from(Error::InvalidInput("Task title is required".into()));
        assert_eq!(err.to_string(), "Task title is required");
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::bad_request("Content is required").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Content is required"}));
    }
}
