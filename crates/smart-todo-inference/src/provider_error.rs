//! Error classification shared by the HTTP generation backends.

use smart_todo_core::Error;

/// Provider-agnostic error codes derived from an HTTP failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorCode {
    /// Invalid or missing API key.
    AuthenticationError,
    /// Quota or rate limit exceeded.
    RateLimitExceeded,
    /// Model not found or not available to this key.
    ModelNotFound,
    /// Prompt exceeds the model's context window.
    ContextLengthExceeded,
    /// Upstream server error.
    ServerError,
    /// Anything else.
    Unknown,
}

impl ProviderErrorCode {
    /// Determine the error code from the HTTP status and the provider's
    /// error type or status string.
    pub fn from_response(status: u16, error_type: &str) -> Self {
        let error_type = error_type.to_ascii_lowercase();
        match status {
            401 | 403 => Self::AuthenticationError,
            429 => Self::RateLimitExceeded,
            404 => Self::ModelNotFound,
            _ if error_type == "model_not_found" => Self::ModelNotFound,
            _ if error_type == "unauthenticated" || error_type == "permission_denied" => {
                Self::AuthenticationError
            }
            _ if error_type == "resource_exhausted" => Self::RateLimitExceeded,
            400 if error_type.contains("context_length") => Self::ContextLengthExceeded,
            500..=599 => Self::ServerError,
            _ => Self::Unknown,
        }
    }

    /// Check if a later attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimitExceeded | Self::ServerError)
    }
}

/// Convert a classified provider failure into the core error type.
pub fn to_core_error(code: ProviderErrorCode, message: &str) -> Error {
    match code {
        ProviderErrorCode::AuthenticationError => {
            Error::Config(format!("Authentication failed: {}", message))
        }
        ProviderErrorCode::RateLimitExceeded => {
            Error::Inference(format!("Rate limit exceeded: {}", message))
        }
        ProviderErrorCode::ModelNotFound => Error::Config(format!("Model not found: {}", message)),
        ProviderErrorCode::ContextLengthExceeded => {
            Error::Inference(format!("Context too long: {}", message))
        }
        ProviderErrorCode::ServerError => Error::Inference(format!("Server error: {}", message)),
        ProviderErrorCode::Unknown => Error::Inference(message.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_from_401() {
        let code = ProviderErrorCode::from_response(401, "invalid_api_key");
        assert_eq!(code, ProviderErrorCode::AuthenticationError);
    }

    #[test]
    fn test_error_code_from_gemini_status_strings() {
        assert_eq!(
            ProviderErrorCode::from_response(400, "UNAUTHENTICATED"),
            ProviderErrorCode::AuthenticationError
        );
        assert_eq!(
            ProviderErrorCode::from_response(400, "RESOURCE_EXHAUSTED"),
            ProviderErrorCode::RateLimitExceeded
        );
    }

    #[test]
    fn test_error_code_from_404() {
        let code = ProviderErrorCode::from_response(404, "NOT_FOUND");
        assert_eq!(code, ProviderErrorCode::ModelNotFound);
    }

    #[test]
    fn test_error_code_context_length() {
        let code = ProviderErrorCode::from_response(400, "context_length_exceeded");
        assert_eq!(code, ProviderErrorCode::ContextLengthExceeded);
    }

    #[test]
    fn test_error_code_from_5xx() {
        assert_eq!(
            ProviderErrorCode::from_response(503, "UNAVAILABLE"),
            ProviderErrorCode::ServerError
        );
        assert!(ProviderErrorCode::ServerError.is_retryable());
    }

    #[test]
    fn test_error_code_unknown_not_retryable() {
        let code = ProviderErrorCode::from_response(418, "im_a_teapot");
        assert_eq!(code, ProviderErrorCode::Unknown);
        assert!(!code.is_retryable());
    }

    #[test]
    fn test_to_core_error_auth_is_config() {
        let err = to_core_error(ProviderErrorCode::AuthenticationError, "bad key");
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("Authentication failed"));
    }

    #[test]
    fn test_to_core_error_rate_limit_is_inference() {
        let err = to_core_error(ProviderErrorCode::RateLimitExceeded, "slow down");
        assert!(matches!(err, Error::Inference(_)));
        assert!(err.to_string().contains("Rate limit exceeded"));
    }
}
