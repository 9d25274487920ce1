//! Token authentication extractor.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use smart_todo_core::{User, UserRepository};

use crate::error::ApiError;
use crate::state::AppState;

/// Extractor for authenticated requests.
///
/// Accepts `Authorization: Bearer <token>` and the legacy
/// `Authorization: Token <token>` form. Rejects with 401 when the header
/// is missing or the token does not resolve to an active user.
///
/// ```ignore
/// async fn my_handler(auth: RequireAuth) -> impl IntoResponse {
///     format!("hello {}", auth.user.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth {
    pub user: User,
    /// The raw token presented, so logout can revoke it.
    pub token: String,
}

/// Pull the token out of an `Authorization` header value.
pub fn parse_authorization(value: &str) -> Option<&str> {
    let value = value.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !(scheme.eq_ignore_ascii_case("bearer") || scheme.eq_ignore_ascii_case("token")) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_authorization)
            .ok_or_else(|| {
                ApiError::Unauthorized("Authentication credentials were not provided".to_string())
            })?
            .to_string();

        match state.db.users.validate_token(&token).await? {
            Some(user) => Ok(RequireAuth { user, token }),
            None => Err(ApiError::Unauthorized("Invalid token".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer_and_token_schemes() {
        assert_eq!(parse_authorization("Bearer st_tok_abc"), Some("st_tok_abc"));
        assert_eq!(parse_authorization("Token st_tok_abc"), Some("st_tok_abc"));
        assert_eq!(parse_authorization("bearer   st_tok_abc  "), Some("st_tok_abc"));
    }

    #[test]
    fn test_parse_rejects_other_schemes_and_empty_tokens() {
        assert_eq!(parse_authorization("Basic dXNlcjpwYXNz"), None);
        assert_eq!(parse_authorization("Bearer "), None);
        assert_eq!(parse_authorization("st_tok_abc"), None);
        assert_eq!(parse_authorization(""), None);
    }
}
