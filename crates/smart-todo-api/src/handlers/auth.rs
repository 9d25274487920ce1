//! Account endpoints: login, register, logout and profile.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use smart_todo_core::{Error, RegisterUserRequest, UpdateProfileRequest, User, UserRepository};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CredentialsBody {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl CredentialsBody {
    fn required(&self) -> Result<(&str, &str), ApiError> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) if !u.trim().is_empty() && !p.is_empty() => Ok((u.trim(), p)),
            _ => Err(ApiError::bad_request("Username and password are required")),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

impl TokenResponse {
    fn new(token: String, user: &User) -> Self {
        Self {
            token,
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

#[utoipa::path(
    post, path = "/api/auth/login", tag = "Auth",
    request_body = CredentialsBody,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing username or password"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> Result<impl IntoResponse, ApiError> {
    let (username, password) = body.required()?;

    let user = state
        .db
        .users
        .authenticate(username, password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let token = state.db.users.issue_token(user.id).await?;
    info!(user_id = %user.id, "User logged in");
    Ok(Json(TokenResponse::new(token, &user)))
}

#[utoipa::path(
    post, path = "/api/auth/register", tag = "Auth",
    request_body = CredentialsBody,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 400, description = "Missing fields or username taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<CredentialsBody>,
) -> Result<impl IntoResponse, ApiError> {
    let (username, password) = body.required()?;

    let user = state
        .db
        .users
        .create(RegisterUserRequest {
            username: username.to_string(),
            password: password.to_string(),
            email: body.email.clone().unwrap_or_default(),
        })
        .await
        .map_err(|e| match e {
            Error::Conflict(msg) => ApiError::BadRequest(msg),
            other => other.into(),
        })?;

    let token = state.db.users.issue_token(user.id).await?;
    Ok((StatusCode::CREATED, Json(TokenResponse::new(token, &user))))
}

#[utoipa::path(
    post, path = "/api/auth/logout", tag = "Auth",
    responses((status = 200, description = "Token revoked"))
)]
pub async fn logout(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.users.revoke_token(&auth.token).await? {
        return Err(ApiError::bad_request("Error logging out"));
    }
    info!(user_id = %auth.user.id, "User logged out");
    Ok(Json(serde_json::json!({ "message": "Successfully logged out" })))
}

#[utoipa::path(
    get, path = "/api/auth/profile", tag = "Auth",
    responses((status = 200, description = "Current user", body = User))
)]
pub async fn get_profile(auth: RequireAuth) -> Json<User> {
    Json(auth.user)
}

#[utoipa::path(
    patch, path = "/api/auth/profile", tag = "Auth",
    request_body = UpdateProfileRequest,
    responses((status = 200, description = "Updated user"))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.db.users.update_profile(auth.user.id, body).await?;
    let mut payload = serde_json::to_value(&user).map_err(|e| ApiError::Internal(e.into()))?;
    if let Some(map) = payload.as_object_mut() {
        map.insert(
            "message".to_string(),
            serde_json::json!("Profile updated successfully"),
        );
    }
    Ok(Json(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(username: Option<&str>, password: Option<&str>) -> CredentialsBody {
        CredentialsBody {
            username: username.map(str::to_string),
            password: password.map(str::to_string),
            email: None,
        }
    }

    #[test]
    fn test_credentials_required() {
        assert_eq!(
            body(Some(" alice "), Some("pw")).required().unwrap(),
            ("alice", "pw")
        );
        for b in [
            body(None, Some("pw")),
            body(Some("alice"), None),
            body(Some("  "), Some("pw")),
            body(Some("alice"), Some("")),
        ] {
            let err = b.required().unwrap_err();
            assert_eq!(err.to_string(), "Username and password are required");
        }
    }
}
