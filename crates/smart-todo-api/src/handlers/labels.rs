//! Category and tag endpoints. Both are shared across users.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use smart_todo_core::defaults::{POPULAR_CATEGORIES_LIMIT, POPULAR_TAGS_LIMIT};
use smart_todo_core::{
    Category, CategoryRepository, LabelRequest, Tag, TagRepository, UpdateLabelRequest,
};

use crate::auth::RequireAuth;
use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// CATEGORIES
// =============================================================================

#[utoipa::path(
    get, path = "/api/tasks/categories", tag = "Categories",
    responses((status = 200, description = "All categories, most used first", body = [Category]))
)]
pub async fn list_categories(
    State(state): State<AppState>,
    _auth: RequireAuth,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.db.categories.list().await?))
}

#[utoipa::path(
    post, path = "/api/tasks/categories", tag = "Categories",
    request_body = LabelRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 409, description = "Name already taken")
    )
)]
pub async fn create_category(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Json(body): Json<LabelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state.db.categories.create(body).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    get, path = "/api/tasks/categories/{id}", tag = "Categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses((status = 200, description = "Category", body = Category), (status = 404, description = "Not found"))
)]
pub async fn get_category(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, ApiError> {
    state
        .db
        .categories
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))
}

#[utoipa::path(
    patch, path = "/api/tasks/categories/{id}", tag = "Categories",
    params(("id" = Uuid, Path, description = "Category id")),
    request_body = UpdateLabelRequest,
    responses((status = 200, description = "Category", body = Category), (status = 404, description = "Not found"))
)]
pub async fn update_category(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateLabelRequest>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.db.categories.update(id, body).await?))
}

#[utoipa::path(
    delete, path = "/api/tasks/categories/{id}", tag = "Categories",
    params(("id" = Uuid, Path, description = "Category id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found"))
)]
pub async fn delete_category(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.db.categories.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Category not found".to_string()))
    }
}

#[utoipa::path(
    get, path = "/api/tasks/categories/popular", tag = "Categories",
    responses((status = 200, description = "Top categories in use", body = [Category]))
)]
pub async fn popular_categories(
    State(state): State<AppState>,
    _auth: RequireAuth,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(
        state.db.categories.popular(POPULAR_CATEGORIES_LIMIT).await?,
    ))
}

// =============================================================================
// TAGS
// =============================================================================

#[utoipa::path(
    get, path = "/api/tasks/tags", tag = "Tags",
    responses((status = 200, description = "All tags, most used first", body = [Tag]))
)]
pub async fn list_tags(
    State(state): State<AppState>,
    _auth: RequireAuth,
) -> Result<Json<Vec<Tag>>, ApiError> {
    Ok(Json(state.db.tags.list().await?))
}

#[utoipa::path(
    post, path = "/api/tasks/tags", tag = "Tags",
    request_body = LabelRequest,
    responses(
        (status = 201, description = "Tag created", body = Tag),
        (status = 409, description = "Name already taken")
    )
)]
pub async fn create_tag(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Json(body): Json<LabelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tag = state.db.tags.create(body).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

#[utoipa::path(
    get, path = "/api/tasks/tags/{id}", tag = "Tags",
    params(("id" = Uuid, Path, description = "Tag id")),
    responses((status = 200, description = "Tag", body = Tag), (status = 404, description = "Not found"))
)]
pub async fn get_tag(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<Tag>, ApiError> {
    state
        .db
        .tags
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))
}

#[utoipa::path(
    patch, path = "/api/tasks/tags/{id}", tag = "Tags",
    params(("id" = Uuid, Path, description = "Tag id")),
    request_body = UpdateLabelRequest,
    responses((status = 200, description = "Tag", body = Tag), (status = 404, description = "Not found"))
)]
pub async fn update_tag(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateLabelRequest>,
) -> Result<Json<Tag>, ApiError> {
    Ok(Json(state.db.tags.update(id, body).await?))
}

#[utoipa::path(
    delete, path = "/api/tasks/tags/{id}", tag = "Tags",
    params(("id" = Uuid, Path, description = "Tag id")),
    responses((status = 204, description = "Deleted"), (status = 404, description = "Not found"))
)]
pub async fn delete_tag(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.db.tags.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("Tag not found".to_string()))
    }
}

#[utoipa::path(
    get, path = "/api/tasks/tags/popular", tag = "Tags",
    responses((status = 200, description = "Top tags in use", body = [Tag]))
)]
pub async fn popular_tags(
    State(state): State<AppState>,
    _auth: RequireAuth,
) -> Result<Json<Vec<Tag>>, ApiError> {
    Ok(Json(state.db.tags.popular(POPULAR_TAGS_LIMIT).await?))
}
