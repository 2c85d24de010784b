use axum::{
    extract::{Extension, Query},
    response::Json,
};
use serde::Deserialize;

use crate::database::models::Tag;
use crate::database::{tags, DatabaseManager};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// assigned_only=1 restricts to tags attached to at least one recipe
    pub assigned_only: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: Option<String>,
}

/// GET /recipe/tags - list the caller's tags, name descending
pub async fn list(
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Tag>> {
    let assigned_only = query.assigned_only.map(|v| v != 0).unwrap_or(false);

    let pool = DatabaseManager::pool().await?;
    let rows = tags::list(&pool, auth_user.user_id, assigned_only).await?;

    Ok(ApiResponse::success(rows))
}

/// POST /recipe/tags - create a tag owned by the caller
pub async fn create(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateTagRequest>,
) -> ApiResult<Tag> {
    let name = payload
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::field_error("name", "This field may not be blank"))?;

    let pool = DatabaseManager::pool().await?;
    let tag = tags::create(&pool, auth_user.user_id, &name).await?;

    Ok(ApiResponse::created(tag))
}
