use axum::{
    extract::{Extension, Query},
    response::Json,
};
use serde::Deserialize;

use crate::database::models::Ingredient;
use crate::database::{ingredients, DatabaseManager};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub assigned_only: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateIngredientRequest {
    pub name: Option<String>,
}

/// GET /recipe/ingredients - list the caller's ingredients, name descending
pub async fn list(
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Ingredient>> {
    let assigned_only = query.assigned_only.map(|v| v != 0).unwrap_or(false);

    let pool = DatabaseManager::pool().await?;
    let rows = ingredients::list(&pool, auth_user.user_id, assigned_only).await?;

    Ok(ApiResponse::success(rows))
}

/// POST /recipe/ingredients - create an ingredient owned by the caller
pub async fn create(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateIngredientRequest>,
) -> ApiResult<Ingredient> {
    let name = payload
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::field_error("name", "This field may not be blank"))?;

    let pool = DatabaseManager::pool().await?;
    let ingredient = ingredients::create(&pool, auth_user.user_id, &name).await?;

    Ok(ApiResponse::created(ingredient))
}
