use axum::{
    body::Bytes,
    extract::{Extension, Path, Query},
    response::Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::config;
use crate::database::models::{Recipe, RecipeDetail};
use crate::database::recipes::{self, NewRecipe, RecipePatch};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
pub struct RecipeRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    #[serde(default)]
    pub tags: Option<Vec<Uuid>>,
    #[serde(default)]
    pub ingredients: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub filename: Option<String>,
}

fn validated_title(title: Option<String>) -> Result<String, ApiError> {
    title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::field_error("title", "This field may not be blank"))
}

/// GET /recipe/recipes - list the caller's recipes, newest first
pub async fn list(Extension(auth_user): Extension<AuthUser>) -> ApiResult<Vec<RecipeDetail>> {
    let pool = DatabaseManager::pool().await?;
    let rows = recipes::list(&pool, auth_user.user_id).await?;

    Ok(ApiResponse::success(rows))
}

/// POST /recipe/recipes - create a recipe owned by the caller
pub async fn create(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<RecipeRequest>,
) -> ApiResult<RecipeDetail> {
    let title = validated_title(payload.title)?;
    let time_minutes = payload
        .time_minutes
        .ok_or_else(|| ApiError::field_error("time_minutes", "This field is required"))?;
    let price = payload
        .price
        .ok_or_else(|| ApiError::field_error("price", "This field is required"))?;

    if time_minutes < 0 {
        return Err(ApiError::field_error("time_minutes", "Must not be negative"));
    }
    if price < Decimal::ZERO {
        return Err(ApiError::field_error("price", "Must not be negative"));
    }

    let pool = DatabaseManager::pool().await?;
    let recipe = recipes::create(
        &pool,
        auth_user.user_id,
        NewRecipe {
            title,
            time_minutes,
            price,
            tag_ids: payload.tags.unwrap_or_default(),
            ingredient_ids: payload.ingredients.unwrap_or_default(),
        },
    )
    .await?;

    Ok(ApiResponse::created(recipe))
}

/// GET /recipe/recipes/:id - detail, owner-scoped (foreign ids are 404)
pub async fn detail(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<RecipeDetail> {
    let pool = DatabaseManager::pool().await?;
    let recipe = recipes::get(&pool, auth_user.user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))?;

    Ok(ApiResponse::success(recipe))
}

/// PUT /recipe/recipes/:id - full update, all fields required
pub async fn update_full(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecipeRequest>,
) -> ApiResult<RecipeDetail> {
    let title = validated_title(payload.title)?;
    let time_minutes = payload
        .time_minutes
        .ok_or_else(|| ApiError::field_error("time_minutes", "This field is required"))?;
    let price = payload
        .price
        .ok_or_else(|| ApiError::field_error("price", "This field is required"))?;

    let patch = RecipePatch {
        title: Some(title),
        time_minutes: Some(time_minutes),
        price: Some(price),
        tag_ids: Some(payload.tags.unwrap_or_default()),
        ingredient_ids: Some(payload.ingredients.unwrap_or_default()),
    };

    let pool = DatabaseManager::pool().await?;
    let recipe = recipes::update(&pool, auth_user.user_id, id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))?;

    Ok(ApiResponse::success(recipe))
}

/// PATCH /recipe/recipes/:id - partial update, only provided fields mutate
pub async fn update_partial(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecipeRequest>,
) -> ApiResult<RecipeDetail> {
    let title = match payload.title {
        Some(title) => Some(validated_title(Some(title))?),
        None => None,
    };

    let patch = RecipePatch {
        title,
        time_minutes: payload.time_minutes,
        price: payload.price,
        tag_ids: payload.tags,
        ingredient_ids: payload.ingredients,
    };

    let pool = DatabaseManager::pool().await?;
    let recipe = recipes::update(&pool, auth_user.user_id, id, patch)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))?;

    Ok(ApiResponse::success(recipe))
}

/// DELETE /recipe/recipes/:id
pub async fn delete(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    let deleted = recipes::delete(&pool, auth_user.user_id, id).await?;

    if !deleted {
        return Err(ApiError::not_found("Recipe not found"));
    }

    Ok(ApiResponse::<()>::no_content())
}

/// POST /recipe/recipes/:id/image - upload raw image bytes. The stored path
/// is derived fresh per upload from the original filename's extension.
pub async fn upload_image(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Query(query): Query<ImageQuery>,
    body: Bytes,
) -> ApiResult<Recipe> {
    if body.is_empty() {
        return Err(ApiError::field_error("image", "No image data provided"));
    }

    let filename = query.filename.unwrap_or_else(|| "upload".to_string());
    let relative_path = Recipe::image_upload_path(&filename);

    let media_root = &config::config().api.media_root;
    let full_path = std::path::Path::new(media_root).join(&relative_path);

    let pool = DatabaseManager::pool().await?;

    // Verify ownership before touching the filesystem
    recipes::get(&pool, auth_user.user_id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))?;

    if let Some(parent) = full_path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            tracing::error!("Failed to create media directory: {}", e);
            ApiError::internal_server_error("Failed to store image")
        })?;
    }
    tokio::fs::write(&full_path, &body).await.map_err(|e| {
        tracing::error!("Failed to write image file: {}", e);
        ApiError::internal_server_error("Failed to store image")
    })?;

    let recipe = recipes::set_image(&pool, auth_user.user_id, id, &relative_path)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipe not found"))?;

    Ok(ApiResponse::success(recipe))
}
