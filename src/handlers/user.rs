use axum::{extract::Extension, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::database::{tokens, users, DatabaseManager};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

// Bodies use Option fields and validate by hand so a missing field comes
// back as a 400 validation error instead of a deserialization rejection.

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Created-user payload: id plus public fields, never the password
#[derive(Debug, Serialize)]
pub struct CreatedUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct Profile {
    pub email: String,
    pub name: String,
}

/// POST /user/create - register a new account
pub async fn create(Json(payload): Json<CreateUserRequest>) -> ApiResult<CreatedUser> {
    let email = payload
        .email
        .ok_or_else(|| ApiError::field_error("email", "This field is required"))?;
    let password = payload
        .password
        .ok_or_else(|| ApiError::field_error("password", "This field is required"))?;
    let name = payload.name.unwrap_or_default();

    let pool = DatabaseManager::pool().await?;
    let user = users::create_user(&pool, &email, &password, &name).await?;

    Ok(ApiResponse::created(CreatedUser {
        id: user.id,
        email: user.email,
        name: user.name,
    }))
}

/// POST /user/token - exchange credentials for an opaque bearer token.
/// Any mismatch or missing field yields a 400 and never a token.
pub async fn token(Json(payload): Json<TokenRequest>) -> ApiResult<serde_json::Value> {
    let email = payload
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| ApiError::field_error("email", "This field is required"))?;
    let password = payload
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::field_error("password", "This field is required"))?;

    let pool = DatabaseManager::pool().await?;
    let user = users::authenticate(&pool, &email, &password)
        .await?
        .ok_or_else(|| {
            ApiError::bad_request("Unable to authenticate with provided credentials")
        })?;

    let token = tokens::issue_token(&pool, user.id).await?;

    Ok(ApiResponse::success(json!({ "token": token })))
}

/// GET /user/me - profile of the authenticated user
pub async fn me_get(Extension(auth_user): Extension<AuthUser>) -> ApiResult<Profile> {
    Ok(ApiResponse::success(Profile {
        email: auth_user.email,
        name: auth_user.name,
    }))
}

/// PATCH /user/me - partial profile update (name and/or password)
pub async fn me_patch(
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Profile> {
    let pool = DatabaseManager::pool().await?;
    let user = users::update_profile(
        &pool,
        auth_user.user_id,
        payload.name.as_deref(),
        payload.password.as_deref(),
    )
    .await?;

    Ok(ApiResponse::success(Profile {
        email: user.email,
        name: user.name,
    }))
}

/// POST /user/me - creation through the profile endpoint is not a thing
pub async fn me_post() -> ApiError {
    ApiError::method_not_allowed("POST is not allowed on this endpoint")
}
