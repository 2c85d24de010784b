use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::database::DatabaseManager;
use crate::handlers;
use crate::middleware::require_auth;

pub fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(user_public_routes())
        // Private (bearer token required)
        .merge(user_private_routes())
        .merge(recipe_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn user_public_routes() -> Router {
    use handlers::user;

    Router::new()
        .route("/user/create", post(user::create))
        .route("/user/token", post(user::token))
}

fn user_private_routes() -> Router {
    use handlers::user;

    Router::new()
        .route(
            "/user/me",
            get(user::me_get).patch(user::me_patch).post(user::me_post),
        )
        .route_layer(from_fn(require_auth))
}

fn recipe_routes() -> Router {
    use handlers::{ingredients, recipes, tags};

    Router::new()
        .route("/recipe/tags", get(tags::list).post(tags::create))
        .route(
            "/recipe/ingredients",
            get(ingredients::list).post(ingredients::create),
        )
        .route("/recipe/recipes", get(recipes::list).post(recipes::create))
        .route(
            "/recipe/recipes/:id",
            get(recipes::detail)
                .put(recipes::update_full)
                .patch(recipes::update_partial)
                .delete(recipes::delete),
        )
        .route("/recipe/recipes/:id/image", post(recipes::upload_image))
        .route_layer(from_fn(require_auth))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Recipe API (Rust)",
            "version": version,
            "description": "User accounts with ownership-scoped recipes, tags and ingredients",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "user": "/user/create, /user/token (public), /user/me (private)",
                "tags": "/recipe/tags (private)",
                "ingredients": "/recipe/ingredients (private)",
                "recipes": "/recipe/recipes[/:id[/image]] (private)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
