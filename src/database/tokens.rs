use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{generate_token, token_digest};
use crate::config;
use crate::database::manager::DatabaseError;
use crate::database::models::User;

/// Issue a fresh opaque bearer token for the user. The plaintext token is
/// returned to the caller exactly once; only its digest is stored.
pub async fn issue_token(pool: &PgPool, user_id: Uuid) -> Result<String, DatabaseError> {
    let token = generate_token();
    let ttl_hours = config::config().security.token_ttl_hours;
    let expires_at = Utc::now() + Duration::hours(ttl_hours as i64);

    sqlx::query(
        "INSERT INTO auth_tokens (id, user_id, token_hash, expires_at)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(token_digest(&token))
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(token)
}

/// Pure token-to-user lookup: digest the presented token and join against
/// unexpired rows. None means the caller is unauthenticated.
pub async fn resolve_token(pool: &PgPool, token: &str) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT u.*
         FROM users u
         JOIN auth_tokens t ON t.user_id = u.id
         WHERE t.token_hash = $1 AND t.expires_at > now()",
    )
    .bind(token_digest(token))
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Drop expired rows. Called opportunistically from the CLI.
pub async fn purge_expired(pool: &PgPool) -> Result<u64, DatabaseError> {
    let result = sqlx::query("DELETE FROM auth_tokens WHERE expires_at <= now()")
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
