use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Argon2 hash, never the plaintext; excluded from every response body
    #[serde(skip_serializing)]
    pub password: String,
    pub name: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalize an email for storage: addresses compare case-insensitively,
/// so both halves are lowered before they hit the unique index.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
