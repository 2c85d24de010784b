use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::auth::{hash_password, verify_password};
use crate::config;
use crate::database::manager::DatabaseError;
use crate::database::models::user::{normalize_email, User};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: &'static str },

    #[error("Password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Validate fields for a new user. Email emptiness or absence is fatal at
/// creation time; the password floor matches the API's serializer rules.
pub fn validate_new_user(email: &str, password: &str) -> Result<(), UserError> {
    if email.trim().is_empty() {
        return Err(UserError::Validation {
            field: "email",
            message: "This field may not be blank",
        });
    }
    if !email.contains('@') {
        return Err(UserError::Validation {
            field: "email",
            message: "Enter a valid email address",
        });
    }
    if password.len() < config::config().security.password_min_length {
        return Err(UserError::Validation {
            field: "password",
            message: "Password is too short",
        });
    }
    Ok(())
}

/// Create a regular user. The email is normalized to lowercase before
/// storage and the password is stored only as a salted hash.
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    password: &str,
    name: &str,
) -> Result<User, UserError> {
    validate_new_user(email, password)?;

    let email = normalize_email(email);
    let hashed = hash_password(password).map_err(|e| UserError::Hash(e.to_string()))?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, email, password, name)
         VALUES ($1, $2, $3, $4)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(&hashed)
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(|e| DatabaseError::from_write(e, "email"))?;

    Ok(user)
}

/// Create a superuser: same as create_user plus the staff/superuser flags.
pub async fn create_superuser(
    pool: &PgPool,
    email: &str,
    password: &str,
) -> Result<User, UserError> {
    validate_new_user(email, password)?;

    let email = normalize_email(email);
    let hashed = hash_password(password).map_err(|e| UserError::Hash(e.to_string()))?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, email, password, name, is_staff, is_superuser)
         VALUES ($1, $2, $3, '', TRUE, TRUE)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(&email)
    .bind(&hashed)
    .fetch_one(pool)
    .await
    .map_err(|e| DatabaseError::from_write(e, "email"))?;

    Ok(user)
}

/// Resolve credentials to a user. None on unknown email or hash mismatch;
/// the two cases are indistinguishable to callers on purpose.
pub async fn authenticate(
    pool: &PgPool,
    email: &str,
    password: &str,
) -> Result<Option<User>, DatabaseError> {
    let email = normalize_email(email);

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await?;

    match user {
        Some(user) if verify_password(password, &user.password) => Ok(Some(user)),
        _ => Ok(None),
    }
}

pub async fn get_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Partial profile update: only provided fields mutate. A new password goes
/// through the same length check and is re-hashed.
pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    name: Option<&str>,
    password: Option<&str>,
) -> Result<User, UserError> {
    let hashed = match password {
        Some(password) => {
            if password.len() < config::config().security.password_min_length {
                return Err(UserError::Validation {
                    field: "password",
                    message: "Password is too short",
                });
            }
            Some(hash_password(password).map_err(|e| UserError::Hash(e.to_string()))?)
        }
        None => None,
    };

    let user = sqlx::query_as::<_, User>(
        "UPDATE users
         SET name = COALESCE($2, name),
             password = COALESCE($3, password),
             updated_at = now()
         WHERE id = $1
         RETURNING *",
    )
    .bind(user_id)
    .bind(name)
    .bind(hashed)
    .fetch_one(pool)
    .await
    .map_err(|e| DatabaseError::from_write(e, "email"))?;

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_email_is_fatal() {
        assert!(matches!(
            validate_new_user("", "longenough"),
            Err(UserError::Validation { field: "email", .. })
        ));
        assert!(matches!(
            validate_new_user("   ", "longenough"),
            Err(UserError::Validation { field: "email", .. })
        ));
    }

    #[test]
    fn email_must_look_like_an_address() {
        assert!(matches!(
            validate_new_user("not-an-email", "longenough"),
            Err(UserError::Validation { field: "email", .. })
        ));
    }

    #[test]
    fn short_password_is_rejected() {
        assert!(matches!(
            validate_new_user("nakki@gov.ru", "cccp"),
            Err(UserError::Validation { field: "password", .. })
        ));
    }

    #[test]
    fn valid_input_passes() {
        assert!(validate_new_user("nakki@gov.ru", "PutinNotMyFriend1").is_ok());
    }
}
