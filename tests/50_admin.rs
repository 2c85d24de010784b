mod common;

use anyhow::Result;
use sqlx::PgPool;

use recipe_api_rust::database::{users, DatabaseManager};

// These tests drive the account store directly through the library rather
// than the HTTP surface; superuser creation is an admin operation with no
// public endpoint.

async fn pool_or_skip() -> Option<PgPool> {
    let _ = dotenvy::dotenv();
    match DatabaseManager::pool().await {
        Ok(pool) => {
            // Idempotent; the suite may run before any server has migrated
            if let Err(e) = sqlx::migrate!().run(&pool).await {
                eprintln!("skipping: migrations failed: {}", e);
                return None;
            }
            Some(pool)
        }
        Err(e) => {
            eprintln!("skipping: database unavailable: {}", e);
            None
        }
    }
}

#[tokio::test]
async fn superuser_has_staff_and_superuser_flags() -> Result<()> {
    let Some(pool) = pool_or_skip().await else {
        return Ok(());
    };

    let email = common::unique_email("superuser");
    let user = users::create_superuser(&pool, &email, "AdminPass123").await?;

    assert!(user.is_staff);
    assert!(user.is_superuser);

    // The flags must hold on the persisted row, not just the returned value
    let stored = users::get_by_id(&pool, user.id)
        .await?
        .expect("superuser row should exist");
    assert!(stored.is_staff);
    assert!(stored.is_superuser);
    assert_eq!(stored.email, email);

    Ok(())
}

#[tokio::test]
async fn superuser_can_authenticate() -> Result<()> {
    let Some(pool) = pool_or_skip().await else {
        return Ok(());
    };

    let email = common::unique_email("superuser-auth");
    users::create_superuser(&pool, &email, "AdminPass123").await?;

    let user = users::authenticate(&pool, &email, "AdminPass123").await?;
    assert!(user.is_some());

    let user = users::authenticate(&pool, &email, "WrongPass123").await?;
    assert!(user.is_none());

    Ok(())
}
