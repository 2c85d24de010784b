use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Tag;

/// List the owner's tags, name descending. With `assigned_only`, restrict
/// to tags attached to at least one of the owner's recipes; DISTINCT keeps
/// each tag to a single row however many recipes reference it.
pub async fn list(
    pool: &PgPool,
    owner: Uuid,
    assigned_only: bool,
) -> Result<Vec<Tag>, DatabaseError> {
    let rows = if assigned_only {
        sqlx::query_as::<_, Tag>(
            "SELECT DISTINCT t.*
             FROM tags t
             JOIN recipe_tags rt ON rt.tag_id = t.id
             JOIN recipes r ON r.id = rt.recipe_id
             WHERE t.user_id = $1 AND r.user_id = $1
             ORDER BY t.name DESC, t.id DESC",
        )
        .bind(owner)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as::<_, Tag>(
            "SELECT * FROM tags WHERE user_id = $1 ORDER BY name DESC, id DESC",
        )
        .bind(owner)
        .fetch_all(pool)
        .await?
    };

    Ok(rows)
}

pub async fn create(pool: &PgPool, owner: Uuid, name: &str) -> Result<Tag, DatabaseError> {
    let tag = sqlx::query_as::<_, Tag>(
        "INSERT INTO tags (id, user_id, name) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(owner)
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(tag)
}

/// Fetch only ids owned by the given user; foreign ids silently drop out,
/// which is how cross-user references in recipe payloads are rejected.
pub async fn owned_ids(
    pool: &PgPool,
    owner: Uuid,
    ids: &[Uuid],
) -> Result<Vec<Uuid>, DatabaseError> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let rows: Vec<(Uuid,)> =
        sqlx::query_as("SELECT id FROM tags WHERE user_id = $1 AND id = ANY($2)")
            .bind(owner)
            .bind(ids)
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}
