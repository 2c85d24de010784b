use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Ingredient;

/// List the owner's ingredients, name descending, optionally restricted to
/// those attached to at least one of the owner's recipes (de-duplicated).
pub async fn list(
    pool: &PgPool,
    owner: Uuid,
    assigned_only: bool,
) -> Result<Vec<Ingredient>, DatabaseError> {
    let rows = if assigned_only {
        sqlx::query_as::<_, Ingredient>(
            "SELECT DISTINCT i.*
             FROM ingredients i
             JOIN recipe_ingredients ri ON ri.ingredient_id = i.id
             JOIN recipes r ON r.id = ri.recipe_id
             WHERE i.user_id = $1 AND r.user_id = $1
             ORDER BY i.name DESC, i.id DESC",
        )
        .bind(owner)
        .fetch_all(pool)
        .await?
    } else {
        sqlx::query_as::<_, Ingredient>(
            "SELECT * FROM ingredients WHERE user_id = $1 ORDER BY name DESC, id DESC",
        )
        .bind(owner)
        .fetch_all(pool)
        .await?
    };

    Ok(rows)
}

pub async fn create(pool: &PgPool, owner: Uuid, name: &str) -> Result<Ingredient, DatabaseError> {
    let ingredient = sqlx::query_as::<_, Ingredient>(
        "INSERT INTO ingredients (id, user_id, name) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(owner)
    .bind(name)
    .fetch_one(pool)
    .await?;

    Ok(ingredient)
}

/// Fetch only ids owned by the given user; foreign ids silently drop out.
pub async fn owned_ids(
    pool: &PgPool,
    owner: Uuid,
    ids: &[Uuid],
) -> Result<Vec<Uuid>, DatabaseError> {
    if ids.is_empty() {
        return Ok(vec![]);
    }

    let rows: Vec<(Uuid,)> =
        sqlx::query_as("SELECT id FROM ingredients WHERE user_id = $1 AND id = ANY($2)")
            .bind(owner)
            .bind(ids)
            .fetch_all(pool)
            .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}
