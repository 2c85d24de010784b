use std::collections::HashMap;

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Ingredient, Recipe, RecipeDetail, Tag};
use crate::database::{ingredients, tags};

#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub tag_ids: Vec<Uuid>,
    pub ingredient_ids: Vec<Uuid>,
}

/// Partial update; None leaves the field untouched, Some replaces it.
#[derive(Debug, Clone, Default)]
pub struct RecipePatch {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub tag_ids: Option<Vec<Uuid>>,
    pub ingredient_ids: Option<Vec<Uuid>>,
}

/// List the owner's recipes with associations resolved, newest first.
pub async fn list(pool: &PgPool, owner: Uuid) -> Result<Vec<RecipeDetail>, DatabaseError> {
    let recipes = sqlx::query_as::<_, Recipe>(
        "SELECT * FROM recipes WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(owner)
    .fetch_all(pool)
    .await?;

    let ids: Vec<Uuid> = recipes.iter().map(|r| r.id).collect();
    let mut tag_map = tags_for_recipes(pool, &ids).await?;
    let mut ingredient_map = ingredients_for_recipes(pool, &ids).await?;

    Ok(recipes
        .into_iter()
        .map(|recipe| {
            let tags = tag_map.remove(&recipe.id).unwrap_or_default();
            let ingredients = ingredient_map.remove(&recipe.id).unwrap_or_default();
            RecipeDetail { recipe, tags, ingredients }
        })
        .collect())
}

/// Fetch a single recipe scoped to its owner. Foreign ids come back as None
/// so other users' recipes surface as 404, never as data.
pub async fn get(
    pool: &PgPool,
    owner: Uuid,
    id: Uuid,
) -> Result<Option<RecipeDetail>, DatabaseError> {
    let recipe = sqlx::query_as::<_, Recipe>(
        "SELECT * FROM recipes WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    match recipe {
        Some(recipe) => Ok(Some(with_associations(pool, recipe).await?)),
        None => Ok(None),
    }
}

/// Create a recipe and its association rows in one transaction. Referenced
/// tag/ingredient ids are restricted to ones the owner actually holds.
pub async fn create(
    pool: &PgPool,
    owner: Uuid,
    new: NewRecipe,
) -> Result<RecipeDetail, DatabaseError> {
    let tag_ids = tags::owned_ids(pool, owner, &new.tag_ids).await?;
    let ingredient_ids = ingredients::owned_ids(pool, owner, &new.ingredient_ids).await?;

    let mut tx = pool.begin().await?;

    let recipe = sqlx::query_as::<_, Recipe>(
        "INSERT INTO recipes (id, user_id, title, time_minutes, price)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(owner)
    .bind(&new.title)
    .bind(new.time_minutes)
    .bind(new.price)
    .fetch_one(&mut *tx)
    .await?;

    link_tags(&mut tx, recipe.id, &tag_ids).await?;
    link_ingredients(&mut tx, recipe.id, &ingredient_ids).await?;

    tx.commit().await?;

    with_associations(pool, recipe).await
}

/// Partial update. Replacing the tag/ingredient sets rewrites the
/// association rows; omitted sets are left alone.
pub async fn update(
    pool: &PgPool,
    owner: Uuid,
    id: Uuid,
    patch: RecipePatch,
) -> Result<Option<RecipeDetail>, DatabaseError> {
    let tag_ids = match &patch.tag_ids {
        Some(ids) => Some(tags::owned_ids(pool, owner, ids).await?),
        None => None,
    };
    let ingredient_ids = match &patch.ingredient_ids {
        Some(ids) => Some(ingredients::owned_ids(pool, owner, ids).await?),
        None => None,
    };

    let mut tx = pool.begin().await?;

    // The UPDATE is itself owner-scoped; a row deleted since the request
    // started simply matches nothing and surfaces as not-found.
    let recipe = sqlx::query_as::<_, Recipe>(
        "UPDATE recipes
         SET title = COALESCE($3, title),
             time_minutes = COALESCE($4, time_minutes),
             price = COALESCE($5, price),
             updated_at = now()
         WHERE id = $1 AND user_id = $2
         RETURNING *",
    )
    .bind(id)
    .bind(owner)
    .bind(patch.title.as_deref())
    .bind(patch.time_minutes)
    .bind(patch.price)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(recipe) = recipe else {
        return Ok(None);
    };

    if let Some(tag_ids) = tag_ids {
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link_tags(&mut tx, id, &tag_ids).await?;
    }
    if let Some(ingredient_ids) = ingredient_ids {
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link_ingredients(&mut tx, id, &ingredient_ids).await?;
    }

    tx.commit().await?;

    Ok(Some(with_associations(pool, recipe).await?))
}

/// Delete an owned recipe; association rows cascade. False when the id is
/// missing or belongs to someone else.
pub async fn delete(pool: &PgPool, owner: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Record the stored image path on an owned recipe.
pub async fn set_image(
    pool: &PgPool,
    owner: Uuid,
    id: Uuid,
    image_path: &str,
) -> Result<Option<Recipe>, DatabaseError> {
    let recipe = sqlx::query_as::<_, Recipe>(
        "UPDATE recipes SET image = $3, updated_at = now()
         WHERE id = $1 AND user_id = $2
         RETURNING *",
    )
    .bind(id)
    .bind(owner)
    .bind(image_path)
    .fetch_optional(pool)
    .await?;

    Ok(recipe)
}

async fn with_associations(pool: &PgPool, recipe: Recipe) -> Result<RecipeDetail, DatabaseError> {
    let ids = vec![recipe.id];
    let mut tag_map = tags_for_recipes(pool, &ids).await?;
    let mut ingredient_map = ingredients_for_recipes(pool, &ids).await?;

    let tags = tag_map.remove(&recipe.id).unwrap_or_default();
    let ingredients = ingredient_map.remove(&recipe.id).unwrap_or_default();
    Ok(RecipeDetail { recipe, tags, ingredients })
}

async fn tags_for_recipes(
    pool: &PgPool,
    recipe_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Tag>>, DatabaseError> {
    if recipe_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(Uuid, Tag)> = sqlx::query_as::<_, (Uuid, Uuid, Uuid, String, chrono::DateTime<chrono::Utc>)>(
        "SELECT rt.recipe_id, t.id, t.user_id, t.name, t.created_at
         FROM recipe_tags rt
         JOIN tags t ON t.id = rt.tag_id
         WHERE rt.recipe_id = ANY($1)
         ORDER BY t.name DESC, t.id DESC",
    )
    .bind(recipe_ids)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(recipe_id, id, user_id, name, created_at)| {
        (recipe_id, Tag { id, user_id, name, created_at })
    })
    .collect();

    let mut map: HashMap<Uuid, Vec<Tag>> = HashMap::new();
    for (recipe_id, tag) in rows {
        map.entry(recipe_id).or_default().push(tag);
    }
    Ok(map)
}

async fn ingredients_for_recipes(
    pool: &PgPool,
    recipe_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Ingredient>>, DatabaseError> {
    if recipe_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(Uuid, Ingredient)> = sqlx::query_as::<_, (Uuid, Uuid, Uuid, String, chrono::DateTime<chrono::Utc>)>(
        "SELECT ri.recipe_id, i.id, i.user_id, i.name, i.created_at
         FROM recipe_ingredients ri
         JOIN ingredients i ON i.id = ri.ingredient_id
         WHERE ri.recipe_id = ANY($1)
         ORDER BY i.name DESC, i.id DESC",
    )
    .bind(recipe_ids)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(recipe_id, id, user_id, name, created_at)| {
        (recipe_id, Ingredient { id, user_id, name, created_at })
    })
    .collect();

    let mut map: HashMap<Uuid, Vec<Ingredient>> = HashMap::new();
    for (recipe_id, ingredient) in rows {
        map.entry(recipe_id).or_default().push(ingredient);
    }
    Ok(map)
}

async fn link_tags(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    tag_ids: &[Uuid],
) -> Result<(), DatabaseError> {
    for tag_id in tag_ids {
        sqlx::query(
            "INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(recipe_id)
        .bind(tag_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn link_ingredients(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    ingredient_ids: &[Uuid],
) -> Result<(), DatabaseError> {
    for ingredient_id in ingredient_ids {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id) VALUES ($1, $2)
             ON CONFLICT DO NOTHING",
        )
        .bind(recipe_id)
        .bind(ingredient_id)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
