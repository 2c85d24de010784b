use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::{Ingredient, Tag};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Display for Recipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Recipe with its tag/ingredient associations resolved, as returned by the
/// detail and list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    /// Storage path for an uploaded image: a fresh unique id per upload,
    /// keeping only the original file's extension.
    pub fn image_upload_path(original_filename: &str) -> String {
        let ext = std::path::Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str());

        match ext {
            Some(ext) => format!("uploads/recipe/{}.{}", Uuid::new_v4(), ext),
            None => format!("uploads/recipe/{}", Uuid::new_v4()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_path_keeps_original_extension() {
        let path = Recipe::image_upload_path("myimage.jpg");
        assert!(path.starts_with("uploads/recipe/"));
        assert!(path.ends_with(".jpg"));
    }

    #[test]
    fn image_path_is_unique_per_upload() {
        assert_ne!(
            Recipe::image_upload_path("a.png"),
            Recipe::image_upload_path("a.png")
        );
    }

    #[test]
    fn image_path_without_extension() {
        let path = Recipe::image_upload_path("rawfile");
        assert!(path.starts_with("uploads/recipe/"));
        assert!(!path.contains('.'));
    }
}
