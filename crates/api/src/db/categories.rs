//! Category repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use knobsshop_core::CategoryId;

use super::RepositoryError;
use crate::models::{Category, CategoryWithCount};

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    description: Option<String>,
    image_url: Option<String>,
    banner_image_url: Option<String>,
    subpage_type: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            image_url: row.image_url,
            banner_image_url: row.banner_image_url,
            subpage_type: row.subpage_type,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryCountRow {
    #[sqlx(flatten)]
    category: CategoryRow,
    product_count: i64,
}

const CATEGORY_COLUMNS: &str = "id, name, description, image_url, banner_image_url, \
     subpage_type, created_at, updated_at";

/// Fields accepted on create and update.
#[derive(Debug)]
pub struct CategoryInput<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub image_url: Option<&'a str>,
    pub banner_image_url: Option<&'a str>,
}

/// Repository for product categories.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(&self, input: CategoryInput<'_>) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "INSERT INTO shop.category (id, name, description, image_url, banner_image_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(CategoryId::generate())
        .bind(input.name)
        .bind(input.description)
        .bind(input.image_url)
        .bind(input.banner_image_url)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::on_unique("category name already exists"))?;

        Ok(row.into())
    }

    /// All categories with product counts, alphabetical.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_with_counts(&self) -> Result<Vec<CategoryWithCount>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryCountRow>(
            "SELECT c.id, c.name, c.description, c.image_url, c.banner_image_url,
                    c.subpage_type, c.created_at, c.updated_at,
                    COUNT(p.id) AS product_count
             FROM shop.category c
             LEFT JOIN shop.product p ON p.category_id = c.id
             GROUP BY c.id
             ORDER BY c.name",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryWithCount {
                category: row.category.into(),
                product_count: row.product_count,
            })
            .collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM shop.category WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// Update a category's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new name is taken.
    pub async fn update(
        &self,
        id: CategoryId,
        input: CategoryInput<'_>,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "UPDATE shop.category
             SET name = $2, description = $3, image_url = $4, banner_image_url = $5,
                 updated_at = now()
             WHERE id = $1
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .bind(input.name)
        .bind(input.description)
        .bind(input.image_url)
        .bind(input.banner_image_url)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::on_unique("category name already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.category WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Assign or clear (`None`) a category's subpage slot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    pub async fn set_subpage_type(
        &self,
        id: CategoryId,
        subpage_type: Option<&str>,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "UPDATE shop.category SET subpage_type = $2, updated_at = now()
             WHERE id = $1
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(id)
        .bind(subpage_type)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Categories assigned to a subpage.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_subpage(
        &self,
        subpage_type: &str,
    ) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM shop.category
             WHERE subpage_type = $1
             ORDER BY name"
        ))
        .bind(subpage_type)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
