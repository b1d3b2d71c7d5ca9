//! Product repository.
//!
//! Scalar columns plus one JSONB `content` document per product. List and
//! detail queries left-join the category so responses carry it populated.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use knobsshop_core::{CategoryId, ProductId, ProductStatus, UserId};

use super::RepositoryError;
use crate::models::{Category, Product, ProductContent};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: Option<String>,
    price: Decimal,
    compare_price: Option<Decimal>,
    stock: i32,
    sku: Option<String>,
    status: String,
    brand: Option<String>,
    category_id: Option<CategoryId>,
    images: Vec<String>,
    video: Option<String>,
    content: Json<ProductContent>,
    average_rating: Decimal,
    review_count: i32,
    created_by: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    // Joined category columns, NULL when the product is uncategorized.
    cat_name: Option<String>,
    cat_description: Option<String>,
    cat_image_url: Option<String>,
    cat_banner_image_url: Option<String>,
    cat_subpage_type: Option<String>,
    cat_created_at: Option<DateTime<Utc>>,
    cat_updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let status: ProductStatus = row
            .status
            .parse()
            .map_err(|e| RepositoryError::corrupt("invalid product status", e))?;

        let category = match (row.category_id, row.cat_name) {
            (Some(id), Some(name)) => Some(Category {
                id,
                name,
                description: row.cat_description,
                image_url: row.cat_image_url,
                banner_image_url: row.cat_banner_image_url,
                subpage_type: row.cat_subpage_type,
                created_at: row.cat_created_at.unwrap_or(row.created_at),
                updated_at: row.cat_updated_at.unwrap_or(row.updated_at),
            }),
            _ => None,
        };

        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            compare_price: row.compare_price,
            stock: row.stock,
            sku: row.sku,
            status,
            brand: row.brand,
            category_id: row.category_id,
            category,
            images: row.images,
            video: row.video,
            content: row.content.0,
            average_rating: row.average_rating,
            review_count: row.review_count,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const PRODUCT_SELECT: &str = "SELECT p.id, p.name, p.description, p.price, p.compare_price, \
     p.stock, p.sku, p.status, p.brand, p.category_id, p.images, p.video, p.content, \
     p.average_rating, p.review_count, p.created_by, p.created_at, p.updated_at, \
     c.name AS cat_name, c.description AS cat_description, c.image_url AS cat_image_url, \
     c.banner_image_url AS cat_banner_image_url, c.subpage_type AS cat_subpage_type, \
     c.created_at AS cat_created_at, c.updated_at AS cat_updated_at \
     FROM shop.product p LEFT JOIN shop.category c ON c.id = p.category_id";

/// Fields accepted on create and update.
#[derive(Debug)]
pub struct ProductInput<'a> {
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub price: Decimal,
    pub compare_price: Option<Decimal>,
    pub stock: i32,
    pub sku: Option<&'a str>,
    pub status: ProductStatus,
    pub brand: Option<&'a str>,
    pub category_id: Option<CategoryId>,
    pub images: &'a [String],
    pub video: Option<&'a str>,
    pub content: &'a ProductContent,
}

/// Projection for the brochure listing.
#[derive(Debug, sqlx::FromRow, serde::Serialize)]
pub struct ProductBrochure {
    pub id: ProductId,
    pub name: String,
    pub brochure: String,
}

/// Repository for catalog products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        created_by: UserId,
        input: ProductInput<'_>,
    ) -> Result<Product, RepositoryError> {
        let id = sqlx::query_scalar::<_, ProductId>(
            "INSERT INTO shop.product
                 (id, name, description, price, compare_price, stock, sku, status, brand,
                  category_id, images, video, content, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING id",
        )
        .bind(ProductId::generate())
        .bind(input.name)
        .bind(input.description)
        .bind(input.price)
        .bind(input.compare_price)
        .bind(input.stock)
        .bind(input.sku)
        .bind(input.status.as_str())
        .bind(input.brand)
        .bind(input.category_id)
        .bind(input.images)
        .bind(input.video)
        .bind(Json(input.content))
        .bind(created_by)
        .fetch_one(self.pool)
        .await?;

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// All products with category populated, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row fails to decode.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows =
            sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} ORDER BY p.created_at DESC"))
                .fetch_all(self.pool)
                .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    /// Products by id set (wishlist/cart population).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let uuids: Vec<uuid::Uuid> = ids.iter().map(|id| id.as_uuid()).collect();
        let rows =
            sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} WHERE p.id = ANY($1)"))
                .bind(&uuids)
                .fetch_all(self.pool)
                .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Replace a product's editable fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        input: ProductInput<'_>,
    ) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.product
             SET name = $2, description = $3, price = $4, compare_price = $5, stock = $6,
                 sku = $7, status = $8, brand = $9, category_id = $10, images = $11,
                 video = $12, content = $13, updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(input.name)
        .bind(input.description)
        .bind(input.price)
        .bind(input.compare_price)
        .bind(input.stock)
        .bind(input.sku)
        .bind(input.status.as_str())
        .bind(input.brand)
        .bind(input.category_id)
        .bind(input.images)
        .bind(input.video)
        .bind(Json(input.content))
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Products filed under a category, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{PRODUCT_SELECT} WHERE p.category_id = $1 ORDER BY p.created_at DESC"
        ))
        .bind(category_id)
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Case-insensitive brand substring match.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_brand(&self, brand: &str) -> Result<Vec<Product>, RepositoryError> {
        let pattern = format!("%{brand}%");
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "{PRODUCT_SELECT} WHERE p.brand ILIKE $1 ORDER BY p.created_at DESC"
        ))
        .bind(&pattern)
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Products that ship with a brochure PDF.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_brochures(&self) -> Result<Vec<ProductBrochure>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductBrochure>(
            "SELECT id, name, content->>'brochure' AS brochure
             FROM shop.product
             WHERE content->>'brochure' IS NOT NULL AND content->>'brochure' <> ''
             ORDER BY created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Store recomputed review aggregates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn set_rating_stats(
        &self,
        id: ProductId,
        average_rating: Decimal,
        review_count: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.product
             SET average_rating = $2, review_count = $3, updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(average_rating)
        .bind(review_count)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
