//! Review repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use knobsshop_core::{ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::Review;

#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    product_id: ProductId,
    user_id: UserId,
    name: String,
    rating: i32,
    comment: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            user_id: row.user_id,
            name: row.name,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const REVIEW_COLUMNS: &str =
    "id, product_id, user_id, name, rating, comment, created_at, updated_at";

/// Recomputed aggregates after a review write.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct RatingStats {
    pub average_rating: Decimal,
    pub review_count: i64,
}

/// Repository for product reviews.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create or overwrite the caller's review of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn upsert(
        &self,
        product_id: ProductId,
        user_id: UserId,
        name: &str,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "INSERT INTO shop.review (id, product_id, user_id, name, rating, comment)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (product_id, user_id) DO UPDATE
                 SET name = EXCLUDED.name,
                     rating = EXCLUDED.rating,
                     comment = EXCLUDED.comment,
                     updated_at = now()
             RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(ReviewId::generate())
        .bind(product_id)
        .bind(user_id)
        .bind(name)
        .bind(rating)
        .bind(comment)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// A product's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM shop.review
             WHERE product_id = $1
             ORDER BY created_at DESC"
        ))
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM shop.review WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review doesn't exist.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.review WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Current aggregates for a product, zero when it has no reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn rating_stats(&self, product_id: ProductId) -> Result<RatingStats, RepositoryError> {
        let stats = sqlx::query_as::<_, RatingStats>(
            "SELECT COALESCE(AVG(rating), 0)::numeric AS average_rating,
                    COUNT(*) AS review_count
             FROM shop.review
             WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;
        Ok(stats)
    }
}
