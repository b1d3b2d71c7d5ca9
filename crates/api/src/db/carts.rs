//! Cart and shared-cart repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use knobsshop_core::{CartItemId, ProductId, UserId};

use super::RepositoryError;
use crate::models::{CartItem, SharedCart, SharedCartItem};

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: CartItemId,
    user_id: UserId,
    product_id: ProductId,
    quantity: i32,
    size: Option<String>,
    color: Option<String>,
    price: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            product: None,
            quantity: row.quantity,
            size: row.size,
            color: row.color,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SharedCartRow {
    token: String,
    items: Json<Vec<SharedCartItem>>,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<SharedCartRow> for SharedCart {
    fn from(row: SharedCartRow) -> Self {
        Self {
            token: row.token,
            items: row.items.0,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

const CART_COLUMNS: &str =
    "id, user_id, product_id, quantity, size, color, price, created_at, updated_at";

/// New cart line parameters.
#[derive(Debug)]
pub struct NewCartItem<'a> {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub size: Option<&'a str>,
    pub color: Option<&'a str>,
    pub price: Option<Decimal>,
}

/// Repository for cart lines and share-by-link snapshots.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a line to the cart; an existing (user, product) line has its
    /// quantity bumped instead of a second row appearing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_item(&self, new: NewCartItem<'_>) -> Result<CartItem, RepositoryError> {
        let row = sqlx::query_as::<_, CartItemRow>(&format!(
            "INSERT INTO shop.cart_item (id, user_id, product_id, quantity, size, color, price)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (user_id, product_id) DO UPDATE
                 SET quantity = shop.cart_item.quantity + EXCLUDED.quantity,
                     size = EXCLUDED.size,
                     color = EXCLUDED.color,
                     price = EXCLUDED.price,
                     updated_at = now()
             RETURNING {CART_COLUMNS}"
        ))
        .bind(CartItemId::generate())
        .bind(new.user_id)
        .bind(new.product_id)
        .bind(new.quantity)
        .bind(new.size)
        .bind(new.color)
        .bind(new.price)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// A user's cart lines, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(&format!(
            "SELECT {CART_COLUMNS} FROM shop.cart_item
             WHERE user_id = $1
             ORDER BY created_at"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line doesn't exist.
    pub async fn delete_item(&self, id: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cart_item WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_user(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM shop.cart_item WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }

    /// Publish a cart snapshot under a share token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` on a token collision.
    pub async fn create_shared(
        &self,
        token: &str,
        items: &[SharedCartItem],
        expires_at: DateTime<Utc>,
    ) -> Result<SharedCart, RepositoryError> {
        let row = sqlx::query_as::<_, SharedCartRow>(
            "INSERT INTO shop.shared_cart (token, items, expires_at)
             VALUES ($1, $2, $3)
             RETURNING token, items, created_at, expires_at",
        )
        .bind(token)
        .bind(Json(items))
        .bind(expires_at)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::on_unique("share token collision"))?;

        Ok(row.into())
    }

    /// Resolve a share token; expired snapshots read as absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_shared(&self, token: &str) -> Result<Option<SharedCart>, RepositoryError> {
        let row = sqlx::query_as::<_, SharedCartRow>(
            "SELECT token, items, created_at, expires_at
             FROM shop.shared_cart
             WHERE token = $1 AND expires_at > now()",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}
