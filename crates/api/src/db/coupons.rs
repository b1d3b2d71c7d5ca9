//! Coupon repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use knobsshop_core::{CouponId, CouponKind, CouponScope, ProductId};

use super::RepositoryError;
use crate::models::Coupon;

#[derive(Debug, sqlx::FromRow)]
struct CouponRow {
    id: CouponId,
    code: String,
    description: Option<String>,
    kind: String,
    value: Decimal,
    scope: String,
    product_id: Option<ProductId>,
    start_date: DateTime<Utc>,
    expiry_date: DateTime<Utc>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = RepositoryError;

    fn try_from(row: CouponRow) -> Result<Self, Self::Error> {
        let kind: CouponKind = row
            .kind
            .parse()
            .map_err(|e| RepositoryError::corrupt("invalid coupon kind", e))?;
        let scope: CouponScope = row
            .scope
            .parse()
            .map_err(|e| RepositoryError::corrupt("invalid coupon scope", e))?;

        Ok(Self {
            id: row.id,
            code: row.code,
            description: row.description,
            kind,
            value: row.value,
            scope,
            product_id: row.product_id,
            product: None,
            start_date: row.start_date,
            expiry_date: row.expiry_date,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const COUPON_COLUMNS: &str = "id, code, description, kind, value, scope, product_id, \
     start_date, expiry_date, is_active, created_at, updated_at";

/// Fields accepted on create and update. The code is already uppercased and
/// `is_active` computed from the window by the caller.
#[derive(Debug)]
pub struct CouponInput<'a> {
    pub code: &'a str,
    pub description: Option<&'a str>,
    pub kind: CouponKind,
    pub value: Decimal,
    pub scope: CouponScope,
    pub product_id: Option<ProductId>,
    pub start_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub is_active: bool,
}

/// Repository for discount coupons.
pub struct CouponRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CouponRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a coupon.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code already exists.
    pub async fn create(&self, input: CouponInput<'_>) -> Result<Coupon, RepositoryError> {
        let row = sqlx::query_as::<_, CouponRow>(&format!(
            "INSERT INTO shop.coupon
                 (id, code, description, kind, value, scope, product_id,
                  start_date, expiry_date, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COUPON_COLUMNS}"
        ))
        .bind(CouponId::generate())
        .bind(input.code)
        .bind(input.description)
        .bind(input.kind.as_str())
        .bind(input.value)
        .bind(input.scope.as_str())
        .bind(input.product_id)
        .bind(input.start_date)
        .bind(input.expiry_date)
        .bind(input.is_active)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::on_unique("coupon code already exists"))?;

        row.try_into()
    }

    /// Replace a coupon's fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new code is taken.
    pub async fn update(
        &self,
        id: CouponId,
        input: CouponInput<'_>,
    ) -> Result<Coupon, RepositoryError> {
        let row = sqlx::query_as::<_, CouponRow>(&format!(
            "UPDATE shop.coupon
             SET code = $2, description = $3, kind = $4, value = $5, scope = $6,
                 product_id = $7, start_date = $8, expiry_date = $9, is_active = $10,
                 updated_at = now()
             WHERE id = $1
             RETURNING {COUPON_COLUMNS}"
        ))
        .bind(id)
        .bind(input.code)
        .bind(input.description)
        .bind(input.kind.as_str())
        .bind(input.value)
        .bind(input.scope.as_str())
        .bind(input.product_id)
        .bind(input.start_date)
        .bind(input.expiry_date)
        .bind(input.is_active)
        .fetch_optional(self.pool)
        .await
        .map_err(RepositoryError::on_unique("coupon code already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the coupon doesn't exist.
    pub async fn delete(&self, id: CouponId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.coupon WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// All coupons, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Coupon>, RepositoryError> {
        let rows = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {COUPON_COLUMNS} FROM shop.coupon ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Coupon>, RepositoryError> {
        let row = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {COUPON_COLUMNS} FROM shop.coupon WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(self.pool)
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    /// Active, in-window coupons not in the caller's used list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_available(
        &self,
        used_codes: &[String],
    ) -> Result<Vec<Coupon>, RepositoryError> {
        let rows = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {COUPON_COLUMNS} FROM shop.coupon
             WHERE is_active = TRUE
               AND start_date <= now() AND expiry_date >= now()
               AND NOT (code = ANY($1))
             ORDER BY expiry_date"
        ))
        .bind(used_codes)
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Active single-product coupons (offer carousel).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_offers(&self) -> Result<Vec<Coupon>, RepositoryError> {
        let rows = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {COUPON_COLUMNS} FROM shop.coupon
             WHERE is_active = TRUE AND scope = 'single' AND product_id IS NOT NULL
               AND start_date <= now() AND expiry_date >= now()
             ORDER BY expiry_date"
        ))
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }
}
