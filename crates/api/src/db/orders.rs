//! Order repository.
//!
//! Human-facing order numbers come from the `counter` table: a single upsert
//! bumps the named sequence and the result is formatted as `ORD-0042`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use knobsshop_core::{Email, OrderId, OrderStatus, PaymentMethod, PaymentStatus, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, ShippingAddress, UserSummary};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: String,
    user_id: UserId,
    items: Json<Vec<OrderItem>>,
    total_amount: Decimal,
    discount_amount: Decimal,
    final_amount: Decimal,
    coupon_code: Option<String>,
    shipping_address: Json<ShippingAddress>,
    consignment_number: Option<String>,
    status: String,
    payment_status: String,
    payment_method: String,
    payment_reference: Option<String>,
    gst_number: Option<String>,
    company_name: Option<String>,
    seen_by_admin: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    // Joined customer columns, present on list queries.
    user_name: Option<String>,
    user_email: Option<String>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row
            .status
            .parse()
            .map_err(|e| RepositoryError::corrupt("invalid order status", e))?;
        let payment_status: PaymentStatus = row
            .payment_status
            .parse()
            .map_err(|e| RepositoryError::corrupt("invalid payment status", e))?;
        let payment_method: PaymentMethod = row
            .payment_method
            .parse()
            .map_err(|e| RepositoryError::corrupt("invalid payment method", e))?;

        let user = match row.user_name {
            Some(name) => {
                let email = row
                    .user_email
                    .as_deref()
                    .map(Email::parse)
                    .transpose()
                    .map_err(|e| RepositoryError::corrupt("invalid email in database", e))?;
                Some(UserSummary {
                    id: row.user_id,
                    name,
                    email,
                })
            }
            None => None,
        };

        Ok(Self {
            id: row.id,
            order_number: row.order_number,
            user_id: row.user_id,
            user,
            items: row.items.0,
            total_amount: row.total_amount,
            discount_amount: row.discount_amount,
            final_amount: row.final_amount,
            coupon_code: row.coupon_code,
            shipping_address: row.shipping_address.0,
            consignment_number: row.consignment_number,
            status,
            payment_status,
            payment_method,
            payment_reference: row.payment_reference,
            gst_number: row.gst_number,
            company_name: row.company_name,
            seen_by_admin: row.seen_by_admin,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const ORDER_SELECT: &str = "SELECT o.id, o.order_number, o.user_id, o.items, o.total_amount, \
     o.discount_amount, o.final_amount, o.coupon_code, o.shipping_address, \
     o.consignment_number, o.status, o.payment_status, o.payment_method, \
     o.payment_reference, o.gst_number, o.company_name, o.seen_by_admin, \
     o.created_at, o.updated_at, u.name AS user_name, u.email AS user_email \
     FROM shop.orders o LEFT JOIN shop.front_user u ON u.id = o.user_id";

/// Everything needed to persist a new order. Amounts are already recomputed
/// and the coupon validated by the caller.
#[derive(Debug)]
pub struct NewOrder<'a> {
    pub user_id: UserId,
    pub items: &'a [OrderItem],
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub final_amount: Decimal,
    pub coupon_code: Option<&'a str>,
    pub shipping_address: &'a ShippingAddress,
    pub payment_method: PaymentMethod,
    pub gst_number: Option<&'a str>,
    pub company_name: Option<&'a str>,
}

/// Allow-listed fields for `PATCH /api/orders/{id}`.
#[derive(Debug, Default)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_reference: Option<String>,
    pub total_amount: Option<Decimal>,
}

/// Repository for orders and the order-number counter.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Allocate the next order number, `ORD-0001` onwards.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn next_order_number(&self) -> Result<String, RepositoryError> {
        let seq = sqlx::query_scalar::<_, i64>(
            "INSERT INTO shop.counter (name, seq) VALUES ('order_number', 1)
             ON CONFLICT (name) DO UPDATE SET seq = shop.counter.seq + 1
             RETURNING seq",
        )
        .fetch_one(self.pool)
        .await?;
        Ok(format!("ORD-{seq:04}"))
    }

    /// Persist a new order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        order_number: &str,
        new: NewOrder<'_>,
    ) -> Result<Order, RepositoryError> {
        let id = sqlx::query_scalar::<_, OrderId>(
            "INSERT INTO shop.orders
                 (id, order_number, user_id, items, total_amount, discount_amount,
                  final_amount, coupon_code, shipping_address, payment_method,
                  gst_number, company_name)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING id",
        )
        .bind(OrderId::generate())
        .bind(order_number)
        .bind(new.user_id)
        .bind(Json(new.items))
        .bind(new.total_amount)
        .bind(new.discount_amount)
        .bind(new.final_amount)
        .bind(new.coupon_code)
        .bind(Json(new.shipping_address))
        .bind(new.payment_method.as_str())
        .bind(new.gst_number)
        .bind(new.company_name)
        .fetch_one(self.pool)
        .await?;

        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// All orders with customer summaries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a row fails to decode.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows =
            sqlx::query_as::<_, OrderRow>(&format!("{ORDER_SELECT} ORDER BY o.created_at DESC"))
                .fetch_all(self.pool)
                .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{ORDER_SELECT} WHERE o.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_order_number(
        &self,
        order_number: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let row =
            sqlx::query_as::<_, OrderRow>(&format!("{ORDER_SELECT} WHERE o.order_number = $1"))
                .bind(order_number)
                .fetch_optional(self.pool)
                .await?;
        row.map(TryInto::try_into).transpose()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.orders WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Apply an allow-listed patch; absent fields keep their value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn apply_patch(
        &self,
        id: OrderId,
        patch: &OrderPatch,
    ) -> Result<Order, RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.orders
             SET status = COALESCE($2, status),
                 payment_status = COALESCE($3, payment_status),
                 payment_reference = COALESCE($4, payment_reference),
                 total_amount = COALESCE($5, total_amount),
                 updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(patch.payment_status.map(|s| s.as_str()))
        .bind(patch.payment_reference.as_deref())
        .bind(patch.total_amount)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// One page of a user's orders, newest first, plus the total count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(
        &self,
        user_id: UserId,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Order>, i64), RepositoryError> {
        let offset = (page - 1) * limit;
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{ORDER_SELECT} WHERE o.user_id = $1
             ORDER BY o.created_at DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let total = self.count_by_user(user_id).await?;
        let orders: Result<Vec<Order>, _> = rows.into_iter().map(TryInto::try_into).collect();
        Ok((orders?, total))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_user(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM shop.orders WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(self.pool)
                .await?;
        Ok(count)
    }

    /// Orders the admin hasn't looked at yet, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_unseen(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{ORDER_SELECT} WHERE o.seen_by_admin = FALSE ORDER BY o.created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn mark_seen(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.orders SET seen_by_admin = TRUE, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Store the DTDC reference number after booking a consignment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn set_consignment_number(
        &self,
        id: OrderId,
        consignment_number: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.orders SET consignment_number = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(consignment_number)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Record the gateway verdict on an order, looked up by order number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn record_payment_result(
        &self,
        order_number: &str,
        payment_status: PaymentStatus,
        payment_reference: Option<&str>,
        status: Option<OrderStatus>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.orders
             SET payment_status = $2,
                 payment_reference = COALESCE($3, payment_reference),
                 status = COALESCE($4, status),
                 updated_at = now()
             WHERE order_number = $1",
        )
        .bind(order_number)
        .bind(payment_status.as_str())
        .bind(payment_reference)
        .bind(status.map(|s| s.as_str()))
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
