//! Analytics snapshot repository.
//!
//! Snapshots are computed in `services::analytics` from already-fetched rows;
//! this module only persists and reads them. Trend arrays, the status summary
//! and the top-seller list land in JSONB columns.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use knobsshop_core::SnapshotId;

use super::RepositoryError;
use crate::models::{AnalyticsSnapshot, OrderStatusSummary, TopSeller, TrendPoint};

#[derive(Debug, sqlx::FromRow)]
struct SnapshotRow {
    id: SnapshotId,
    date: DateTime<Utc>,
    total_sales: Decimal,
    sales_return: Decimal,
    average_order_value: Decimal,
    monthly_sales: Json<Vec<TrendPoint>>,
    weekly_sales: Json<Vec<TrendPoint>>,
    yearly_sales: Json<Vec<TrendPoint>>,
    total_customers: i64,
    total_users: i64,
    new_customers: i64,
    returning_customers: i64,
    total_orders: i64,
    order_status_summary: Json<OrderStatusSummary>,
    top_selling_products: Json<Vec<TopSeller>>,
    created_at: DateTime<Utc>,
}

impl From<SnapshotRow> for AnalyticsSnapshot {
    fn from(row: SnapshotRow) -> Self {
        Self {
            id: row.id,
            date: row.date,
            total_sales: row.total_sales,
            sales_return: row.sales_return,
            average_order_value: row.average_order_value,
            monthly_sales: row.monthly_sales.0,
            weekly_sales: row.weekly_sales.0,
            yearly_sales: row.yearly_sales.0,
            total_customers: row.total_customers,
            total_users: row.total_users,
            new_customers: row.new_customers,
            returning_customers: row.returning_customers,
            total_orders: row.total_orders,
            order_status_summary: row.order_status_summary.0,
            top_selling_products: row.top_selling_products.0,
            created_at: row.created_at,
        }
    }
}

const SNAPSHOT_COLUMNS: &str = "id, date, total_sales, sales_return, average_order_value, \
     monthly_sales, weekly_sales, yearly_sales, total_customers, total_users, \
     new_customers, returning_customers, total_orders, order_status_summary, \
     top_selling_products, created_at";

/// Repository for persisted analytics snapshots.
pub struct AnalyticsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalyticsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a computed snapshot.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        snapshot: &AnalyticsSnapshot,
    ) -> Result<AnalyticsSnapshot, RepositoryError> {
        let row = sqlx::query_as::<_, SnapshotRow>(&format!(
            "INSERT INTO shop.analytics_snapshot
                 (id, date, total_sales, sales_return, average_order_value,
                  monthly_sales, weekly_sales, yearly_sales, total_customers,
                  total_users, new_customers, returning_customers, total_orders,
                  order_status_summary, top_selling_products)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {SNAPSHOT_COLUMNS}"
        ))
        .bind(snapshot.id)
        .bind(snapshot.date)
        .bind(snapshot.total_sales)
        .bind(snapshot.sales_return)
        .bind(snapshot.average_order_value)
        .bind(Json(&snapshot.monthly_sales))
        .bind(Json(&snapshot.weekly_sales))
        .bind(Json(&snapshot.yearly_sales))
        .bind(snapshot.total_customers)
        .bind(snapshot.total_users)
        .bind(snapshot.new_customers)
        .bind(snapshot.returning_customers)
        .bind(snapshot.total_orders)
        .bind(Json(&snapshot.order_status_summary))
        .bind(Json(&snapshot.top_selling_products))
        .fetch_one(self.pool)
        .await?;
        Ok(row.into())
    }

    /// Most recent snapshot, if any has been taken.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest(&self) -> Result<Option<AnalyticsSnapshot>, RepositoryError> {
        let row = sqlx::query_as::<_, SnapshotRow>(&format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM shop.analytics_snapshot
             ORDER BY created_at DESC
             LIMIT 1"
        ))
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map(Into::into))
    }
}
