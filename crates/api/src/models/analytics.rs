//! Analytics snapshots and live range summaries.
//!
//! A snapshot is a point-in-time reduction over the full order/user/product
//! tables; trend arrays and top-seller lists are stored as JSONB on the row.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use knobsshop_core::{ProductId, SnapshotId};

/// A persisted analytics snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub id: SnapshotId,
    pub date: DateTime<Utc>,
    /// Sales across non-cancelled orders.
    pub total_sales: Decimal,
    /// Value of cancelled/refunded orders.
    pub sales_return: Decimal,
    pub average_order_value: Decimal,
    pub monthly_sales: Vec<TrendPoint>,
    pub weekly_sales: Vec<TrendPoint>,
    pub yearly_sales: Vec<TrendPoint>,
    pub total_customers: i64,
    pub total_users: i64,
    /// Customers whose first order landed in the last 7 days.
    pub new_customers: i64,
    pub returning_customers: i64,
    pub total_orders: i64,
    pub order_status_summary: OrderStatusSummary,
    pub top_selling_products: Vec<TopSeller>,
    pub created_at: DateTime<Utc>,
}

/// One labelled bucket in a sales trend ("Jan", "Mon", "2025").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub label: String,
    pub total_sales: Decimal,
}

/// Order counts by lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatusSummary {
    pub success: i64,
    pub pending: i64,
    pub confirmed: i64,
    pub cancelled: i64,
}

/// A product ranked by units sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopSeller {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub sold_qty: i64,
    pub revenue: Decimal,
}

/// Live totals for a dashboard range (Daily/Weekly/Monthly/Yearly).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSummary {
    pub range: String,
    pub total_sales: Decimal,
    pub total_orders: i64,
    pub total_customers: i64,
    pub total_users: i64,
    pub new_customers: i64,
    pub order_status_summary: OrderStatusSummary,
}

/// One point of the sales chart (hour/weekday/month bucket).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub sales: Decimal,
}
