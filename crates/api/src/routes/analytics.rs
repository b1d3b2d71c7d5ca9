//! Analytics handlers.
//!
//! Snapshots persist a full reduction; the `latest` and `chart` endpoints
//! compute live over the requested window instead of reading a snapshot.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;

use crate::db::{AnalyticsRepository, OrderRepository, ProductRepository, UserRepository};
use crate::error::AppError;
use crate::middleware::RequireUser;
use crate::models::{AnalyticsSnapshot, ChartPoint, Order, RangeSummary};
use crate::services::analytics::{self, ChartFilter, RangeFilter};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub range: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub filter: Option<String>,
}

/// `POST /api/analytics/snapshots`
pub async fn take_snapshot(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
) -> Result<(StatusCode, Json<AnalyticsSnapshot>), AppError> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    let users = UserRepository::new(state.pool()).list_all().await?;
    let products = ProductRepository::new(state.pool()).list_all().await?;

    let snapshot = analytics::build_snapshot(&orders, &users, &products, Utc::now());
    let stored = AnalyticsRepository::new(state.pool()).insert(&snapshot).await?;
    tracing::info!(snapshot_id = %stored.id, "analytics snapshot taken");
    Ok((StatusCode::CREATED, Json(stored)))
}

/// `GET /api/analytics/latest?range=`
pub async fn latest(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> Result<Json<RangeSummary>, AppError> {
    let range = RangeFilter::parse(query.range.as_deref().unwrap_or("Weekly"));
    let now = Utc::now();
    let start = range.start(now);

    let orders = OrderRepository::new(state.pool()).list_all().await?;
    let users = UserRepository::new(state.pool()).list_all().await?;

    let windowed: Vec<Order> = orders
        .into_iter()
        .filter(|o| o.created_at >= start && o.created_at <= now)
        .collect();
    let new_customers = users.iter().filter(|u| u.created_at >= start).count() as i64;

    Ok(Json(RangeSummary {
        range: range.label().to_owned(),
        total_sales: analytics::total_sales(&windowed),
        total_orders: windowed.len() as i64,
        total_customers: analytics::distinct_customers(&windowed),
        total_users: users.len() as i64,
        new_customers,
        order_status_summary: analytics::status_summary(&windowed),
    }))
}

/// `GET /api/analytics/chart?filter=`
pub async fn chart(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<Vec<ChartPoint>>, AppError> {
    let filter = ChartFilter::parse(query.filter.as_deref().unwrap_or("1Y"));
    let now = Utc::now();
    let start = filter.start(now);

    let orders = OrderRepository::new(state.pool()).list_all().await?;
    let windowed: Vec<Order> = orders
        .into_iter()
        .filter(|o| o.created_at >= start && o.created_at <= now)
        .collect();
    Ok(Json(analytics::chart_points(&windowed, filter)))
}
