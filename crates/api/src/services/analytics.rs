//! Analytics reductions.
//!
//! All functions here are pure passes over already-fetched rows; the route
//! handlers load orders/users/products and hand them in. Cancelled orders are
//! excluded from every sales figure.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use rust_decimal::Decimal;

use knobsshop_core::{OrderStatus, ProductId, SnapshotId};

use crate::models::{
    AnalyticsSnapshot, ChartPoint, Order, OrderStatusSummary, Product, TopSeller, TrendPoint, User,
};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Chart window selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartFilter {
    OneDay,
    OneWeek,
    OneMonth,
    OneYear,
}

impl ChartFilter {
    /// Parse the `filter` query value; unknown values fall back to a year.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "1D" => Self::OneDay,
            "1W" => Self::OneWeek,
            "1M" => Self::OneMonth,
            _ => Self::OneYear,
        }
    }

    /// Window start for `now`.
    #[must_use]
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::OneDay => now - Duration::days(1),
            Self::OneWeek => now - Duration::days(7),
            Self::OneMonth => now - Duration::days(30),
            Self::OneYear => now - Duration::days(365),
        }
    }
}

/// Dashboard range selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeFilter {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RangeFilter {
    /// Parse the `range` query value; unknown values fall back to weekly.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "Daily" => Self::Daily,
            "Monthly" => Self::Monthly,
            "Yearly" => Self::Yearly,
            _ => Self::Weekly,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Yearly => "Yearly",
        }
    }

    /// Window start for `now`.
    #[must_use]
    pub fn start(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Daily => now - Duration::days(1),
            Self::Weekly => now - Duration::days(7),
            Self::Monthly => now - Duration::days(30),
            Self::Yearly => now - Duration::days(365),
        }
    }
}

/// Sum of non-cancelled order totals.
#[must_use]
pub fn total_sales(orders: &[Order]) -> Decimal {
    orders
        .iter()
        .filter(|o| o.status != OrderStatus::Cancelled)
        .map(|o| o.total_amount)
        .sum()
}

/// Order counts by lifecycle state. `success` counts delivered orders.
#[must_use]
pub fn status_summary(orders: &[Order]) -> OrderStatusSummary {
    let count = |status: OrderStatus| {
        orders.iter().filter(|o| o.status == status).count() as i64
    };
    OrderStatusSummary {
        success: count(OrderStatus::Delivered),
        pending: count(OrderStatus::Pending),
        confirmed: count(OrderStatus::Confirmed),
        cancelled: count(OrderStatus::Cancelled),
    }
}

/// Distinct customers among the orders.
#[must_use]
pub fn distinct_customers(orders: &[Order]) -> i64 {
    orders
        .iter()
        .map(|o| o.user_id)
        .collect::<HashSet<_>>()
        .len() as i64
}

/// Jan-Dec sales buckets for the current year view.
#[must_use]
pub fn monthly_sales(orders: &[Order]) -> Vec<TrendPoint> {
    let mut buckets = vec![Decimal::ZERO; 12];
    for order in orders {
        if order.status != OrderStatus::Cancelled {
            let month = order.created_at.month0() as usize;
            buckets[month] += order.total_amount;
        }
    }
    MONTHS
        .iter()
        .zip(buckets)
        .map(|(label, total_sales)| TrendPoint {
            label: (*label).to_owned(),
            total_sales,
        })
        .collect()
}

/// Weekday buckets for the last seven days, ending today.
#[must_use]
pub fn weekly_sales(orders: &[Order], now: DateTime<Utc>) -> Vec<TrendPoint> {
    let window_start = now - Duration::days(7);
    let mut points: Vec<TrendPoint> = (0..7)
        .rev()
        .map(|back| TrendPoint {
            label: (now - Duration::days(back)).format("%a").to_string(),
            total_sales: Decimal::ZERO,
        })
        .collect();

    for order in orders {
        if order.status == OrderStatus::Cancelled
            || order.created_at < window_start
            || order.created_at > now
        {
            continue;
        }
        let label = order.created_at.format("%a").to_string();
        if let Some(point) = points.iter_mut().find(|p| p.label == label) {
            point.total_sales += order.total_amount;
        }
    }
    points
}

/// Per-year sales buckets, ascending by year.
#[must_use]
pub fn yearly_sales(orders: &[Order]) -> Vec<TrendPoint> {
    let mut by_year: HashMap<i32, Decimal> = HashMap::new();
    for order in orders {
        if order.status != OrderStatus::Cancelled {
            *by_year.entry(order.created_at.year()).or_default() += order.total_amount;
        }
    }
    let mut years: Vec<(i32, Decimal)> = by_year.into_iter().collect();
    years.sort_unstable_by_key(|(year, _)| *year);
    years
        .into_iter()
        .map(|(year, total_sales)| TrendPoint {
            label: year.to_string(),
            total_sales,
        })
        .collect()
}

/// Top three products by units sold across non-cancelled orders. The display
/// price falls back from the first variant size to the base price.
#[must_use]
pub fn top_sellers(orders: &[Order], products: &[Product]) -> Vec<TopSeller> {
    let mut sales: HashMap<ProductId, (i64, Decimal)> = HashMap::new();
    for order in orders {
        if order.status == OrderStatus::Cancelled {
            continue;
        }
        for item in &order.items {
            let entry = sales.entry(item.product_id).or_default();
            entry.0 += i64::from(item.quantity);
            entry.1 += item.price * Decimal::from(item.quantity);
        }
    }

    let mut ranked: Vec<(ProductId, (i64, Decimal))> = sales.into_iter().collect();
    ranked.sort_unstable_by(|a, b| b.1.0.cmp(&a.1.0));

    ranked
        .into_iter()
        .filter_map(|(product_id, (sold_qty, revenue))| {
            let product = products.iter().find(|p| p.id == product_id)?;
            Some(TopSeller {
                product_id,
                name: product.name.clone(),
                price: product.display_price(),
                sold_qty,
                revenue,
            })
        })
        .take(3)
        .collect()
}

/// Reduce the full tables into a snapshot.
#[must_use]
pub fn build_snapshot(
    orders: &[Order],
    users: &[User],
    products: &[Product],
    now: DateTime<Utc>,
) -> AnalyticsSnapshot {
    let total = total_sales(orders);
    let sales_return = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Cancelled)
        .map(|o| o.total_amount)
        .sum();

    let total_orders = orders.len() as i64;
    let average_order_value = if total_orders == 0 {
        Decimal::ZERO
    } else {
        total / Decimal::from(total_orders)
    };

    let mut orders_per_user: HashMap<_, i64> = HashMap::new();
    for order in orders {
        *orders_per_user.entry(order.user_id).or_default() += 1;
    }
    let returning_customers = orders_per_user.values().filter(|&&n| n > 1).count() as i64;

    let week_ago = now - Duration::days(7);
    let new_customers = users.iter().filter(|u| u.created_at >= week_ago).count() as i64;

    AnalyticsSnapshot {
        id: SnapshotId::generate(),
        date: now,
        total_sales: total,
        sales_return,
        average_order_value,
        monthly_sales: monthly_sales(orders),
        weekly_sales: weekly_sales(orders, now),
        yearly_sales: yearly_sales(orders),
        total_customers: distinct_customers(orders),
        total_users: users.len() as i64,
        new_customers,
        returning_customers,
        total_orders,
        order_status_summary: status_summary(orders),
        top_selling_products: top_sellers(orders, products),
        created_at: now,
    }
}

/// Delivered-order sales grouped by hour, weekday, or month label, in first
/// occurrence order.
#[must_use]
pub fn chart_points(orders: &[Order], filter: ChartFilter) -> Vec<ChartPoint> {
    let mut points: Vec<ChartPoint> = Vec::new();
    for order in orders {
        let label = match filter {
            ChartFilter::OneDay => format!("{:02}:00", order.created_at.hour()),
            ChartFilter::OneWeek => order.created_at.format("%a").to_string(),
            ChartFilter::OneMonth | ChartFilter::OneYear => {
                MONTHS[order.created_at.month0() as usize].to_owned()
            }
        };

        let sales = if order.status == OrderStatus::Delivered {
            order.total_amount
        } else {
            Decimal::ZERO
        };

        match points.iter_mut().find(|p| p.label == label) {
            Some(point) => point.sales += sales,
            None => points.push(ChartPoint { label, sales }),
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use knobsshop_core::{OrderId, PaymentMethod, PaymentStatus, UserId};

    use crate::models::{OrderItem, ShippingAddress};

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: Some("Asha".into()),
            phone: "9000000000".into(),
            street: "12 MG Road".into(),
            city: "Kochi".into(),
            district: "Ernakulam".into(),
            pincode: "682001".into(),
            state: "Kerala".into(),
        }
    }

    fn order(
        user_id: UserId,
        total: i64,
        status: OrderStatus,
        created_at: DateTime<Utc>,
    ) -> Order {
        Order {
            id: OrderId::generate(),
            order_number: "ORD-0001".into(),
            user_id,
            user: None,
            items: vec![],
            total_amount: Decimal::from(total),
            discount_amount: Decimal::ZERO,
            final_amount: Decimal::from(total),
            coupon_code: None,
            shipping_address: address(),
            consignment_number: None,
            status,
            payment_status: PaymentStatus::Pending,
            payment_method: PaymentMethod::Cod,
            payment_reference: None,
            gst_number: None,
            company_name: None,
            seen_by_admin: false,
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn total_sales_excludes_cancelled() {
        let user = UserId::generate();
        let now = Utc::now();
        let orders = vec![
            order(user, 100, OrderStatus::Delivered, now),
            order(user, 50, OrderStatus::Cancelled, now),
            order(user, 25, OrderStatus::Pending, now),
        ];
        assert_eq!(total_sales(&orders), Decimal::from(125));
    }

    #[test]
    fn status_summary_counts_delivered_as_success() {
        let user = UserId::generate();
        let now = Utc::now();
        let orders = vec![
            order(user, 1, OrderStatus::Delivered, now),
            order(user, 1, OrderStatus::Delivered, now),
            order(user, 1, OrderStatus::Cancelled, now),
        ];
        let summary = status_summary(&orders);
        assert_eq!(summary.success, 2);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.pending, 0);
    }

    #[test]
    fn weekly_sales_has_seven_buckets_ending_today() {
        let now = Utc::now();
        let points = weekly_sales(&[], now);
        assert_eq!(points.len(), 7);
        assert_eq!(points[6].label, now.format("%a").to_string());
    }

    #[test]
    fn top_sellers_ranks_by_quantity() {
        let user = UserId::generate();
        let now = Utc::now();
        let a = ProductId::generate();
        let b = ProductId::generate();

        let mut o = order(user, 500, OrderStatus::Delivered, now);
        o.items = vec![
            OrderItem {
                product_id: a,
                product_name: "Knob A".into(),
                quantity: 5,
                size: None,
                color: None,
                sku: None,
                price: Decimal::from(100),
                total: Decimal::from(500),
            },
            OrderItem {
                product_id: b,
                product_name: "Knob B".into(),
                quantity: 2,
                size: None,
                color: None,
                sku: None,
                price: Decimal::from(300),
                total: Decimal::from(600),
            },
        ];

        let products: Vec<Product> = Vec::new();
        // Products missing from the catalog are skipped.
        assert!(top_sellers(&[o.clone()], &products).is_empty());

        let mut cancelled = o.clone();
        cancelled.status = OrderStatus::Cancelled;
        assert!(top_sellers(&[cancelled], &products).is_empty());
    }

    #[test]
    fn snapshot_average_order_value() {
        let user = UserId::generate();
        let now = Utc::now();
        let orders = vec![
            order(user, 100, OrderStatus::Delivered, now),
            order(user, 300, OrderStatus::Confirmed, now),
        ];
        let snapshot = build_snapshot(&orders, &[], &[], now);
        assert_eq!(snapshot.average_order_value, Decimal::from(200));
        assert_eq!(snapshot.total_customers, 1);
        assert_eq!(snapshot.returning_customers, 1);
    }

    #[test]
    fn chart_points_only_sum_delivered() {
        let user = UserId::generate();
        let now = Utc::now();
        let orders = vec![
            order(user, 100, OrderStatus::Delivered, now),
            order(user, 999, OrderStatus::Pending, now),
        ];
        let points = chart_points(&orders, ChartFilter::OneYear);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].sales, Decimal::from(100));
    }

    #[test]
    fn chart_filter_parse_defaults_to_year() {
        assert_eq!(ChartFilter::parse("1D"), ChartFilter::OneDay);
        assert_eq!(ChartFilter::parse("nonsense"), ChartFilter::OneYear);
    }
}
