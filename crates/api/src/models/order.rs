//! Orders.
//!
//! Order lines and the shipping address are persisted as JSONB documents on
//! the order row; amounts are always server-computed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use knobsshop_core::{OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId};

use super::user::UserSummary;

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Human-facing sequence: "ORD-0042".
    pub order_number: String,
    pub user_id: UserId,
    /// Populated customer summary, present on admin list responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
    pub items: Vec<OrderItem>,
    pub total_amount: Decimal,
    pub discount_amount: Decimal,
    pub final_amount: Decimal,
    pub coupon_code: Option<String>,
    pub shipping_address: ShippingAddress,
    /// DTDC reference number, set once a consignment is booked.
    pub consignment_number: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    /// Gateway transaction reference (CCAvenue tracking id).
    pub payment_reference: Option<String>,
    pub gst_number: Option<String>,
    pub company_name: Option<String>,
    pub seen_by_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One purchased line. `total` is always `price * quantity`, recomputed on
/// creation regardless of what the client sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    pub price: Decimal,
    pub total: Decimal,
}

/// Shipping destination captured on the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: Option<String>,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub district: String,
    pub pincode: String,
    pub state: String,
}

impl OrderItem {
    /// Recompute the line total from price and quantity.
    #[must_use]
    pub fn with_recomputed_total(mut self) -> Self {
        self.total = self.price * Decimal::from(self.quantity);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_total_is_price_times_quantity() {
        let item = OrderItem {
            product_id: knobsshop_core::ProductId::generate(),
            product_name: "Brass Door Knob".into(),
            quantity: 3,
            size: None,
            color: None,
            sku: None,
            price: Decimal::from(450),
            total: Decimal::ZERO,
        }
        .with_recomputed_total();
        assert_eq!(item.total, Decimal::from(1350));
    }
}
