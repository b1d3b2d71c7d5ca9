//! Cart lines and shareable cart snapshots.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use knobsshop_core::{CartItemId, ProductId, UserId};

use super::product::Product;

/// One line in a customer's cart. Variant selection (size, color) is captured
/// at add time; adding the same product again bumps the quantity instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub user_id: UserId,
    pub product_id: ProductId,
    /// Populated product, present on list responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    pub quantity: i32,
    pub size: Option<String>,
    pub color: Option<String>,
    pub price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A snapshot of cart lines published under a share token. Expires after a
/// week; the items are frozen at share time, not live cart rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedCart {
    pub token: String,
    pub items: Vec<SharedCartItem>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A frozen line inside a [`SharedCart`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedCartItem {
    pub product_id: ProductId,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}
