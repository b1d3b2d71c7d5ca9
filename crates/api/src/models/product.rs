//! Catalog products.
//!
//! A product is a scalar row (name, price, stock, status) plus a nested
//! document of merchandising content - feature blocks, tech specs, color
//! variants with per-size pricing - persisted as one JSONB column.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use knobsshop_core::{CategoryId, ProductId, ProductStatus, UserId};

use super::category::Category;

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub compare_price: Option<Decimal>,
    pub stock: i32,
    /// Merchant-facing SKU (shown as `productId` in the original catalog).
    pub sku: Option<String>,
    pub status: ProductStatus,
    pub brand: Option<String>,
    pub category_id: Option<CategoryId>,
    /// Populated category, present on detail/list responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default)]
    pub images: Vec<String>,
    pub video: Option<String>,
    #[serde(default)]
    pub content: ProductContent,
    /// Recomputed on every review write.
    pub average_rating: Decimal,
    pub review_count: i32,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Nested merchandising content, stored as a single JSONB document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductContent {
    pub features: Vec<Feature>,
    pub key_features: Vec<KeyFeature>,
    pub tech_spec: Vec<TechSpec>,
    pub variants: Vec<Variant>,
    pub discount: Option<DiscountWindow>,
    pub dimensions: Option<Dimensions>,
    pub installation: Option<Installation>,
    /// Brochure PDF URL, when the product ships with one.
    pub brochure: Option<String>,
}

/// A marketing feature block (title, copy, illustration).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// A compact icon+title highlight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyFeature {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// One row of the technical specification table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechSpec {
    pub title: String,
    pub value: String,
}

/// A color/finish variant with per-size pricing and stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub title: String,
    pub value: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub sizes: Vec<VariantSize>,
}

/// A size option within a variant, e.g. "4x4".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantSize {
    pub label: String,
    /// Price for this size (absolute, not an adjustment).
    pub price: Decimal,
    pub stock: i32,
}

/// A scheduled product-level discount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountWindow {
    /// "percentage" or "fixed".
    pub kind: String,
    pub value: Decimal,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_active: bool,
}

/// Shipping dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dimensions {
    pub weight: Option<Decimal>,
    pub height: Option<Decimal>,
    pub width: Option<Decimal>,
    pub length: Option<Decimal>,
}

/// Installation guide (video + rich text).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Installation {
    pub video_url: Option<String>,
    pub content: Option<String>,
}

impl Product {
    /// Display price used by top-seller analytics: first variant's first size
    /// when variants exist, the base price otherwise.
    #[must_use]
    pub fn display_price(&self) -> Decimal {
        self.content
            .variants
            .first()
            .and_then(|v| v.sizes.first().map(|s| s.price).or(v.price))
            .unwrap_or(self.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(v: i64) -> Decimal {
        Decimal::from(v)
    }

    fn bare_product(price: Decimal) -> Product {
        Product {
            id: knobsshop_core::ProductId::generate(),
            name: "Brass Door Knob".into(),
            description: None,
            price,
            compare_price: None,
            stock: 10,
            sku: Some("KNB-001".into()),
            status: knobsshop_core::ProductStatus::Active,
            brand: None,
            category_id: None,
            category: None,
            images: vec![],
            video: None,
            content: ProductContent::default(),
            average_rating: Decimal::ZERO,
            review_count: 0,
            created_by: knobsshop_core::UserId::generate(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn display_price_falls_back_to_base_price() {
        let product = bare_product(dec(499));
        assert_eq!(product.display_price(), dec(499));
    }

    #[test]
    fn display_price_prefers_first_variant_size() {
        let mut product = bare_product(dec(499));
        product.content.variants = vec![Variant {
            title: "Finish".into(),
            value: "Matte Black".into(),
            images: vec![],
            price: Some(dec(525)),
            sizes: vec![VariantSize {
                label: "4x4".into(),
                price: dec(550),
                stock: 3,
            }],
        }];
        assert_eq!(product.display_price(), dec(550));
    }

    #[test]
    fn content_deserializes_from_empty_object() {
        let content: ProductContent = serde_json::from_str("{}").expect("defaults");
        assert!(content.variants.is_empty());
        assert!(content.discount.is_none());
    }
}
