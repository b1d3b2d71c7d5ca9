//! Status enums for orders, payments, products, coupons, and content.
//!
//! All enums serialize as snake_case strings and are stored in TEXT columns.
//! `Display`/`FromStr` use the same representation as serde so database rows,
//! JSON bodies, and log output agree.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing a status string fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind} value: {value}")]
pub struct ParseStatusError {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The offending input.
    pub value: String,
}

macro_rules! impl_status_str {
    ($ty:ident, $kind:literal, { $($variant:ident => $s:literal),+ $(,)? }) => {
        impl $ty {
            /// The canonical snake_case string for this value.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseStatusError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant),)+
                    other => Err(ParseStatusError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
    Returned,
}

impl_status_str!(OrderStatus, "order status", {
    Pending => "pending",
    Confirmed => "confirmed",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
    Returned => "returned",
});

/// Payment state as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Success,
    Failure,
    Refund,
}

impl_status_str!(PaymentStatus, "payment status", {
    Pending => "pending",
    Success => "success",
    Failure => "failure",
    Refund => "refund",
});

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cod,
    Upi,
    Card,
    Netbanking,
    Online,
}

impl_status_str!(PaymentMethod, "payment method", {
    Cod => "cod",
    Upi => "upi",
    Card => "card",
    Netbanking => "netbanking",
    Online => "online",
});

/// Product visibility status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
    OutOfStock,
}

impl_status_str!(ProductStatus, "product status", {
    Active => "active",
    Inactive => "inactive",
    OutOfStock => "out_of_stock",
});

/// Coupon discount kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponKind {
    Percentage,
    Flat,
}

impl_status_str!(CouponKind, "coupon kind", {
    Percentage => "percentage",
    Flat => "flat",
});

/// Which products a coupon applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CouponScope {
    #[default]
    All,
    Single,
}

impl_status_str!(CouponScope, "coupon scope", {
    All => "all",
    Single => "single",
});

/// Publication state of a policy version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    #[default]
    Draft,
    Published,
}

impl_status_str!(PolicyStatus, "policy status", {
    Draft => "draft",
    Published => "published",
});

/// Policy documents the storefront serves. Titles are a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyTitle {
    Terms,
    Warranty,
    Shipping,
}

impl_status_str!(PolicyTitle, "policy title", {
    Terms => "terms",
    Warranty => "warranty",
    Shipping => "shipping",
});

/// Whether an ad submission carries one creative or a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdMode {
    Single,
    Multiple,
}

impl_status_str!(AdMode, "ad mode", {
    Single => "single",
    Multiple => "multiple",
});

/// Where on the page an ad renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdPlacement {
    #[default]
    Banner,
    BottomStrip,
    MiddleCarousel,
    Slider,
    Sidebar,
    PopUp,
}

impl_status_str!(AdPlacement, "ad placement", {
    Banner => "banner",
    BottomStrip => "bottom_strip",
    MiddleCarousel => "middle_carousel",
    Slider => "slider",
    Sidebar => "sidebar",
    PopUp => "pop_up",
});

/// Storefront page (or themed section) an ad is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdPage {
    #[default]
    HomePage,
    CategoryPage,
    ProductPage,
    LivingRoom,
    DigitalSafeLocker,
    DiningRoom,
    Kitchen,
}

impl_status_str!(AdPage, "ad page", {
    HomePage => "home_page",
    CategoryPage => "category_page",
    ProductPage => "product_page",
    LivingRoom => "living_room",
    DigitalSafeLocker => "digital_safe_locker",
    DiningRoom => "dining_room",
    Kitchen => "kitchen",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_serde() {
        let status = OrderStatus::Delivered;
        let json = serde_json::to_string(&status).expect("serialize");
        assert_eq!(json, format!("\"{status}\""));
    }

    #[test]
    fn parse_round_trips_every_order_status() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
            OrderStatus::Returned,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
    }

    #[test]
    fn unknown_value_is_rejected_with_context() {
        let err = "teleported".parse::<OrderStatus>().expect_err("must fail");
        assert_eq!(err.kind, "order status");
        assert_eq!(err.value, "teleported");
    }

    #[test]
    fn payment_method_defaults_to_cod() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cod);
    }
}
