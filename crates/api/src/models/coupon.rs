//! Discount coupons.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use knobsshop_core::{CouponId, CouponKind, CouponScope, ProductId};

use super::product::Product;

/// A discount coupon. Codes are stored uppercased and unique. `is_active` is
/// recomputed from the start/expiry window whenever the dates change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: CouponId,
    pub code: String,
    pub description: Option<String>,
    pub kind: CouponKind,
    pub value: Decimal,
    pub scope: CouponScope,
    /// Required when `scope` is `Single`.
    pub product_id: Option<ProductId>,
    /// Populated on the offers carousel response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    pub start_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Whether the coupon is redeemable at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.start_date <= now && now <= self.expiry_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon(start: DateTime<Utc>, expiry: DateTime<Utc>, active: bool) -> Coupon {
        Coupon {
            id: CouponId::generate(),
            code: "FLAT50".into(),
            description: None,
            kind: CouponKind::Flat,
            value: Decimal::from(50),
            scope: CouponScope::All,
            product_id: None,
            product: None,
            start_date: start,
            expiry_date: expiry,
            is_active: active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn valid_inside_window() {
        let now = Utc::now();
        let c = coupon(now - Duration::days(1), now + Duration::days(1), true);
        assert!(c.is_valid_at(now));
    }

    #[test]
    fn invalid_when_expired_or_inactive() {
        let now = Utc::now();
        let expired = coupon(now - Duration::days(10), now - Duration::days(1), true);
        assert!(!expired.is_valid_at(now));
        let inactive = coupon(now - Duration::days(1), now + Duration::days(1), false);
        assert!(!inactive.is_valid_at(now));
    }

    #[test]
    fn invalid_before_start() {
        let now = Utc::now();
        let scheduled = coupon(now + Duration::days(1), now + Duration::days(10), true);
        assert!(!scheduled.is_valid_at(now));
    }
}
