//! Pure pricing logic shared by coupon validation and order creation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use knobsshop_core::{CouponKind, CouponScope, ProductId};

use crate::models::Coupon;

/// Why a coupon cannot be applied.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponRejection {
    /// Inactive, not yet started, or past expiry.
    #[error("coupon is expired or not active")]
    Expired,

    /// Single-product coupon and the order doesn't contain that product.
    #[error("coupon does not apply to the items in this order")]
    WrongProduct,

    /// The customer already redeemed this code.
    #[error("coupon has already been used")]
    AlreadyUsed,
}

/// Compute the discount a coupon grants on an order.
///
/// `product_ids` are the products in the order; a single-product coupon only
/// applies when its product is among them. The discount never exceeds the
/// subtotal.
///
/// # Errors
///
/// Returns a [`CouponRejection`] naming why the coupon doesn't apply.
pub fn apply_discount(
    coupon: &Coupon,
    subtotal: Decimal,
    product_ids: &[ProductId],
    now: DateTime<Utc>,
) -> Result<Decimal, CouponRejection> {
    if !coupon.is_valid_at(now) {
        return Err(CouponRejection::Expired);
    }

    if coupon.scope == CouponScope::Single {
        let target = coupon.product_id.ok_or(CouponRejection::WrongProduct)?;
        if !product_ids.contains(&target) {
            return Err(CouponRejection::WrongProduct);
        }
    }

    let discount = match coupon.kind {
        CouponKind::Flat => coupon.value,
        CouponKind::Percentage => subtotal * coupon.value / Decimal::from(100),
    };

    Ok(discount.min(subtotal).max(Decimal::ZERO))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use knobsshop_core::CouponId;

    fn coupon(kind: CouponKind, value: i64, scope: CouponScope) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: CouponId::generate(),
            code: "TEST".into(),
            description: None,
            kind,
            value: Decimal::from(value),
            scope,
            product_id: None,
            product: None,
            start_date: now - Duration::days(1),
            expiry_date: now + Duration::days(1),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn flat_discount_is_face_value() {
        let c = coupon(CouponKind::Flat, 100, CouponScope::All);
        let discount = apply_discount(&c, Decimal::from(500), &[], Utc::now()).expect("applies");
        assert_eq!(discount, Decimal::from(100));
    }

    #[test]
    fn percentage_discount_scales_with_subtotal() {
        let c = coupon(CouponKind::Percentage, 25, CouponScope::All);
        let discount = apply_discount(&c, Decimal::from(800), &[], Utc::now()).expect("applies");
        assert_eq!(discount, Decimal::from(200));
    }

    #[test]
    fn flat_discount_clamped_to_subtotal() {
        let c = coupon(CouponKind::Flat, 1000, CouponScope::All);
        let discount = apply_discount(&c, Decimal::from(300), &[], Utc::now()).expect("applies");
        assert_eq!(discount, Decimal::from(300));
    }

    #[test]
    fn expired_coupon_rejected() {
        let mut c = coupon(CouponKind::Flat, 50, CouponScope::All);
        c.expiry_date = Utc::now() - Duration::hours(1);
        assert_eq!(
            apply_discount(&c, Decimal::from(500), &[], Utc::now()),
            Err(CouponRejection::Expired)
        );
    }

    #[test]
    fn single_product_coupon_needs_its_product() {
        let target = ProductId::generate();
        let mut c = coupon(CouponKind::Flat, 50, CouponScope::Single);
        c.product_id = Some(target);

        let other = ProductId::generate();
        assert_eq!(
            apply_discount(&c, Decimal::from(500), &[other], Utc::now()),
            Err(CouponRejection::WrongProduct)
        );

        let discount =
            apply_discount(&c, Decimal::from(500), &[other, target], Utc::now()).expect("applies");
        assert_eq!(discount, Decimal::from(50));
    }

    #[test]
    fn single_product_coupon_without_target_is_rejected() {
        let c = coupon(CouponKind::Flat, 50, CouponScope::Single);
        assert_eq!(
            apply_discount(&c, Decimal::from(500), &[ProductId::generate()], Utc::now()),
            Err(CouponRejection::WrongProduct)
        );
    }
}
