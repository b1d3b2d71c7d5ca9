//! Coupon handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use knobsshop_core::{CouponId, CouponKind, CouponScope, ProductId, UserId};

use crate::db::{CouponRepository, OrderRepository, ProductRepository, UserRepository,
    coupons::CouponInput};
use crate::error::AppError;
use crate::middleware::RequireUser;
use crate::models::Coupon;
use crate::state::AppState;

/// Welcome code limited to a customer's first order.
const WELCOME_CODE: &str = "KNOBSSHOP25";

#[derive(Debug, Deserialize)]
pub struct CouponBody {
    pub code: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: CouponKind,
    pub value: Decimal,
    #[serde(default)]
    pub scope: CouponScope,
    pub product_id: Option<ProductId>,
    pub start_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    /// Creates the coupon inactive; it activates once the window opens.
    #[serde(default)]
    pub scheduled: bool,
}

#[derive(Debug, Deserialize)]
pub struct ValidateBody {
    pub user_id: UserId,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkUsedBody {
    pub code: String,
}

struct CouponFields {
    code: String,
    start_date: DateTime<Utc>,
    expiry_date: DateTime<Utc>,
    is_active: bool,
}

fn validate_body(body: &CouponBody) -> Result<CouponFields, AppError> {
    let code = body.code.trim().to_uppercase();
    if code.is_empty() {
        return Err(AppError::bad_request("Coupon code is required"));
    }
    let (Some(start_date), Some(expiry_date)) = (body.start_date, body.expiry_date) else {
        return Err(AppError::bad_request("Start and expiry dates are required"));
    };
    if expiry_date < start_date {
        return Err(AppError::bad_request("Expiry date is before the start date"));
    }
    if body.scope == CouponScope::Single && body.product_id.is_none() {
        return Err(AppError::bad_request(
            "Single-product coupons require a product_id",
        ));
    }

    let now = Utc::now();
    let in_window = start_date <= now && now <= expiry_date;
    Ok(CouponFields {
        code,
        start_date,
        expiry_date,
        is_active: in_window && !body.scheduled,
    })
}

/// `POST /api/coupons`
pub async fn create(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Json(body): Json<CouponBody>,
) -> Result<(StatusCode, Json<Coupon>), AppError> {
    let fields = validate_body(&body)?;
    let coupon = CouponRepository::new(state.pool())
        .create(CouponInput {
            code: &fields.code,
            description: body.description.as_deref(),
            kind: body.kind,
            value: body.value,
            scope: body.scope,
            product_id: body.product_id,
            start_date: fields.start_date,
            expiry_date: fields.expiry_date,
            is_active: fields.is_active,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(coupon)))
}

/// `PUT /api/coupons/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(id): Path<CouponId>,
    Json(body): Json<CouponBody>,
) -> Result<Json<Coupon>, AppError> {
    let fields = validate_body(&body)?;
    let coupon = CouponRepository::new(state.pool())
        .update(
            id,
            CouponInput {
                code: &fields.code,
                description: body.description.as_deref(),
                kind: body.kind,
                value: body.value,
                scope: body.scope,
                product_id: body.product_id,
                start_date: fields.start_date,
                expiry_date: fields.expiry_date,
                is_active: fields.is_active,
            },
        )
        .await?;
    Ok(Json(coupon))
}

/// `DELETE /api/coupons/{id}`
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(id): Path<CouponId>,
) -> Result<Json<serde_json::Value>, AppError> {
    CouponRepository::new(state.pool()).delete(id).await?;
    Ok(Json(json!({ "message": "Coupon deleted" })))
}

/// `GET /api/coupons`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Coupon>>, AppError> {
    let coupons = CouponRepository::new(state.pool()).list_all().await?;
    Ok(Json(coupons))
}

/// `POST /api/coupons/validate`
pub async fn validate(
    State(state): State<AppState>,
    Json(body): Json<ValidateBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let code = body.code.trim().to_uppercase();
    let coupon = CouponRepository::new(state.pool())
        .get_by_code(&code)
        .await?
        .ok_or_else(|| AppError::bad_request("Invalid coupon code"))?;

    let user = UserRepository::new(state.pool())
        .get_by_id(body.user_id)
        .await?
        .ok_or_else(|| AppError::bad_request("Unknown user"))?;
    if user.used_coupons.contains(&code) {
        return Err(AppError::bad_request("Coupon has already been used"));
    }

    if code == WELCOME_CODE {
        let placed = OrderRepository::new(state.pool())
            .count_by_user(body.user_id)
            .await?;
        if placed > 0 {
            return Err(AppError::bad_request(
                "This coupon is only valid on your first order",
            ));
        }
    }

    // Scope is checked against the actual items at order time; validation
    // only answers "can this user redeem this code right now".
    if !coupon.is_valid_at(Utc::now()) {
        return Err(AppError::bad_request("Coupon is expired or not active"));
    }

    Ok(Json(json!({
        "discount": coupon.value,
        "type": coupon.kind,
    })))
}

/// `POST /api/coupons/mark-used`
pub async fn mark_used(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(body): Json<MarkUsedBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let code = body.code.trim().to_uppercase();
    UserRepository::new(state.pool())
        .mark_coupon_used(user_id, &code)
        .await?;
    Ok(Json(json!({ "message": "Coupon marked as used" })))
}

/// `GET /api/coupons/available`
pub async fn available(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
) -> Result<Json<Vec<Coupon>>, AppError> {
    let user = UserRepository::new(state.pool())
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    let coupons = CouponRepository::new(state.pool())
        .list_available(&user.used_coupons)
        .await?;
    Ok(Json(coupons))
}

/// `GET /api/coupons/offers`
pub async fn offers(State(state): State<AppState>) -> Result<Json<Vec<Coupon>>, AppError> {
    let mut coupons = CouponRepository::new(state.pool()).list_offers().await?;

    let ids: Vec<ProductId> = coupons.iter().filter_map(|c| c.product_id).collect();
    let products = ProductRepository::new(state.pool()).get_by_ids(&ids).await?;
    for coupon in &mut coupons {
        coupon.product = coupon
            .product_id
            .and_then(|id| products.iter().find(|p| p.id == id).cloned());
    }
    Ok(Json(coupons))
}
