//! Order handlers.
//!
//! Order creation is the one place money math happens: line totals and the
//! subtotal are recomputed server-side and the coupon is re-validated, so a
//! tampered client total never reaches the database.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
};
use chrono::Utc;
use futures::Stream;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;

use knobsshop_core::{OrderId, OrderStatus, PaymentMethod, PaymentStatus, UserId};

use crate::db::{
    AddressRepository, CouponRepository, OrderRepository, UserRepository,
    addresses::AddressInput,
    orders::{NewOrder, OrderPatch},
};
use crate::error::AppError;
use crate::events::OrderNotification;
use crate::middleware::RequireUser;
use crate::models::{Order, OrderItem, ShippingAddress};
use crate::services::pricing::{self, CouponRejection};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderBody {
    pub user_id: UserId,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub gst_number: Option<String>,
    pub company_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserOrdersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Paginated slice of a user's orders.
#[derive(Debug, serde::Serialize)]
pub struct UserOrdersResponse {
    pub orders: Vec<Order>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

fn normalize(part: &str) -> String {
    part.trim().to_lowercase()
}

/// Field-by-field comparison ignoring case and surrounding whitespace.
fn same_address(a: &ShippingAddress, b: &crate::models::Address) -> bool {
    normalize(&a.phone) == normalize(&b.phone)
        && normalize(&a.street) == normalize(&b.street)
        && normalize(&a.city) == normalize(&b.city)
        && normalize(&a.district) == normalize(&b.district)
        && normalize(&a.pincode) == normalize(&b.pincode)
        && normalize(&a.state) == normalize(&b.state)
}

fn rejection_message(rejection: &CouponRejection) -> String {
    match rejection {
        CouponRejection::Expired => "Coupon is expired or not active".to_string(),
        CouponRejection::WrongProduct => {
            "Coupon does not apply to the items in this order".to_string()
        }
        CouponRejection::AlreadyUsed => "Coupon has already been used".to_string(),
    }
}

/// `POST /api/orders`
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderBody>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    if body.items.is_empty() {
        return Err(AppError::bad_request("Order must contain at least one item"));
    }

    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(body.user_id)
        .await?
        .ok_or_else(|| AppError::bad_request("Unknown user"))?;

    // Server-side money math; the client's totals are ignored.
    let items: Vec<OrderItem> = body
        .items
        .into_iter()
        .map(OrderItem::with_recomputed_total)
        .collect();
    let subtotal: Decimal = items.iter().map(|i| i.total).sum();

    let mut discount = Decimal::ZERO;
    let mut coupon_code = None;
    if let Some(code) = body.coupon_code.as_deref().filter(|c| !c.is_empty()) {
        let code = code.to_uppercase();
        let coupon = CouponRepository::new(state.pool())
            .get_by_code(&code)
            .await?
            .ok_or_else(|| AppError::bad_request("Invalid coupon code"))?;
        if user.used_coupons.contains(&code) {
            return Err(AppError::bad_request(rejection_message(
                &CouponRejection::AlreadyUsed,
            )));
        }
        let product_ids: Vec<_> = items.iter().map(|i| i.product_id).collect();
        discount = pricing::apply_discount(&coupon, subtotal, &product_ids, Utc::now())
            .map_err(|r| AppError::bad_request(rejection_message(&r)))?;
        coupon_code = Some(code);
    }

    let orders = OrderRepository::new(state.pool());
    let order_number = orders.next_order_number().await?;
    let order = orders
        .create(
            &order_number,
            NewOrder {
                user_id: body.user_id,
                items: &items,
                total_amount: subtotal,
                discount_amount: discount,
                final_amount: subtotal - discount,
                coupon_code: coupon_code.as_deref(),
                shipping_address: &body.shipping_address,
                payment_method: body.payment_method,
                gst_number: body.gst_number.as_deref(),
                company_name: body.company_name.as_deref(),
            },
        )
        .await?;

    if let Some(gst) = body.gst_number.as_deref() {
        users
            .set_gst_details(
                body.user_id,
                gst,
                body.company_name.as_deref().unwrap_or_default(),
            )
            .await?;
    }

    // Keep the user's default address in sync with where they actually ship.
    let addresses = AddressRepository::new(state.pool());
    let current_default = addresses.get_default(body.user_id).await?;
    let differs = current_default
        .as_ref()
        .is_none_or(|d| !same_address(&body.shipping_address, d));
    if differs {
        addresses
            .create(
                body.user_id,
                AddressInput {
                    name: body.shipping_address.name.as_deref(),
                    phone: &body.shipping_address.phone,
                    street: &body.shipping_address.street,
                    city: &body.shipping_address.city,
                    district: &body.shipping_address.district,
                    pincode: &body.shipping_address.pincode,
                    state: &body.shipping_address.state,
                    is_default: true,
                },
            )
            .await?;
    }

    state.events().publish(OrderNotification {
        order_id: order.id,
        order_number: order.order_number.clone(),
        customer_name: user.name.clone(),
        final_amount: order.final_amount,
    });

    tracing::info!(order_number = %order.order_number, "order placed");
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Order>>, AppError> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(Json(orders))
}

/// `GET /api/orders/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, AppError> {
    let order = OrderRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;
    Ok(Json(order))
}

const PATCH_FIELDS: [&str; 4] = ["status", "payment_status", "payment_reference", "total_amount"];

fn parse_patch(body: &serde_json::Map<String, serde_json::Value>) -> Result<OrderPatch, AppError> {
    let unknown: Vec<&str> = body
        .keys()
        .map(String::as_str)
        .filter(|k| !PATCH_FIELDS.contains(k))
        .collect();
    if !unknown.is_empty() {
        return Err(AppError::bad_request(format!(
            "Unknown fields: {}",
            unknown.join(", ")
        )));
    }

    let mut patch = OrderPatch::default();
    if let Some(value) = body.get("status") {
        let status: OrderStatus = serde_json::from_value(value.clone())
            .map_err(|_| AppError::bad_request("Invalid status"))?;
        patch.status = Some(status);
    }
    if let Some(value) = body.get("payment_status") {
        let status: PaymentStatus = serde_json::from_value(value.clone())
            .map_err(|_| AppError::bad_request("Invalid payment_status"))?;
        patch.payment_status = Some(status);
    }
    if let Some(value) = body.get("payment_reference") {
        let reference: String = serde_json::from_value(value.clone())
            .map_err(|_| AppError::bad_request("Invalid payment_reference"))?;
        patch.payment_reference = Some(reference);
    }
    if let Some(value) = body.get("total_amount") {
        let amount: Decimal = serde_json::from_value(value.clone())
            .map_err(|_| AppError::bad_request("Invalid total_amount"))?;
        patch.total_amount = Some(amount);
    }
    Ok(patch)
}

/// `PATCH /api/orders/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<serde_json::Map<String, serde_json::Value>>,
) -> Result<Json<Order>, AppError> {
    let patch = parse_patch(&body)?;
    let order = OrderRepository::new(state.pool())
        .apply_patch(id, &patch)
        .await?;
    Ok(Json(order))
}

/// `DELETE /api/orders/{id}`
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<serde_json::Value>, AppError> {
    OrderRepository::new(state.pool()).delete(id).await?;
    Ok(Json(json!({ "message": "Order deleted" })))
}

/// `GET /api/orders/user/{user_id}?page=&limit=`
pub async fn by_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    Query(query): Query<UserOrdersQuery>,
) -> Result<Json<UserOrdersResponse>, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(5).clamp(1, 100);
    let (orders, total) = OrderRepository::new(state.pool())
        .list_by_user(user_id, page, limit)
        .await?;
    Ok(Json(UserOrdersResponse {
        orders,
        total,
        page,
        limit,
    }))
}

/// `GET /api/orders/notifications`
pub async fn notifications(State(state): State<AppState>) -> Result<Json<Vec<Order>>, AppError> {
    let orders = OrderRepository::new(state.pool()).list_unseen().await?;
    Ok(Json(orders))
}

/// `PATCH /api/orders/{id}/seen`
pub async fn mark_seen(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(id): Path<OrderId>,
) -> Result<Json<serde_json::Value>, AppError> {
    OrderRepository::new(state.pool()).mark_seen(id).await?;
    Ok(Json(json!({ "message": "Marked as seen" })))
}

/// `GET /api/orders/events`
///
/// Slow consumers that lag behind the broadcast buffer skip the missed
/// notifications and keep receiving.
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let mut rx = state.events().subscribe();
    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(notification) => {
                    yield Event::default().event("new-order").json_data(&notification);
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}
