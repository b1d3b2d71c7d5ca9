//! CCAvenue payment handlers.
//!
//! The hosted-checkout handshake: `initiate` returns the encrypted billing
//! form, the gateway calls back on `/response` (or `/cancelled`), and the
//! handler records the verdict and redirects the browser to the storefront.

use axum::{
    Form, Json,
    extract::{Path, Query, State},
    response::Redirect,
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;

use knobsshop_core::{OrderStatus, PaymentStatus};

use crate::db::OrderRepository;
use crate::error::AppError;
use crate::middleware::RequireUser;
use crate::services::ccavenue::{BillingDetails, CcavenueClient};
use crate::state::AppState;

fn gateway(state: &AppState) -> Result<&CcavenueClient, AppError> {
    state
        .ccavenue()
        .ok_or_else(|| AppError::Internal("payment gateway not configured".to_string()))
}

/// `POST /api/payments/initiate`
pub async fn initiate(
    State(state): State<AppState>,
    Json(billing): Json<BillingDetails>,
) -> Result<Json<serde_json::Value>, AppError> {
    let gateway = gateway(&state)?;
    OrderRepository::new(state.pool())
        .get_by_order_number(&billing.order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    let enc_request = gateway.build_enc_request(&billing);
    Ok(Json(json!({
        "enc_request": enc_request,
        "access_code": gateway.access_code(),
        "merchant_id": gateway.merchant_id(),
    })))
}

/// `POST /api/payments/response`
///
/// Gateway webhook after hosted checkout. Decrypts `encResp`, records the
/// verdict on the order and bounces the browser back to the storefront.
pub async fn gateway_response(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect, AppError> {
    let gateway = gateway(&state)?;
    let enc_resp = form
        .get("encResp")
        .ok_or_else(|| AppError::bad_request("Missing encResp"))?;
    let response = gateway.decrypt_response(enc_resp)?;

    let order_number = response
        .get("order_id")
        .ok_or_else(|| AppError::bad_request("Response missing order_id"))?;
    let verdict = response.get("order_status").map(String::as_str);
    let tracking_id = response.get("tracking_id").map(String::as_str);

    let frontend = &state.config().frontend_url;
    let orders = OrderRepository::new(state.pool());
    match verdict {
        Some("Success") => {
            orders
                .record_payment_result(
                    order_number,
                    PaymentStatus::Success,
                    tracking_id,
                    Some(OrderStatus::Confirmed),
                )
                .await?;
            tracing::info!(%order_number, "payment captured");
            Ok(Redirect::to(&format!(
                "{frontend}/payment/success?order={order_number}"
            )))
        }
        _ => {
            orders
                .record_payment_result(order_number, PaymentStatus::Failure, tracking_id, None)
                .await?;
            tracing::warn!(%order_number, ?verdict, "payment not captured");
            Ok(Redirect::to(&format!(
                "{frontend}/payment/failure?order={order_number}"
            )))
        }
    }
}

/// `POST /api/payments/cancelled`
///
/// Gateway cancel-URL callback; the payload is the same encrypted form.
pub async fn cancelled(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Redirect, AppError> {
    let frontend = state.config().frontend_url.clone();

    // Best effort: the cancel callback sometimes arrives without a payload.
    if let (Ok(gateway), Some(enc_resp)) = (gateway(&state), form.get("encResp"))
        && let Ok(response) = gateway.decrypt_response(enc_resp)
        && let Some(order_number) = response.get("order_id")
    {
        OrderRepository::new(state.pool())
            .record_payment_result(order_number, PaymentStatus::Failure, None, None)
            .await?;
        return Ok(Redirect::to(&format!(
            "{frontend}/payment/failure?order={order_number}"
        )));
    }
    Ok(Redirect::to(&format!("{frontend}/payment/failure")))
}

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
}

/// Gateway replies are JSON when possible, otherwise the raw text.
fn loose_json(body: String) -> serde_json::Value {
    serde_json::from_str(&body).unwrap_or_else(|_| json!({ "raw": body }))
}

/// `GET /api/payments?from=&to=&page=`
pub async fn order_list(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let gateway = gateway(&state)?;
    let to = query.to.unwrap_or_else(Utc::now);
    let from = query.from.unwrap_or(to - Duration::days(30));
    let body = gateway.order_list(from, to, query.page.unwrap_or(1)).await?;
    Ok(Json(loose_json(body)))
}

/// `GET /api/payments/{order_number}`
pub async fn order_status(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(order_number): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let gateway = gateway(&state)?;
    let body = gateway.order_status(&order_number).await?;
    Ok(Json(loose_json(body)))
}

#[derive(Debug, Deserialize)]
pub struct RefundBody {
    pub order_number: String,
    pub amount: Option<Decimal>,
    pub reason: Option<String>,
}

/// `POST /api/payments/refund`
pub async fn refund(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Json(body): Json<RefundBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let gateway = gateway(&state)?;
    let order = OrderRepository::new(state.pool())
        .get_by_order_number(&body.order_number)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    let reference = order.payment_reference.as_deref().ok_or_else(|| {
        AppError::bad_request("Order has no payment reference to refund against")
    })?;
    let amount = body.amount.unwrap_or(order.final_amount);
    let reason = body.reason.as_deref().unwrap_or("Customer refund");

    let response = gateway.refund(reference, amount, reason).await?;
    tracing::info!(order_number = %order.order_number, "refund requested");
    Ok(Json(loose_json(response)))
}
