//! DTDC shipping handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::json;

use knobsshop_core::OrderId;

use crate::db::OrderRepository;
use crate::error::AppError;
use crate::middleware::RequireUser;
use crate::services::dtdc::DtdcClient;
use crate::state::AppState;

fn courier(state: &AppState) -> Result<&DtdcClient, AppError> {
    state
        .dtdc()
        .ok_or_else(|| AppError::Internal("shipping provider not configured".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct TrackBody {
    pub consignment_number: Option<String>,
}

/// `POST /api/orders/{id}/consignment`
pub async fn create_consignment(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(id): Path<OrderId>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let courier = courier(&state)?;
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    let consignment_number = courier.create_consignment(&order).await?;
    orders.set_consignment_number(id, &consignment_number).await?;
    tracing::info!(order_number = %order.order_number, %consignment_number, "consignment booked");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "consignment_number": consignment_number })),
    ))
}

/// `POST /api/shipping/track`
pub async fn track(
    State(state): State<AppState>,
    Json(body): Json<TrackBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let Some(consignment_number) = body
        .consignment_number
        .as_deref()
        .filter(|c| !c.trim().is_empty())
    else {
        return Err(AppError::bad_request("Consignment number is required"));
    };

    let courier = courier(&state)?;
    let details = courier.track(consignment_number).await?;
    Ok(Json(details))
}
