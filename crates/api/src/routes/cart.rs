//! Cart handlers, including share-by-link snapshots.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use knobsshop_core::{CartItemId, ProductId, UserId};

use crate::db::{CartRepository, ProductRepository, UserRepository, carts::NewCartItem};
use crate::error::AppError;
use crate::models::{CartItem, SharedCart, SharedCartItem};
use crate::state::AppState;

/// Share links stay valid for a week.
const SHARE_TTL_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
pub struct AddToCartBody {
    pub user_id: UserId,
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub size: Option<String>,
    pub color: Option<String>,
    pub price: Option<Decimal>,
}

const fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct ShareCartBody {
    pub items: Vec<SharedCartItem>,
}

/// `POST /api/cart`
pub async fn add(
    State(state): State<AppState>,
    Json(body): Json<AddToCartBody>,
) -> Result<(StatusCode, Json<CartItem>), AppError> {
    if body.quantity < 1 {
        return Err(AppError::bad_request("Quantity must be at least 1"));
    }
    let users = UserRepository::new(state.pool());
    if users.get_by_id(body.user_id).await?.is_none() {
        return Err(AppError::not_found("User not found"));
    }
    ProductRepository::new(state.pool())
        .get_by_id(body.product_id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    let item = CartRepository::new(state.pool())
        .add_item(NewCartItem {
            user_id: body.user_id,
            product_id: body.product_id,
            quantity: body.quantity,
            size: body.size.as_deref(),
            color: body.color.as_deref(),
            price: body.price,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// `GET /api/cart/{user_id}`
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<CartItem>>, AppError> {
    let mut items = CartRepository::new(state.pool())
        .list_by_user(user_id)
        .await?;

    // Populate products with one batched query.
    let ids: Vec<ProductId> = items.iter().map(|i| i.product_id).collect();
    let products = ProductRepository::new(state.pool()).get_by_ids(&ids).await?;
    for item in &mut items {
        item.product = products.iter().find(|p| p.id == item.product_id).cloned();
    }
    Ok(Json(items))
}

/// `DELETE /api/cart/{id}`
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<CartItemId>,
) -> Result<Json<serde_json::Value>, AppError> {
    CartRepository::new(state.pool()).delete_item(id).await?;
    Ok(Json(json!({ "message": "Removed from cart" })))
}

fn share_token() -> String {
    use rand::Rng;
    let bytes: [u8; 8] = rand::rng().random();
    hex::encode(bytes)
}

/// `POST /api/cart/share`
pub async fn share(
    State(state): State<AppState>,
    Json(body): Json<ShareCartBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    if body.items.is_empty() {
        return Err(AppError::bad_request("Cannot share an empty cart"));
    }

    let token = share_token();
    let expires_at = Utc::now() + Duration::days(SHARE_TTL_DAYS);
    let shared = CartRepository::new(state.pool())
        .create_shared(&token, &body.items, expires_at)
        .await?;

    let link = format!("{}/share-cart/{}", state.config().frontend_url, shared.token);
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "token": shared.token,
            "link": link,
            "expires_at": shared.expires_at,
        })),
    ))
}

/// `GET /api/cart/share/{token}`
pub async fn shared(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<SharedCartResponse>, AppError> {
    let shared = CartRepository::new(state.pool())
        .get_shared(&token)
        .await?
        .ok_or_else(|| AppError::not_found("Shared cart not found or expired"))?;

    let ids: Vec<ProductId> = shared.items.iter().map(|i| i.product_id).collect();
    let products = ProductRepository::new(state.pool()).get_by_ids(&ids).await?;
    Ok(Json(SharedCartResponse {
        cart: shared,
        products,
    }))
}

/// Shared cart plus the referenced products, resolved at read time.
#[derive(Debug, serde::Serialize)]
pub struct SharedCartResponse {
    #[serde(flatten)]
    pub cart: SharedCart,
    pub products: Vec<crate::models::Product>,
}
