//! Wishlist handlers.
//!
//! The wishlist is a plain (user, product) set; listing returns the
//! populated products.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::json;

use knobsshop_core::{ProductId, UserId};

use crate::db::{ProductRepository, UserRepository};
use crate::error::AppError;
use crate::models::Product;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WishlistBody {
    pub user_id: UserId,
    pub product_id: ProductId,
}

/// `POST /api/wishlist`
pub async fn add(
    State(state): State<AppState>,
    Json(body): Json<WishlistBody>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    ProductRepository::new(state.pool())
        .get_by_id(body.product_id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    let inserted = UserRepository::new(state.pool())
        .wishlist_add(body.user_id, body.product_id)
        .await?;
    if !inserted {
        return Err(AppError::bad_request("Product already in wishlist"));
    }
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Added to wishlist" })),
    ))
}

/// `DELETE /api/wishlist`
pub async fn remove(
    State(state): State<AppState>,
    Json(body): Json<WishlistBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    UserRepository::new(state.pool())
        .wishlist_remove(body.user_id, body.product_id)
        .await?;
    Ok(Json(json!({ "message": "Removed from wishlist" })))
}

/// `GET /api/wishlist/{user_id}`
pub async fn list(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Product>>, AppError> {
    let ids = UserRepository::new(state.pool())
        .wishlist_product_ids(user_id)
        .await?;
    let products = ProductRepository::new(state.pool()).get_by_ids(&ids).await?;
    Ok(Json(products))
}
