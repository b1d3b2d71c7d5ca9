//! Product catalog handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use knobsshop_core::{CategoryId, ProductId, ProductStatus};

use crate::db::{ProductRepository, products::ProductBrochure, products::ProductInput};
use crate::error::AppError;
use crate::middleware::RequireUser;
use crate::models::{Product, ProductContent};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProductBody {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub compare_price: Option<Decimal>,
    #[serde(default)]
    pub stock: i32,
    pub sku: Option<String>,
    #[serde(default)]
    pub status: ProductStatus,
    pub brand: Option<String>,
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub images: Vec<String>,
    pub video: Option<String>,
    #[serde(default)]
    pub content: ProductContent,
}

impl ProductBody {
    fn as_input(&self) -> ProductInput<'_> {
        ProductInput {
            name: &self.name,
            description: self.description.as_deref(),
            price: self.price,
            compare_price: self.compare_price,
            stock: self.stock,
            sku: self.sku.as_deref(),
            status: self.status,
            brand: self.brand.as_deref(),
            category_id: self.category_id,
            images: &self.images,
            video: self.video.as_deref(),
            content: &self.content,
        }
    }
}

/// `POST /api/products`
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Json(body): Json<ProductBody>,
) -> Result<(StatusCode, Json<Product>), AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::bad_request("Product name is required"));
    }
    let product = ProductRepository::new(state.pool())
        .create(user_id, body.as_input())
        .await?;
    tracing::info!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// `GET /api/products`
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    let products = ProductRepository::new(state.pool()).list_all().await?;
    Ok(Json(products))
}

/// `GET /api/products/brochures`
pub async fn brochures(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductBrochure>>, AppError> {
    let rows = ProductRepository::new(state.pool()).list_brochures().await?;
    Ok(Json(rows))
}

/// `GET /api/products/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>, AppError> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;
    Ok(Json(product))
}

/// `PUT /api/products/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(id): Path<ProductId>,
    Json(body): Json<ProductBody>,
) -> Result<Json<Product>, AppError> {
    let product = ProductRepository::new(state.pool())
        .update(id, body.as_input())
        .await?;
    Ok(Json(product))
}

/// `DELETE /api/products/{id}`
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(id): Path<ProductId>,
) -> Result<Json<serde_json::Value>, AppError> {
    ProductRepository::new(state.pool()).delete(id).await?;
    Ok(Json(json!({ "message": "Product deleted" })))
}

/// `GET /api/products/{id}/share-link`
pub async fn share_link(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<serde_json::Value>, AppError> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;
    let link = format!("{}/product/{}", state.config().frontend_url, product.id);
    Ok(Json(json!({ "link": link })))
}

/// `GET /api/products/category/{category_id}`
pub async fn by_category(
    State(state): State<AppState>,
    Path(category_id): Path<CategoryId>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = ProductRepository::new(state.pool())
        .list_by_category(category_id)
        .await?;
    if products.is_empty() {
        return Err(AppError::not_found("No products found for this category"));
    }
    Ok(Json(products))
}

/// `GET /api/products/brand/{brand}`
pub async fn by_brand(
    State(state): State<AppState>,
    Path(brand): Path<String>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = ProductRepository::new(state.pool())
        .list_by_brand(&brand)
        .await?;
    Ok(Json(products))
}
