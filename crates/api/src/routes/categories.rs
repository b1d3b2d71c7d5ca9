//! Category handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::json;

use knobsshop_core::CategoryId;

use crate::db::{CategoryRepository, ProductRepository, categories::CategoryInput};
use crate::error::AppError;
use crate::middleware::RequireUser;
use crate::models::{Category, CategoryWithCount};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryBody {
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub banner_image_url: Option<String>,
}

impl CategoryBody {
    fn as_input(&self) -> CategoryInput<'_> {
        CategoryInput {
            name: &self.name,
            description: self.description.as_deref(),
            image_url: self.image_url.as_deref(),
            banner_image_url: self.banner_image_url.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubpageBody {
    pub subpage_type: String,
}

/// `POST /api/categories`
pub async fn create(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Json(body): Json<CategoryBody>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::bad_request("Category name is required"));
    }
    let category = CategoryRepository::new(state.pool())
        .create(body.as_input())
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// `GET /api/categories`
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryWithCount>>, AppError> {
    let categories = CategoryRepository::new(state.pool())
        .list_with_counts()
        .await?;
    Ok(Json(categories))
}

/// `GET /api/categories/{id}`
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<CategoryWithCount>, AppError> {
    let category = CategoryRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Category not found"))?;
    let product_count = ProductRepository::new(state.pool())
        .list_by_category(id)
        .await?
        .len() as i64;
    Ok(Json(CategoryWithCount {
        category,
        product_count,
    }))
}

/// `PUT /api/categories/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(id): Path<CategoryId>,
    Json(body): Json<CategoryBody>,
) -> Result<Json<Category>, AppError> {
    let category = CategoryRepository::new(state.pool())
        .update(id, body.as_input())
        .await?;
    Ok(Json(category))
}

/// `DELETE /api/categories/{id}`
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(id): Path<CategoryId>,
) -> Result<Json<serde_json::Value>, AppError> {
    CategoryRepository::new(state.pool()).delete(id).await?;
    Ok(Json(json!({ "message": "Category deleted" })))
}

/// `PUT /api/categories/{id}/subpage`
///
/// Passing `"none"` clears the assignment.
pub async fn set_subpage(
    State(state): State<AppState>,
    RequireUser(_): RequireUser,
    Path(id): Path<CategoryId>,
    Json(body): Json<SubpageBody>,
) -> Result<Json<Category>, AppError> {
    let subpage = match body.subpage_type.as_str() {
        "none" => None,
        other => Some(other),
    };
    let category = CategoryRepository::new(state.pool())
        .set_subpage_type(id, subpage)
        .await?;
    Ok(Json(category))
}

/// `GET /api/categories/subpage/{subpage_type}`
pub async fn by_subpage(
    State(state): State<AppState>,
    Path(subpage_type): Path<String>,
) -> Result<Json<Vec<Category>>, AppError> {
    let categories = CategoryRepository::new(state.pool())
        .list_by_subpage(&subpage_type)
        .await?;
    Ok(Json(categories))
}
