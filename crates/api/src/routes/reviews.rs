//! Review handlers.
//!
//! Every write refreshes the aggregate stats stored on the product row, so
//! listings never need to join the review table.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use serde_json::json;

use knobsshop_core::{ProductId, ReviewId};

use crate::db::{ProductRepository, ReviewRepository, UserRepository};
use crate::error::AppError;
use crate::middleware::RequireUser;
use crate::models::Review;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    pub rating: i32,
    pub comment: Option<String>,
}

async fn refresh_product_stats(state: &AppState, product_id: ProductId) -> Result<(), AppError> {
    let stats = ReviewRepository::new(state.pool())
        .rating_stats(product_id)
        .await?;
    ProductRepository::new(state.pool())
        .set_rating_stats(
            product_id,
            stats.average_rating,
            i32::try_from(stats.review_count).unwrap_or(i32::MAX),
        )
        .await?;
    Ok(())
}

/// `PUT /api/products/{id}/reviews`
pub async fn upsert(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(product_id): Path<ProductId>,
    Json(body): Json<ReviewBody>,
) -> Result<Json<Review>, AppError> {
    if !(1..=5).contains(&body.rating) {
        return Err(AppError::bad_request("Rating must be between 1 and 5"));
    }
    ProductRepository::new(state.pool())
        .get_by_id(product_id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    let user = UserRepository::new(state.pool())
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let review = ReviewRepository::new(state.pool())
        .upsert(
            product_id,
            user_id,
            &user.name,
            body.rating,
            body.comment.as_deref(),
        )
        .await?;
    refresh_product_stats(&state, product_id).await?;
    Ok(Json(review))
}

/// `GET /api/products/{id}/reviews`
pub async fn list_for_product(
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Vec<Review>>, AppError> {
    let reviews = ReviewRepository::new(state.pool())
        .list_by_product(product_id)
        .await?;
    Ok(Json(reviews))
}

/// `DELETE /api/reviews/{id}`
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user_id): RequireUser,
    Path(id): Path<ReviewId>,
) -> Result<Json<serde_json::Value>, AppError> {
    let reviews = ReviewRepository::new(state.pool());
    let review = reviews
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Review not found"))?;
    if review.user_id != user_id {
        return Err(AppError::Forbidden(
            "You can only delete your own review".to_string(),
        ));
    }

    reviews.delete(id).await?;
    refresh_product_stats(&state, review.product_id).await?;
    Ok(Json(json!({ "message": "Review deleted" })))
}
