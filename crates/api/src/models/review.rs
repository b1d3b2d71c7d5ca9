//! Product reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use knobsshop_core::{ProductId, ReviewId, UserId};

/// A customer review. One review per (product, user); a second submission
/// overwrites the first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    /// Reviewer display name, denormalized at write time.
    pub name: String,
    /// 1 to 5.
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
