//! Product categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use knobsshop_core::CategoryId;

/// A product category. `subpage_type` tags a category for one of the curated
/// storefront subpages ("modern", "classic", ...); `None` means unassigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub banner_image_url: Option<String>,
    pub subpage_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category plus the number of products filed under it.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    pub product_count: i64,
}
