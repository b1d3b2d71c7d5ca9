//! Promotional banner ads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use knobsshop_core::{AdId, AdMode, AdPage, AdPlacement};

/// A banner ad creative. `mode` records whether the creative was uploaded
/// alone or as part of a batch; `placement` is the slot on the page and
/// `page` the storefront page (or themed section) it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ad {
    pub id: AdId,
    pub mode: AdMode,
    pub title: String,
    pub description: String,
    pub placement: AdPlacement,
    pub page: AdPage,
    pub image: String,
    pub link: Option<String>,
    pub from_date: Option<DateTime<Utc>>,
    pub to_date: Option<DateTime<Utc>>,
    pub cta_button: Option<String>,
    pub created_at: DateTime<Utc>,
}
