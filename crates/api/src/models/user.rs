//! Storefront customer accounts.
//!
//! Customers sign up with an email or a phone number (OTP flow); both are
//! optional but at least one is always present. The password hash never
//! leaves the repository layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use knobsshop_core::{Email, UserId};

/// A customer account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Option<Email>,
    pub phone: Option<String>,
    #[serde(default)]
    pub profile_url: String,
    pub gender: Option<String>,
    /// Company name for business buyers (set from order GST details).
    #[serde(default)]
    pub company: String,
    /// GST registration number for business buyers.
    #[serde(default)]
    pub gst: String,
    pub date_of_birth: Option<NaiveDate>,
    /// Coupon codes this customer has redeemed.
    #[serde(default)]
    pub used_coupons: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Slim projection used when populating user references on orders, carts
/// and reviews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: Option<Email>,
}

/// Counts shown next to the profile after login/signup.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProfileCounts {
    pub cart_count: i64,
    pub wishlist_count: i64,
}
