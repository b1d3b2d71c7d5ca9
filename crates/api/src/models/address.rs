//! Saved delivery addresses.

use serde::{Deserialize, Serialize};

use knobsshop_core::{AddressId, UserId};

/// A saved delivery address. One address per user is flagged as the default;
/// order creation refreshes it when the shipping address changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub name: Option<String>,
    pub phone: String,
    pub street: String,
    pub city: String,
    pub district: String,
    pub pincode: String,
    pub state: String,
    #[serde(default)]
    pub is_default: bool,
}
