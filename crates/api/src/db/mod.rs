//! Database operations for the shop `PostgreSQL`.
//!
//! ## Tables (schema `shop`)
//!
//! - `front_user` - Customer accounts (email/phone login, OTP columns)
//! - `address` - Saved delivery addresses
//! - `wishlist_item` - (user, product) pairs
//! - `category` / `product` - Catalog; product content is JSONB
//! - `cart_item` / `shared_cart` - Carts and share-by-link snapshots
//! - `counter` - Named sequences (`order_number`)
//! - `orders` - Orders; items and shipping address are JSONB
//! - `coupon` / `review` - Discounts and product reviews
//! - `ad` / `brochure` / `essentials` / `shelf` / `policy` / `consultation`
//! - `analytics_snapshot` - Persisted dashboard rollups (JSONB trend arrays)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p knobsshop-cli -- migrate
//! ```
//!
//! Queries are runtime-checked (`sqlx::query_as::<_, Row>`); each row type
//! converts into its domain model with `TryFrom`, surfacing bad stored data
//! as `RepositoryError::DataCorruption`.

pub mod addresses;
pub mod ads;
pub mod analytics;
pub mod carts;
pub mod categories;
pub mod content;
pub mod coupons;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::AddressRepository;
pub use ads::AdRepository;
pub use analytics::AnalyticsRepository;
pub use carts::CartRepository;
pub use categories::CategoryRepository;
pub use content::ContentRepository;
pub use coupons::CouponRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use reviews::ReviewRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email or coupon code).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Rewrite a unique violation into `Conflict(message)`; other errors pass
    /// through as `Database`.
    pub(crate) fn on_unique(message: &str) -> impl Fn(sqlx::Error) -> Self + '_ {
        move |e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return Self::Conflict(message.to_owned());
            }
            Self::Database(e)
        }
    }

    pub(crate) fn corrupt(what: &str, err: impl std::fmt::Display) -> Self {
        Self::DataCorruption(format!("{what}: {err}"))
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
