//! Seed the database with a small demo catalog.
//!
//! Creates a demo customer, two categories with a handful of products, and
//! initializes the order-number counter. Rerunning is a no-op when the demo
//! account already exists.

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

use knobsshop_api::db::{
    self, CategoryRepository, ProductRepository, RepositoryError, UserRepository,
    categories::CategoryInput, products::ProductInput, users::NewUser,
};
use knobsshop_api::models::ProductContent;
use knobsshop_api::services::auth::{self, AuthError};
use knobsshop_core::{Email, ProductStatus};

const DEMO_EMAIL: &str = "demo@knobsshop.store";
const DEMO_PASSWORD: &str = "knobsshop-demo";

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Password hashing error: {0}")]
    Auth(#[from] AuthError),

    #[error("Invalid seed data: {0}")]
    Invalid(String),
}

/// Seed demo data into the database at `DATABASE_URL`.
///
/// # Errors
///
/// Returns an error if the environment variable is missing or a write fails.
pub async fn run() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("DATABASE_URL")
        .map(SecretString::from)
        .map_err(|_| SeedError::MissingEnvVar("DATABASE_URL"))?;

    let pool = db::create_pool(&database_url).await?;
    tracing::info!("Connected to database");

    let users = UserRepository::new(&pool);
    let email = Email::parse(DEMO_EMAIL).map_err(|e| SeedError::Invalid(e.to_string()))?;

    if users.get_by_email(&email).await?.is_some() {
        tracing::info!("Demo account already present, nothing to do");
        return Ok(());
    }

    let password_hash = auth::hash_password(DEMO_PASSWORD)?;
    let demo_user = users
        .create(NewUser {
            name: "Demo Customer",
            email: Some(&email),
            phone: None,
            password_hash: &password_hash,
        })
        .await?;
    tracing::info!(user_id = %demo_user.id, "Created demo customer");

    // Initialize the order-number counter so the first real order is ORD-0001.
    sqlx::query("INSERT INTO shop.counter (name, seq) VALUES ('order_number', 0) ON CONFLICT DO NOTHING")
        .execute(&pool)
        .await?;

    let categories = CategoryRepository::new(&pool);
    let products = ProductRepository::new(&pool);

    let handles = categories
        .create(CategoryInput {
            name: "Door Handles",
            description: Some("Lever and pull handles in brass, steel and matte black"),
            image_url: None,
            banner_image_url: None,
        })
        .await?;

    let locks = categories
        .create(CategoryInput {
            name: "Digital Locks",
            description: Some("Keypad and fingerprint smart locks"),
            image_url: None,
            banner_image_url: None,
        })
        .await?;

    let content = ProductContent::default();
    let catalog = [
        ("Brass Lever Handle", "89.00", Some(handles.id), "KS-BLH-01"),
        ("Matte Black Pull Handle", "129.00", Some(handles.id), "KS-MBP-02"),
        ("Fingerprint Smart Lock", "349.00", Some(locks.id), "KS-FSL-01"),
    ];

    for (name, price, category_id, sku) in catalog {
        let price: Decimal = price
            .parse()
            .map_err(|_| SeedError::Invalid(format!("bad price for {name}")))?;
        let product = products
            .create(
                demo_user.id,
                ProductInput {
                    name,
                    description: None,
                    price,
                    compare_price: None,
                    stock: 25,
                    sku: Some(sku),
                    status: ProductStatus::Active,
                    brand: Some("KnobsShop"),
                    category_id,
                    images: &[],
                    video: None,
                    content: &content,
                },
            )
            .await?;
        tracing::info!(product_id = %product.id, name, "Seeded product");
    }

    tracing::info!("Seeding complete");
    Ok(())
}
