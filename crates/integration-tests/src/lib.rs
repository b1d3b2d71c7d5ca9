//! Integration tests for the KnobsShop API.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply migrations
//! cargo run -p knobsshop-cli -- migrate
//!
//! # Start the API
//! cargo run -p knobsshop-api
//!
//! # Run the (ignored) integration tests
//! cargo test -p knobsshop-integration-tests -- --ignored
//! ```
//!
//! Tests talk to a running server over HTTP; `API_BASE_URL` overrides the
//! default of `http://localhost:5000`.

use reqwest::Client;
use serde_json::{Value, json};

/// Base URL for the API, configurable via environment.
#[must_use]
pub fn base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// A plain HTTP client.
///
/// # Panics
///
/// Panics if the client cannot be constructed.
#[must_use]
pub fn client() -> Client {
    Client::builder().build().expect("Failed to create HTTP client")
}

/// A unique email address for a throwaway test account.
#[must_use]
pub fn unique_email() -> String {
    format!("it-{}@knobsshop.test", uuid::Uuid::new_v4().simple())
}

/// Sign up a fresh account and return the response body, which carries the
/// user, access token and refresh token.
///
/// # Panics
///
/// Panics if the request fails or the server rejects the signup.
pub async fn signup(client: &Client, email: &str) -> Value {
    let resp = client
        .post(format!("{}/api/auth/signup", base_url()))
        .json(&json!({
            "email": email,
            "password": "integration-pass-1",
            "name": "Integration Tester",
        }))
        .send()
        .await
        .expect("Failed to send signup request");

    assert_eq!(resp.status(), reqwest::StatusCode::CREATED, "signup should succeed");
    resp.json().await.expect("signup response should be JSON")
}

/// Extract the access token from a signup/login response body.
///
/// # Panics
///
/// Panics if the body has no `access_token` string.
#[must_use]
pub fn access_token(body: &Value) -> String {
    body["access_token"]
        .as_str()
        .expect("response should carry access_token")
        .to_string()
}
