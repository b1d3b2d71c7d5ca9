//! Integration tests for the product and category endpoints.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p knobsshop-api)
//!
//! Run with: cargo test -p knobsshop-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use knobsshop_integration_tests::{access_token, base_url, client, signup, unique_email};

async fn create_product(client: &reqwest::Client, token: &str, name: &str) -> Value {
    let resp = client
        .post(format!("{}/api/products", base_url()))
        .bearer_auth(token)
        .json(&json!({
            "name": name,
            "price": "149.00",
            "stock": 10,
            "brand": "KnobsShop",
        }))
        .send()
        .await
        .expect("Failed to create product");

    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("product response should be JSON")
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn product_create_requires_auth() {
    let client = client();

    let resp = client
        .post(format!("{}/api/products", base_url()))
        .json(&json!({"name": "Unauthorized Handle", "price": "10.00"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn product_round_trip_and_delete() {
    let client = client();
    let token = access_token(&signup(&client, &unique_email()).await);

    let product = create_product(&client, &token, "Integration Lever Handle").await;
    let id = product["id"].as_str().expect("product should have id");

    let resp = client
        .get(format!("{}/api/products/{id}", base_url()))
        .send()
        .await
        .expect("Failed to fetch product");
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = resp.json().await.expect("product should be JSON");
    assert_eq!(fetched["name"], "Integration Lever Handle");

    let resp = client
        .delete(format!("{}/api/products/{id}", base_url()))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to delete product");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{}/api/products/{id}", base_url()))
        .send()
        .await
        .expect("Failed to re-fetch product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn unknown_product_is_not_found() {
    let client = client();
    let bogus = uuid::Uuid::new_v4();

    let resp = client
        .get(format!("{}/api/products/{bogus}", base_url()))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn empty_category_listing_is_not_found() {
    let client = client();
    let token = access_token(&signup(&client, &unique_email()).await);

    let resp = client
        .post(format!("{}/api/categories", base_url()))
        .bearer_auth(&token)
        .json(&json!({"name": format!("Empty Category {}", uuid::Uuid::new_v4())}))
        .send()
        .await
        .expect("Failed to create category");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let category: Value = resp.json().await.expect("category should be JSON");
    let id = category["id"].as_str().expect("category should have id");

    let resp = client
        .get(format!("{}/api/products/category/{id}", base_url()))
        .send()
        .await
        .expect("Failed to list by category");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("error body should be JSON");
    assert_eq!(body["message"], "No products found for this category");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn share_link_carries_frontend_url() {
    let client = client();
    let token = access_token(&signup(&client, &unique_email()).await);

    let product = create_product(&client, &token, "Shareable Knob").await;
    let id = product["id"].as_str().expect("product should have id");

    let resp = client
        .get(format!("{}/api/products/{id}/share-link", base_url()))
        .send()
        .await
        .expect("Failed to fetch share link");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("share link should be JSON");
    let link = body["link"].as_str().expect("body should carry link");
    assert!(link.ends_with(&format!("/product/{id}")));
}
