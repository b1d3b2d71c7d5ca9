//! Integration tests for cart lines, shared carts and the wishlist.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p knobsshop-api)
//!
//! Run with: cargo test -p knobsshop-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use knobsshop_integration_tests::{access_token, base_url, client, signup, unique_email};

async fn seeded_user_and_product(client: &reqwest::Client) -> (String, String, String) {
    let body = signup(client, &unique_email()).await;
    let token = access_token(&body);
    let user_id = body["user"]["id"]
        .as_str()
        .expect("signup should return user id")
        .to_string();

    let resp = client
        .post(format!("{}/api/products", base_url()))
        .bearer_auth(&token)
        .json(&json!({"name": "Cart Test Knob", "price": "59.00", "stock": 5}))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let product: Value = resp.json().await.expect("product should be JSON");
    let product_id = product["id"]
        .as_str()
        .expect("product should have id")
        .to_string();

    (token, user_id, product_id)
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn adding_same_product_twice_bumps_quantity() {
    let client = client();
    let (_, user_id, product_id) = seeded_user_and_product(&client).await;

    for _ in 0..2 {
        let resp = client
            .post(format!("{}/api/cart", base_url()))
            .json(&json!({"user_id": user_id, "product_id": product_id, "quantity": 1}))
            .send()
            .await
            .expect("Failed to add cart line");
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = client
        .get(format!("{}/api/cart/{user_id}", base_url()))
        .send()
        .await
        .expect("Failed to list cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let lines: Value = resp.json().await.expect("cart should be JSON");
    let lines = lines.as_array().expect("cart should be an array");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 2);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn wishlist_rejects_duplicates() {
    let client = client();
    let (_, user_id, product_id) = seeded_user_and_product(&client).await;

    let resp = client
        .post(format!("{}/api/wishlist", base_url()))
        .json(&json!({"user_id": user_id, "product_id": product_id}))
        .send()
        .await
        .expect("Failed to add wishlist entry");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{}/api/wishlist", base_url()))
        .json(&json!({"user_id": user_id, "product_id": product_id}))
        .send()
        .await
        .expect("Failed to re-add wishlist entry");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("error body should be JSON");
    assert_eq!(body["message"], "Product already in wishlist");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn shared_cart_round_trip() {
    let client = client();
    let (_, user_id, product_id) = seeded_user_and_product(&client).await;

    let resp = client
        .post(format!("{}/api/cart", base_url()))
        .json(&json!({"user_id": user_id, "product_id": product_id, "quantity": 1}))
        .send()
        .await
        .expect("Failed to add cart line");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{}/api/cart/share", base_url()))
        .json(&json!({"items": [{"product_id": product_id, "quantity": 1}]}))
        .send()
        .await
        .expect("Failed to share cart");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let share: Value = resp.json().await.expect("share response should be JSON");
    let token = share["token"].as_str().expect("share should carry token");

    let resp = client
        .get(format!("{}/api/cart/share/{token}", base_url()))
        .send()
        .await
        .expect("Failed to resolve shared cart");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("shared cart should be JSON");
    assert_eq!(body["token"], Value::String(token.to_string()));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn unknown_share_token_is_not_found() {
    let client = client();

    let resp = client
        .get(format!("{}/api/cart/share/deadbeefdeadbeef", base_url()))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
