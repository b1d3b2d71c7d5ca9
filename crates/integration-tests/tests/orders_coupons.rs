//! Integration tests for orders and coupons.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p knobsshop-api)
//!
//! Run with: cargo test -p knobsshop-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use knobsshop_integration_tests::{access_token, base_url, client, signup, unique_email};

fn shipping_address() -> Value {
    json!({
        "phone": "+91 98765 43210",
        "street": "12 MG Road",
        "city": "Kochi",
        "district": "Ernakulam",
        "pincode": "682001",
        "state": "Kerala",
    })
}

async fn seeded_user_and_product(client: &reqwest::Client) -> (String, String, Value) {
    let body = signup(client, &unique_email()).await;
    let token = access_token(&body);
    let user_id = body["user"]["id"]
        .as_str()
        .expect("signup should return user id")
        .to_string();

    let resp = client
        .post(format!("{}/api/products", base_url()))
        .bearer_auth(&token)
        .json(&json!({"name": "Order Test Handle", "price": "199.00", "stock": 8}))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let product: Value = resp.json().await.expect("product should be JSON");

    (token, user_id, product)
}

async fn place_order(client: &reqwest::Client, user_id: &str, product: &Value) -> Value {
    let resp = client
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({
            "user_id": user_id,
            "items": [{
                "product_id": product["id"],
                "product_name": product["name"],
                "quantity": 2,
                "price": product["price"],
                "total": "0",
            }],
            "shipping_address": shipping_address(),
        }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), StatusCode::CREATED);
    resp.json().await.expect("order should be JSON")
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn order_totals_are_recomputed_server_side() {
    let client = client();
    let (_, user_id, product) = seeded_user_and_product(&client).await;

    // The submitted line total of "0" must be ignored.
    let order = place_order(&client, &user_id, &product).await;
    assert_eq!(order["total_amount"], "398.00");
    assert_eq!(order["final_amount"], "398.00");
    assert!(order["order_number"]
        .as_str()
        .expect("order should have a number")
        .starts_with("ORD-"));
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn empty_order_is_rejected() {
    let client = client();
    let (_, user_id, _) = seeded_user_and_product(&client).await;

    let resp = client
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({
            "user_id": user_id,
            "items": [],
            "shipping_address": shipping_address(),
        }))
        .send()
        .await
        .expect("Failed to send order");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn unknown_coupon_code_rejects_the_order() {
    let client = client();
    let (_, user_id, product) = seeded_user_and_product(&client).await;

    let resp = client
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({
            "user_id": user_id,
            "items": [{
                "product_id": product["id"],
                "product_name": product["name"],
                "quantity": 1,
                "price": product["price"],
                "total": product["price"],
            }],
            "shipping_address": shipping_address(),
            "coupon_code": "NO-SUCH-CODE",
        }))
        .send()
        .await
        .expect("Failed to send order");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("error body should be JSON");
    assert_eq!(body["message"], "Invalid coupon code");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn order_patch_rejects_unknown_fields() {
    let client = client();
    let (_, user_id, product) = seeded_user_and_product(&client).await;
    let order = place_order(&client, &user_id, &product).await;
    let id = order["id"].as_str().expect("order should have id");

    let resp = client
        .patch(format!("{}/api/orders/{id}", base_url()))
        .json(&json!({"status": "confirmed", "sneaky_field": true}))
        .send()
        .await
        .expect("Failed to patch order");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("error body should be JSON");
    let message = body["message"].as_str().expect("message should be a string");
    assert!(message.contains("sneaky_field"));

    // The allow-listed field alone goes through.
    let resp = client
        .patch(format!("{}/api/orders/{id}", base_url()))
        .json(&json!({"status": "confirmed"}))
        .send()
        .await
        .expect("Failed to patch order");
    assert_eq!(resp.status(), StatusCode::OK);
    let patched: Value = resp.json().await.expect("order should be JSON");
    assert_eq!(patched["status"], "confirmed");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn unknown_order_is_not_found() {
    let client = client();
    let bogus = uuid::Uuid::new_v4();

    let resp = client
        .get(format!("{}/api/orders/{bogus}", base_url()))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn duplicate_coupon_code_conflicts() {
    let client = client();
    let token = access_token(&signup(&client, &unique_email()).await);
    let code = format!("IT{}", uuid::Uuid::new_v4().simple());

    let coupon = json!({
        "code": code,
        "type": "flat",
        "value": "50",
        "start_date": "2026-01-01T00:00:00Z",
        "expiry_date": "2030-01-01T00:00:00Z",
    });

    let resp = client
        .post(format!("{}/api/coupons", base_url()))
        .bearer_auth(&token)
        .json(&coupon)
        .send()
        .await
        .expect("Failed to create coupon");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(format!("{}/api/coupons", base_url()))
        .bearer_auth(&token)
        .json(&coupon)
        .send()
        .await
        .expect("Failed to re-create coupon");
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}
