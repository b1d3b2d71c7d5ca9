//! Integration tests for the auth endpoints.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p knobsshop-api)
//!
//! Run with: cargo test -p knobsshop-integration-tests -- --ignored

use reqwest::StatusCode;
use serde_json::{Value, json};

use knobsshop_integration_tests::{access_token, base_url, client, signup, unique_email};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn signup_then_login_returns_token_pair() {
    let client = client();
    let email = unique_email();

    let body = signup(&client, &email).await;
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());
    assert_eq!(body["user"]["email"], Value::String(email.clone()));

    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({"email": email, "password": "integration-pass-1"}))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("login response should be JSON");
    assert!(body["access_token"].is_string());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn duplicate_email_signup_is_rejected() {
    let client = client();
    let email = unique_email();

    signup(&client, &email).await;

    let resp = client
        .post(format!("{}/api/auth/signup", base_url()))
        .json(&json!({
            "email": email,
            "password": "integration-pass-1",
            "name": "Second Account",
        }))
        .send()
        .await
        .expect("Failed to send signup request");

    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn phone_login_needs_no_password() {
    let client = client();
    let phone = format!(
        "9{:09}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock before epoch")
            .subsec_nanos()
    );

    let resp = client
        .post(format!("{}/api/auth/signup", base_url()))
        .json(&json!({
            "phone": phone,
            "password": "integration-pass-1",
            "name": "Phone Tester",
        }))
        .send()
        .await
        .expect("Failed to send signup request");
    assert_eq!(resp.status(), StatusCode::CREATED);

    // OTP-verified phone logins carry no password.
    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({"phone": phone}))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("login response should be JSON");
    assert!(body["access_token"].is_string());
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn email_login_without_password_is_rejected() {
    let client = client();
    let email = unique_email();

    signup(&client, &email).await;

    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({"email": email}))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn wrong_password_login_is_unauthorized() {
    let client = client();
    let email = unique_email();

    signup(&client, &email).await;

    let resp = client
        .post(format!("{}/api/auth/login", base_url()))
        .json(&json!({"email": email, "password": "definitely-wrong"}))
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn stale_otp_is_rejected() {
    let client = client();
    let email = unique_email();

    signup(&client, &email).await;

    // No OTP was ever issued for this account, so any code must fail.
    let resp = client
        .post(format!("{}/api/auth/verify-otp", base_url()))
        .json(&json!({"identifier": email, "code": "000000"}))
        .send()
        .await
        .expect("Failed to send verify-otp request");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("error body should be JSON");
    assert_eq!(body["message"], "Invalid or expired OTP");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn refresh_exchanges_token() {
    let client = client();
    let email = unique_email();

    let body = signup(&client, &email).await;
    let refresh = body["refresh_token"]
        .as_str()
        .expect("signup should return refresh_token");

    let resp = client
        .post(format!("{}/api/auth/refresh", base_url()))
        .json(&json!({"refresh_token": refresh}))
        .send()
        .await
        .expect("Failed to send refresh request");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("refresh response should be JSON");
    assert!(body["access_token"].is_string());

    // The fresh access token must work against a protected route.
    let token = access_token(&body);
    let resp = client
        .get(format!("{}/api/coupons/available", base_url()))
        .bearer_auth(token)
        .send()
        .await
        .expect("Failed to call protected route");
    assert_eq!(resp.status(), StatusCode::OK);
}
