//! Bearer-token extractors for customer-facing routes.
//!
//! Handlers that need the caller's identity take `RequireUser`; the token is
//! read from the `Authorization: Bearer` header and verified against the
//! access-token secret.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use knobsshop_core::UserId;

use crate::state::AppState;

/// Extractor that requires a valid access token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user_id): RequireUser,
/// ) -> impl IntoResponse {
///     format!("hello, {user_id}")
/// }
/// ```
pub struct RequireUser(pub UserId);

/// Rejection for a missing or invalid bearer token.
pub struct AuthRejection;

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "authentication required" })),
        )
            .into_response()
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl<S> FromRequestParts<S> for RequireUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let token = bearer_token(parts).ok_or(AuthRejection)?;
        let user_id = state
            .auth()
            .verify_access(token)
            .map_err(|_| AuthRejection)?;
        Ok(Self(user_id))
    }
}
