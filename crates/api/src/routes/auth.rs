//! Auth route handlers: signup, login, OTP flows, profile.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use knobsshop_core::{Email, ProductId, UserId};

use crate::db::{RepositoryError, UserRepository, users::NewUser};
use crate::error::AppError;
use crate::models::{ProfileCounts, User};
use crate::services::auth::{self, TokenPair};
use crate::state::AppState;

/// OTP lifetime.
const OTP_TTL_MINUTES: i64 = 10;

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignupBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Required for email logins. Phone logins arrive after the client has
    /// verified an OTP, so no password accompanies them.
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshBody {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct OtpRequestBody {
    /// Email address or phone number.
    pub identifier: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpBody {
    pub identifier: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordBody {
    pub identifier: String,
    pub code: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile_url: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Profile plus token pair returned on signup, login, and OTP verification.
#[derive(Debug, serde::Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub cart_count: i64,
    pub wishlist_count: i64,
}

fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(|c| !c.is_whitespace()).collect()
}

fn parse_email(raw: &str) -> Result<Email, AppError> {
    Email::parse(raw).map_err(|e| AppError::bad_request(format!("Invalid email: {e}")))
}

async fn profile_counts(state: &AppState, user_id: UserId) -> Result<ProfileCounts, AppError> {
    let cart_count = crate::db::CartRepository::new(state.pool())
        .count_by_user(user_id)
        .await?;
    let wishlist_count = UserRepository::new(state.pool())
        .wishlist_count(user_id)
        .await?;
    Ok(ProfileCounts {
        cart_count,
        wishlist_count,
    })
}

async fn auth_response(state: &AppState, user: User) -> Result<Json<AuthResponse>, AppError> {
    let TokenPair {
        access_token,
        refresh_token,
    } = state.auth().issue_tokens(user.id)?;
    let counts = profile_counts(state, user.id).await?;
    Ok(Json(AuthResponse {
        user,
        access_token,
        refresh_token,
        cart_count: counts.cart_count,
        wishlist_count: counts.wishlist_count,
    }))
}

/// `GET /api/auth/check?email=|phone=`
pub async fn check(
    State(state): State<AppState>,
    Query(query): Query<CheckQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let users = UserRepository::new(state.pool());
    let exists = match (query.email, query.phone) {
        (Some(email), _) => users.exists_by_email(&parse_email(&email)?).await?,
        (None, Some(phone)) => users.exists_by_phone(&normalize_phone(&phone)).await?,
        (None, None) => {
            return Err(AppError::bad_request("Provide an email or phone to check"));
        }
    };
    Ok(Json(json!({ "exists": exists })))
}

/// `POST /api/auth/signup`
pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupBody>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    auth::validate_password(&body.password)?;

    let email = body.email.as_deref().map(parse_email).transpose()?;
    let phone = body.phone.as_deref().map(normalize_phone);
    if email.is_none() && phone.is_none() {
        return Err(AppError::bad_request(
            "An email or phone number is required to sign up",
        ));
    }

    // Default display name falls back to the email local part.
    let name = body.name.unwrap_or_else(|| {
        email
            .as_ref()
            .and_then(|e| e.as_str().split('@').next())
            .unwrap_or("Customer")
            .to_owned()
    });

    let password_hash = auth::hash_password(&body.password)?;
    let user = UserRepository::new(state.pool())
        .create(NewUser {
            name: &name,
            email: email.as_ref(),
            phone: phone.as_deref(),
            password_hash: &password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, "customer signed up");
    let response = auth_response(&state, user).await?;
    Ok((StatusCode::CREATED, response))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Json<AuthResponse>, AppError> {
    let users = UserRepository::new(state.pool());

    let credential = match (body.email, body.phone) {
        (Some(email), _) => {
            let password = body
                .password
                .as_deref()
                .ok_or_else(|| AppError::bad_request("Password is required for email login"))?;
            let credential = users
                .credential_by_email(&parse_email(&email)?)
                .await?
                .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;
            auth::verify_password(password, &credential.password_hash)?;
            credential
        }
        // The phone path is OTP-verified on the client; no password check.
        (None, Some(phone)) => users
            .credential_by_phone(&normalize_phone(&phone))
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?,
        (None, None) => {
            return Err(AppError::bad_request("Provide an email or phone to log in"));
        }
    };

    let user = users
        .get_by_id(credential.user_id)
        .await?
        .ok_or(RepositoryError::NotFound)?;
    auth_response(&state, user).await
}

/// `POST /api/auth/refresh`
pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let access_token = state.auth().refresh_access(&body.refresh_token)?;
    Ok(Json(json!({ "access_token": access_token })))
}

fn normalize_identifier(identifier: &str) -> Result<String, AppError> {
    if identifier.contains('@') {
        Ok(parse_email(identifier)?.into_inner())
    } else {
        Ok(normalize_phone(identifier))
    }
}

/// Store a fresh OTP for the account and email it. Shared by the login-OTP
/// and password-reset flows; only the template differs.
async fn issue_otp(state: &AppState, identifier: &str, reset: bool) -> Result<(), AppError> {
    let identifier = normalize_identifier(identifier)?;
    let users = UserRepository::new(state.pool());

    let user = if identifier.contains('@') {
        users.get_by_email(&parse_email(&identifier)?).await?
    } else {
        users.get_by_phone(&identifier).await?
    };
    let user = user.ok_or_else(|| AppError::not_found("Account not found"))?;

    let Some(email) = user.email.as_ref() else {
        return Err(AppError::bad_request(
            "This account has no email address on file",
        ));
    };

    let code = auth::generate_otp();
    let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);
    users.set_otp(&identifier, &code, expires_at).await?;

    if reset {
        state.email().send_password_reset(email.as_str(), &code).await?;
    } else {
        state.email().send_otp(email.as_str(), &code).await?;
    }
    Ok(())
}

/// `POST /api/auth/send-otp`
pub async fn send_otp(
    State(state): State<AppState>,
    Json(body): Json<OtpRequestBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    issue_otp(&state, &body.identifier, false).await?;
    Ok(Json(json!({ "message": "OTP sent" })))
}

/// `POST /api/auth/forgot-password`
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<OtpRequestBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    issue_otp(&state, &body.identifier, true).await?;
    Ok(Json(json!({ "message": "Password reset code sent" })))
}

/// Check a submitted OTP against the stored challenge; returns the user id.
async fn consume_otp(state: &AppState, identifier: &str, code: &str) -> Result<UserId, AppError> {
    let identifier = normalize_identifier(identifier)?;
    let users = UserRepository::new(state.pool());

    let stored = users
        .get_otp(&identifier)
        .await?
        .ok_or_else(|| AppError::not_found("Account not found"))?;

    let valid = stored.otp_code.as_deref() == Some(code)
        && stored.otp_expires_at.is_some_and(|at| at > Utc::now());
    if !valid {
        return Err(AppError::bad_request("Invalid or expired OTP"));
    }

    users.clear_otp(stored.user_id).await?;
    Ok(stored.user_id)
}

/// `POST /api/auth/verify-otp`
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpBody>,
) -> Result<Json<AuthResponse>, AppError> {
    let user_id = consume_otp(&state, &body.identifier, &body.code).await?;
    let user = UserRepository::new(state.pool())
        .get_by_id(user_id)
        .await?
        .ok_or(RepositoryError::NotFound)?;
    auth_response(&state, user).await
}

/// `POST /api/auth/reset-password`
pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    auth::validate_password(&body.new_password)?;
    let user_id = consume_otp(&state, &body.identifier, &body.code).await?;
    let password_hash = auth::hash_password(&body.new_password)?;
    UserRepository::new(state.pool())
        .update_password(user_id, &password_hash)
        .await?;
    Ok(Json(json!({ "message": "Password reset successfully" })))
}

/// Profile with the wishlist product ids attached.
#[derive(Debug, serde::Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: User,
    pub wishlist: Vec<ProductId>,
}

/// `GET /api/auth/{id}`
pub async fn get_profile(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<ProfileResponse>, AppError> {
    let users = UserRepository::new(state.pool());
    let user = users
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    let wishlist = users.wishlist_product_ids(id).await?;
    Ok(Json(ProfileResponse { user, wishlist }))
}

/// `PUT /api/auth/{id}`
pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(body): Json<UpdateProfileBody>,
) -> Result<Json<User>, AppError> {
    let users = UserRepository::new(state.pool());
    let mut user = users
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    if let Some(name) = body.name {
        user.name = name;
    }
    if let Some(email) = body.email {
        user.email = Some(parse_email(&email)?);
    }
    if let Some(phone) = body.phone {
        user.phone = Some(normalize_phone(&phone));
    }
    if let Some(profile_url) = body.profile_url {
        user.profile_url = profile_url;
    }
    if let Some(gender) = body.gender {
        user.gender = Some(gender);
    }
    if let Some(date_of_birth) = body.date_of_birth {
        user.date_of_birth = Some(date_of_birth);
    }

    match users.update_profile(&user).await {
        Ok(saved) => Ok(Json(saved)),
        // Email uniqueness failures surface as 400 on this endpoint.
        Err(RepositoryError::Conflict(msg)) => Err(AppError::bad_request(msg)),
        Err(other) => Err(other.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_only_login_body_deserializes() {
        let body: LoginBody =
            serde_json::from_str(r#"{"phone": "+91 98765 43210"}"#).expect("phone-only body");
        assert!(body.password.is_none());
        assert_eq!(body.phone.as_deref(), Some("+91 98765 43210"));
        assert!(body.email.is_none());
    }

    #[test]
    fn email_login_body_carries_password() {
        let body: LoginBody = serde_json::from_str(
            r#"{"email": "buyer@knobsshop.store", "password": "hunter22"}"#,
        )
        .expect("email body");
        assert_eq!(body.password.as_deref(), Some("hunter22"));
    }

    #[test]
    fn phone_normalization_strips_whitespace() {
        assert_eq!(normalize_phone("+91 98765 43210"), "+919876543210");
        assert_eq!(normalize_phone("9876543210"), "9876543210");
    }
}
