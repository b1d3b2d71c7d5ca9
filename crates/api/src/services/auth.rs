//! Authentication: Argon2id password hashing and HS256 JWTs.
//!
//! Access tokens live 15 hours, refresh tokens 30 days; they are signed with
//! separate secrets so a leaked refresh secret cannot mint access tokens.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use knobsshop_core::UserId;

use crate::config::JwtConfig;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Access token lifetime.
const ACCESS_TOKEN_HOURS: i64 = 15;

/// Refresh token lifetime.
const REFRESH_TOKEN_DAYS: i64 = 30;

/// Errors from authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Password doesn't meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Wrong email/phone or password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Token is missing, malformed, expired, or has a bad signature.
    #[error("invalid token")]
    InvalidToken,
}

/// JWT claims carried by both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: UserId,
    /// "access" or "refresh".
    pub kind: String,
    /// Expiry, seconds since epoch.
    pub exp: i64,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
}

/// Access + refresh token pair returned on signup/login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Stateless signer/verifier for customer tokens.
#[derive(Clone)]
pub struct AuthService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl AuthService {
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let access = config.secret.expose_secret().as_bytes();
        let refresh = config.refresh_secret.expose_secret().as_bytes();
        Self {
            access_encoding: EncodingKey::from_secret(access),
            access_decoding: DecodingKey::from_secret(access),
            refresh_encoding: EncodingKey::from_secret(refresh),
            refresh_decoding: DecodingKey::from_secret(refresh),
        }
    }

    /// Issue an access + refresh pair for a user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if signing fails.
    pub fn issue_tokens(&self, user_id: UserId) -> Result<TokenPair, AuthError> {
        let access_token = self.sign(user_id, "access", Duration::hours(ACCESS_TOKEN_HOURS))?;
        let refresh_token = self.sign(user_id, "refresh", Duration::days(REFRESH_TOKEN_DAYS))?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verify an access token and return the caller's user id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` on any verification failure.
    pub fn verify_access(&self, token: &str) -> Result<UserId, AuthError> {
        let claims = Self::verify(token, &self.access_decoding)?;
        if claims.kind != "access" {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims.sub)
    }

    /// Exchange a refresh token for a fresh access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` on any verification failure.
    pub fn refresh_access(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = Self::verify(refresh_token, &self.refresh_decoding)?;
        if claims.kind != "refresh" {
            return Err(AuthError::InvalidToken);
        }
        self.sign(claims.sub, "access", Duration::hours(ACCESS_TOKEN_HOURS))
    }

    fn sign(&self, user_id: UserId, kind: &str, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            kind: kind.to_owned(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };
        let key = if kind == "refresh" {
            &self.refresh_encoding
        } else {
            &self.access_encoding
        };
        encode(&Header::default(), &claims, key).map_err(|_| AuthError::InvalidToken)
    }

    fn verify(token: &str, key: &DecodingKey) -> Result<Claims, AuthError> {
        decode::<Claims>(token, key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }
}

/// Reject passwords that are too short.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` when the password fails validation.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` when they don't match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Generate a 6-digit OTP code.
#[must_use]
pub fn generate_otp() -> String {
    use rand::Rng;
    let code: u32 = rand::rng().random_range(100_000..1_000_000);
    code.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn service() -> AuthService {
        AuthService::new(&JwtConfig {
            secret: SecretString::from("unit-test-access-secret-0123456789abcdef"),
            refresh_secret: SecretString::from("unit-test-refresh-secret-0123456789abcdef"),
        })
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("correct horse battery").expect("hash");
        assert!(verify_password("correct horse battery", &hash).is_ok());
        assert!(verify_password("wrong password", &hash).is_err());
    }

    #[test]
    fn short_password_rejected() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
    }

    #[test]
    fn access_token_round_trip() {
        let auth = service();
        let user_id = UserId::generate();
        let pair = auth.issue_tokens(user_id).expect("tokens");
        assert_eq!(auth.verify_access(&pair.access_token).expect("verify"), user_id);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let auth = service();
        let pair = auth.issue_tokens(UserId::generate()).expect("tokens");
        assert!(auth.verify_access(&pair.refresh_token).is_err());
    }

    #[test]
    fn refresh_exchange_yields_valid_access_token() {
        let auth = service();
        let user_id = UserId::generate();
        let pair = auth.issue_tokens(user_id).expect("tokens");
        let access = auth.refresh_access(&pair.refresh_token).expect("refresh");
        assert_eq!(auth.verify_access(&access).expect("verify"), user_id);
    }

    #[test]
    fn generate_otp_format() {
        let code = generate_otp();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}
