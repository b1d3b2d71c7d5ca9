//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `JWT_SECRET` - Access-token signing secret (min 32 chars, high entropy)
//! - `JWT_REFRESH_SECRET` - Refresh-token signing secret (min 32 chars)
//! - `SMTP_HOST` - SMTP server hostname
//! - `SMTP_USERNAME` - SMTP authentication username
//! - `SMTP_PASSWORD` - SMTP authentication password
//! - `SMTP_FROM` - Email sender address
//! - `FRONTEND_URL` - Public storefront base URL (redirects, share links)
//!
//! ## Optional
//! - `API_HOST` - Bind address (default: 127.0.0.1)
//! - `API_PORT` - Listen port (default: 5000)
//! - `SMTP_PORT` - SMTP port (default: 587)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` / `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE`
//!
//! ## Optional (CCAvenue - enables online payments)
//! - `CCAVENUE_MERCHANT_ID` - Merchant account ID
//! - `CCAVENUE_ACCESS_CODE` - Access code for the hosted checkout
//! - `CCAVENUE_WORKING_KEY` - AES working key (payload cipher)
//! - `CCAVENUE_REDIRECT_URL` / `CCAVENUE_CANCEL_URL` - Gateway return URLs
//!
//! ## Optional (DTDC - enables shipping consignments and tracking)
//! - `DTDC_API_KEY` - Consignment softdata API key
//! - `DTDC_CUSTOMER_CODE` - Customer account code
//! - `DTDC_TRACKING_TOKEN` - Tracking API access token
//! - `SHIP_FROM_NAME` / `SHIP_FROM_PHONE` / `SHIP_FROM_ADDRESS` /
//!   `SHIP_FROM_CITY` / `SHIP_FROM_STATE` / `SHIP_FROM_PINCODE` - Warehouse
//!   address used as consignment origin and return (defaults provided)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public storefront base URL (payment redirects, share-cart links)
    pub frontend_url: String,
    /// JWT signing secrets and lifetimes
    pub jwt: JwtConfig,
    /// Email configuration
    pub email: EmailConfig,
    /// CCAvenue payment gateway (optional - online payments disabled if unset)
    pub ccavenue: Option<CcavenueConfig>,
    /// DTDC shipping API (optional - consignments disabled if unset)
    pub dtdc: Option<DtdcConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// JWT signing configuration.
///
/// Implements `Debug` manually to redact the signing secrets.
#[derive(Clone)]
pub struct JwtConfig {
    /// Access-token signing secret (HS256)
    pub secret: SecretString,
    /// Refresh-token signing secret (HS256, distinct from the access secret)
    pub refresh_secret: SecretString,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"[REDACTED]")
            .field("refresh_secret", &"[REDACTED]")
            .finish()
    }
}

/// SMTP email configuration.
#[derive(Clone)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP authentication username
    pub smtp_username: String,
    /// SMTP authentication password
    pub smtp_password: SecretString,
    /// Email sender address (From header)
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

/// CCAvenue payment gateway configuration.
///
/// Implements `Debug` manually to redact the working key, which is the AES
/// key for every payload exchanged with the gateway.
#[derive(Clone)]
pub struct CcavenueConfig {
    /// Merchant account ID
    pub merchant_id: String,
    /// Access code for the hosted checkout page
    pub access_code: String,
    /// AES working key (payload cipher key material)
    pub working_key: SecretString,
    /// URL the gateway redirects to after payment
    pub redirect_url: String,
    /// URL the gateway redirects to on cancel
    pub cancel_url: String,
}

impl std::fmt::Debug for CcavenueConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CcavenueConfig")
            .field("merchant_id", &self.merchant_id)
            .field("access_code", &self.access_code)
            .field("working_key", &"[REDACTED]")
            .field("redirect_url", &self.redirect_url)
            .field("cancel_url", &self.cancel_url)
            .finish()
    }
}

/// Warehouse address used as the consignment origin and return address.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ShipperAddress {
    pub name: String,
    pub phone: String,
    pub address_line_1: String,
    pub pincode: String,
    pub city: String,
    pub state: String,
}

/// DTDC shipping API configuration.
#[derive(Clone)]
pub struct DtdcConfig {
    /// Softdata consignment API key
    pub api_key: SecretString,
    /// DTDC customer account code
    pub customer_code: String,
    /// Tracking API access token
    pub tracking_token: SecretString,
    /// Warehouse origin address
    pub origin: ShipperAddress,
    /// Return address (same warehouse by default)
    pub return_address: ShipperAddress,
}

impl std::fmt::Debug for DtdcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DtdcConfig")
            .field("api_key", &"[REDACTED]")
            .field("customer_code", &self.customer_code)
            .field("tracking_token", &"[REDACTED]")
            .field("origin", &self.origin)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_required_secret("DATABASE_URL")?;
        let host = get_env_or_default("API_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("API_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("API_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("API_PORT".to_string(), e.to_string()))?;
        let frontend_url = get_required_env("FRONTEND_URL")?;

        let jwt = JwtConfig::from_env()?;
        let email = EmailConfig::from_env()?;
        let ccavenue = CcavenueConfig::from_env()?;
        let dtdc = DtdcConfig::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            frontend_url,
            jwt,
            email,
            ccavenue,
            dtdc,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = get_validated_secret("JWT_SECRET")?;
        validate_secret_length(&secret, "JWT_SECRET")?;
        let refresh_secret = get_validated_secret("JWT_REFRESH_SECRET")?;
        validate_secret_length(&refresh_secret, "JWT_REFRESH_SECRET")?;

        Ok(Self {
            secret,
            refresh_secret,
        })
    }
}

impl EmailConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let smtp_port = get_env_or_default("SMTP_PORT", "587")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SMTP_PORT".to_string(), e.to_string()))?;

        Ok(Self {
            smtp_host: get_required_env("SMTP_HOST")?,
            smtp_port,
            smtp_username: get_required_env("SMTP_USERNAME")?,
            smtp_password: get_required_secret("SMTP_PASSWORD")?,
            from_address: get_required_env("SMTP_FROM")?,
        })
    }
}

impl CcavenueConfig {
    /// Load CCAvenue configuration from environment.
    ///
    /// Returns `None` when no CCAvenue variables are set (online payments
    /// disabled). All five variables must be set together.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let merchant_id = get_optional_env("CCAVENUE_MERCHANT_ID");
        let access_code = get_optional_env("CCAVENUE_ACCESS_CODE");
        let working_key = get_optional_env("CCAVENUE_WORKING_KEY");
        let redirect_url = get_optional_env("CCAVENUE_REDIRECT_URL");
        let cancel_url = get_optional_env("CCAVENUE_CANCEL_URL");

        match (merchant_id, access_code, working_key, redirect_url, cancel_url) {
            (Some(merchant_id), Some(access_code), Some(key), Some(redirect_url), Some(cancel_url)) => {
                validate_secret_strength(&key, "CCAVENUE_WORKING_KEY")?;
                Ok(Some(Self {
                    merchant_id,
                    access_code,
                    working_key: SecretString::from(key),
                    redirect_url,
                    cancel_url,
                }))
            }
            (None, None, None, None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "CCAVENUE_*".to_string(),
                "All CCAVENUE_* variables must be set together".to_string(),
            )),
        }
    }
}

impl DtdcConfig {
    /// Load DTDC configuration from environment.
    ///
    /// Returns `None` when no DTDC variables are set (shipping disabled).
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let api_key = get_optional_env("DTDC_API_KEY");
        let customer_code = get_optional_env("DTDC_CUSTOMER_CODE");
        let tracking_token = get_optional_env("DTDC_TRACKING_TOKEN");

        match (api_key, customer_code, tracking_token) {
            (Some(key), Some(customer_code), Some(token)) => {
                let origin = ShipperAddress::from_env();
                Ok(Some(Self {
                    api_key: SecretString::from(key),
                    customer_code,
                    tracking_token: SecretString::from(token),
                    return_address: origin.clone(),
                    origin,
                }))
            }
            (None, None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "DTDC_*".to_string(),
                "All DTDC_* variables must be set together".to_string(),
            )),
        }
    }
}

impl ShipperAddress {
    fn from_env() -> Self {
        Self {
            name: get_env_or_default("SHIP_FROM_NAME", "KnobsShop Warehouse"),
            phone: get_env_or_default("SHIP_FROM_PHONE", "9999999999"),
            address_line_1: get_env_or_default("SHIP_FROM_ADDRESS", "123 Main Street"),
            pincode: get_env_or_default("SHIP_FROM_PINCODE", "110001"),
            city: get_env_or_default("SHIP_FROM_CITY", "New Delhi"),
            state: get_env_or_default("SHIP_FROM_STATE", "Delhi"),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_degenerate_inputs() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_placeholder_secret_rejected() {
        let err = validate_secret_strength("your-working-key-here", "CCAVENUE_WORKING_KEY")
            .expect_err("placeholder must be rejected");
        assert!(matches!(err, ConfigError::InsecureSecret(..)));
    }

    #[test]
    fn test_random_secret_accepted() {
        assert!(validate_secret_strength("q7Sw2mXh4Lp9RkZv1NcB6yTd8FgJ3aVu", "JWT").is_ok());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let short = SecretString::from("q7Sw2mXh4Lp9");
        assert!(validate_secret_length(&short, "JWT_SECRET").is_err());
    }
}
