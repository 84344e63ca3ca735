//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `GREENMARKET_USER_ID` - Shopper the cart and orders belong to
//!
//! ## Optional
//! - `GREENMARKET_API_URL` - Backend base URL (default: `http://localhost:3001`)
//! - `GREENMARKET_DELIVERY_FEE` - Flat delivery fee added to every order (default: 250)
//! - `GREENMARKET_LOOKUP_DEBOUNCE_MS` - Quiet period before a postal lookup (default: 300)
//! - `LOCALITY_LOOKUP_URL` - Postal code locality service endpoint
//! - `LOCALITY_APP_ID` - Locality service application id (required with the URL)
//! - `LOCALITY_API_KEY` - Locality service REST key (required with the URL)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::str::FromStr;
use std::time::Duration;

use greenmarket_core::UserId;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:3001";
const DEFAULT_DELIVERY_FEE: &str = "250";
const DEFAULT_LOOKUP_DEBOUNCE_MS: &str = "300";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
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

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend base URL (cart, catalog and order endpoints live under `/api`)
    pub api_url: Url,
    /// Shopper the session belongs to
    pub user_id: UserId,
    /// Checkout pricing and timing
    pub checkout: CheckoutConfig,
    /// Postal code locality lookup service, if configured
    pub locality: Option<LocalityConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Checkout pricing and timing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutConfig {
    /// Flat fee added once per order
    pub delivery_fee: Decimal,
    /// Quiet period after the last postal code keystroke
    pub lookup_debounce: Duration,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            delivery_fee: Decimal::from(250),
            lookup_debounce: Duration::from_millis(300),
        }
    }
}

/// Postal code locality lookup service configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct LocalityConfig {
    /// Endpoint queried with `where={"postalCode": ...}`
    pub url: Url,
    /// Application id header value
    pub app_id: String,
    /// REST API key header value
    pub api_key: SecretString,
}

impl std::fmt::Debug for LocalityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalityConfig")
            .field("url", &self.url.as_str())
            .field("app_id", &self.app_id)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the locality API key looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_url = parse_env::<Url>("GREENMARKET_API_URL", DEFAULT_API_URL)?;
        let user_id = UserId::new(get_required_env("GREENMARKET_USER_ID")?);
        let checkout = CheckoutConfig::from_env()?;
        let locality = LocalityConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            api_url,
            user_id,
            checkout,
            locality,
            sentry_dsn,
        })
    }
}

impl CheckoutConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let delivery_fee =
            parse_env::<Decimal>("GREENMARKET_DELIVERY_FEE", DEFAULT_DELIVERY_FEE)?;
        if delivery_fee.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar(
                "GREENMARKET_DELIVERY_FEE".to_string(),
                "must not be negative".to_string(),
            ));
        }
        let debounce_ms =
            parse_env::<u64>("GREENMARKET_LOOKUP_DEBOUNCE_MS", DEFAULT_LOOKUP_DEBOUNCE_MS)?;

        Ok(Self {
            delivery_fee,
            lookup_debounce: Duration::from_millis(debounce_ms),
        })
    }
}

impl LocalityConfig {
    /// The lookup service is optional, but once its URL is set the
    /// credentials become mandatory.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(raw_url) = get_optional_env("LOCALITY_LOOKUP_URL") else {
            return Ok(None);
        };
        let url = Url::parse(&raw_url).map_err(|e| {
            ConfigError::InvalidEnvVar("LOCALITY_LOOKUP_URL".to_string(), e.to_string())
        })?;
        let app_id = get_required_env("LOCALITY_APP_ID")?;
        let api_key = get_validated_secret("LOCALITY_API_KEY")?;

        Ok(Some(Self {
            url,
            app_id,
            api_key,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_optional_env(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Reject secrets that are obviously placeholders copied from a template.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

/// Expose the locality key for request headers.
pub(crate) fn locality_api_key(config: &LocalityConfig) -> &str {
    config.api_key.expose_secret()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_changeme() {
        assert!(validate_secret_strength("CHANGEME123", "TEST_VAR").is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("PEiQXCC7epFXpawKFRHhnUxu7MCm", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_checkout_defaults() {
        let config = CheckoutConfig::default();
        assert_eq!(config.delivery_fee, Decimal::from(250));
        assert_eq!(config.lookup_debounce, Duration::from_millis(300));
        assert_eq!(
            DEFAULT_DELIVERY_FEE.parse::<Decimal>().unwrap(),
            config.delivery_fee
        );
        assert_eq!(
            DEFAULT_LOOKUP_DEBOUNCE_MS.parse::<u64>().unwrap(),
            300
        );
    }

    #[test]
    fn test_default_api_url_parses() {
        let url = Url::parse(DEFAULT_API_URL).unwrap();
        assert_eq!(url.port(), Some(3001));
    }

    #[test]
    fn test_locality_config_debug_redacts_key() {
        let config = LocalityConfig {
            url: Url::parse("https://parseapi.back4app.com/classes/LK_LK").unwrap(),
            app_id: "app_id_value".to_string(),
            api_key: SecretString::from("super_secret_rest_key"),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("parseapi.back4app.com"));
        assert!(debug_output.contains("app_id_value"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_rest_key"));
        assert_eq!(locality_api_key(&config), "super_secret_rest_key");
    }
}
