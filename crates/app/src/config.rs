//! App configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_API_KEY` - App client ID from the Partner dashboard
//! - `SHOPIFY_API_SECRET` - App client secret (signs inbound hooks)
//! - `SHOPIFY_APP_URL` - Public URL the app is served from
//!
//! ## Optional
//! - `SCOPES` - Comma-separated access scopes the app requests
//! - `SHOP_CUSTOM_DOMAIN` - Extra shop domain accepted besides `*.myshopify.com`
//! - `SHOPIFY_API_VERSION` - Admin API version (default: 2025-01)
//! - `WEBHOOK_TOPICS` - Comma-separated webhook topics registered after auth
//! - `APP_HOST` - Bind address (default: 127.0.0.1)
//! - `APP_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment tag

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Admin API version the app was built against.
pub const DEFAULT_API_VERSION: &str = "2025-01";

const MYSHOPIFY_SUFFIX: &str = ".myshopify.com";
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

/// Backend configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Shopify app configuration
    pub shopify: ShopifyAppConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag
    pub sentry_environment: Option<String>,
}

/// Shopify app credentials and settings.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ShopifyAppConfig {
    /// App client ID
    pub api_key: String,
    /// App client secret
    pub api_secret: SecretString,
    /// Requested access scopes
    pub scopes: Vec<String>,
    /// Public app URL
    pub app_url: Url,
    /// Admin API version (e.g., 2025-01)
    pub api_version: String,
    /// Custom shop domain accepted in addition to `*.myshopify.com`
    pub custom_shop_domain: Option<String>,
    /// Webhook topics registered after authentication
    pub webhook_topics: Vec<String>,
}

impl std::fmt::Debug for ShopifyAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAppConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("app_url", &self.app_url.as_str())
            .field("api_version", &self.api_version)
            .field("custom_shop_domain", &self.custom_shop_domain)
            .field("webhook_topics", &self.webhook_topics)
            .finish()
    }
}

impl AppConfig {
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

        let host = get_env_or_default("APP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("APP_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("APP_PORT".to_string(), e.to_string()))?;

        Ok(Self {
            host,
            port,
            shopify: ShopifyAppConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShopifyAppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let app_url = get_required_env("SHOPIFY_APP_URL")?;
        let app_url = Url::parse(&app_url).map_err(|e| {
            ConfigError::InvalidEnvVar("SHOPIFY_APP_URL".to_string(), e.to_string())
        })?;

        Ok(Self {
            api_key: get_required_env("SHOPIFY_API_KEY")?,
            api_secret: get_validated_secret("SHOPIFY_API_SECRET")?,
            scopes: parse_list(&get_env_or_default("SCOPES", "")),
            app_url,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            custom_shop_domain: get_optional_env("SHOP_CUSTOM_DOMAIN")
                .map(|d| d.trim().to_ascii_lowercase())
                .filter(|d| !d.is_empty()),
            webhook_topics: parse_list(&get_env_or_default("WEBHOOK_TOPICS", "")),
        })
    }

    /// Whether `shop` is a domain this app serves.
    ///
    /// Accepts `<name>.myshopify.com` and the configured custom domain.
    #[must_use]
    pub fn is_valid_shop_domain(&self, shop: &str) -> bool {
        let shop = shop.to_ascii_lowercase();

        if self
            .custom_shop_domain
            .as_deref()
            .is_some_and(|custom| custom == shop)
        {
            return true;
        }

        shop.strip_suffix(MYSHOPIFY_SUFFIX).is_some_and(|name| {
            name.starts_with(|c: char| c.is_ascii_alphanumeric())
                && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
    }

    /// URL Shopify delivers registered webhooks to.
    #[must_use]
    pub fn webhook_callback_url(&self) -> String {
        format!("{}/webhooks", self.app_url.as_str().trim_end_matches('/'))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Split a comma-separated list, dropping blanks.
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
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

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the secret from the Partner dashboard."
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
