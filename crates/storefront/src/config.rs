//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_API_TOKEN` - Bearer token for `/api/admin/*` (min 32 chars, high entropy)
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`); only required for the `postgres` store backend
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_STORE_BACKEND` - `postgres` (default) or `memory`
//! - `STOREFRONT_ALLOWED_ORIGINS` - Comma-separated CORS origins
//! - `STOREFRONT_RATE_LIMIT` - Rate limit checkout and mail routes (default: true)
//! - `RAZORPAY_KEY_ID` / `RAZORPAY_KEY_SECRET` - Payment gateway credentials
//! - `RAZORPAY_API_BASE` - Gateway base URL (default: <https://api.razorpay.com/v1>)
//! - `SMTP_HOST`, `SMTP_PORT`, `SMTP_USERNAME`, `SMTP_PASSWORD`, `EMAIL_FROM` - Mail relay
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`
//!
//! Gateway and mail credentials are optional so the catalog can run without
//! them; the checkout and notification endpoints answer with an error until
//! they are configured.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_ADMIN_TOKEN_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
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
    #[error("Incomplete configuration: {0}")]
    Incomplete(String),
}

/// Where documents are stored.
#[derive(Debug, Clone)]
pub enum StoreBackend {
    /// `PostgreSQL` `documents` table.
    Postgres { database_url: SecretString },
    /// Process-local maps; data is lost on restart.
    Memory,
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Document store backend
    pub store: StoreBackend,
    /// Origins allowed to call the API from a browser
    pub allowed_origins: Vec<String>,
    /// Apply per-IP rate limits to checkout and mail routes
    pub rate_limit: bool,
    /// Bearer token for admin routes
    pub admin_api_token: SecretString,
    /// Payment gateway credentials
    pub razorpay: Option<RazorpayConfig>,
    /// SMTP relay for notification emails
    pub email: Option<EmailConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Fraction of errors sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Razorpay API credentials.
///
/// Implements `Debug` manually to redact the secret.
#[derive(Clone)]
pub struct RazorpayConfig {
    /// Public key id (also handed to the checkout widget)
    pub key_id: String,
    /// Secret used for API auth and payment signatures
    pub key_secret: SecretString,
    /// API base URL without trailing slash
    pub api_base: String,
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// SMTP relay settings.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    /// Sender address, e.g. `Kirana <orders@kirana.shop>`
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

impl StorefrontConfig {
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

        let host = parse_env_or_default::<IpAddr>("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env_or_default::<u16>("STOREFRONT_PORT", "3000")?;
        let store = store_backend_from_env()?;
        let allowed_origins = get_optional_env("STOREFRONT_ALLOWED_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_default();
        let rate_limit = parse_env_or_default::<bool>("STOREFRONT_RATE_LIMIT", "true")?;

        let admin_api_token = get_validated_secret("ADMIN_API_TOKEN")?;
        validate_token_length(&admin_api_token, "ADMIN_API_TOKEN")?;

        Ok(Self {
            host,
            port,
            store,
            allowed_origins,
            rate_limit,
            admin_api_token,
            razorpay: RazorpayConfig::from_env()?,
            email: EmailConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env_or_default::<f32>("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env_or_default::<f32>(
                "SENTRY_TRACES_SAMPLE_RATE",
                "0.1",
            )?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl RazorpayConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let key_id = get_optional_env("RAZORPAY_KEY_ID");
        let key_secret = get_optional_env("RAZORPAY_KEY_SECRET");

        match (key_id, key_secret) {
            (None, None) => Ok(None),
            (Some(key_id), Some(key_secret)) => {
                validate_secret_strength(&key_secret, "RAZORPAY_KEY_SECRET")?;
                let api_base = get_env_or_default("RAZORPAY_API_BASE", DEFAULT_RAZORPAY_API_BASE);
                Url::parse(&api_base).map_err(|e| {
                    ConfigError::InvalidEnvVar("RAZORPAY_API_BASE".to_string(), e.to_string())
                })?;
                Ok(Some(Self {
                    key_id,
                    key_secret: SecretString::from(key_secret),
                    api_base: api_base.trim_end_matches('/').to_string(),
                }))
            }
            _ => Err(ConfigError::Incomplete(
                "RAZORPAY_KEY_ID and RAZORPAY_KEY_SECRET must be set together".to_string(),
            )),
        }
    }
}

impl EmailConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let host = get_optional_env("SMTP_HOST");
        let username = get_optional_env("SMTP_USERNAME");
        let password = get_optional_env("SMTP_PASSWORD");
        let from = get_optional_env("EMAIL_FROM");

        match (host, username, password, from) {
            (None, None, None, None) => Ok(None),
            (Some(smtp_host), Some(smtp_username), Some(smtp_password), Some(from_address)) => {
                Ok(Some(Self {
                    smtp_host,
                    smtp_port: parse_env_or_default::<u16>("SMTP_PORT", "587")?,
                    smtp_username,
                    smtp_password: SecretString::from(smtp_password),
                    from_address,
                }))
            }
            _ => Err(ConfigError::Incomplete(
                "SMTP_HOST, SMTP_USERNAME, SMTP_PASSWORD and EMAIL_FROM must be set together"
                    .to_string(),
            )),
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Select the store backend, requiring a database URL for `postgres`.
fn store_backend_from_env() -> Result<StoreBackend, ConfigError> {
    let backend = get_env_or_default("STOREFRONT_STORE_BACKEND", "postgres");
    match backend.as_str() {
        "postgres" => Ok(StoreBackend::Postgres {
            database_url: get_database_url("STOREFRONT_DATABASE_URL")?,
        }),
        "memory" => Ok(StoreBackend::Memory),
        other => Err(ConfigError::InvalidEnvVar(
            "STOREFRONT_STORE_BACKEND".to_string(),
            format!("unknown backend '{other}' (expected postgres or memory)"),
        )),
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('/').to_string())
        .collect()
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env_or_default<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a bearer token meets minimum length requirements.
fn validate_token_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_ADMIN_TOKEN_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_ADMIN_TOKEN_LENGTH,
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
    let len = s.chars().count() as f64;
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
    fn test_shannon_entropy_uniform() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("changeme-razorpay-key", "RAZORPAY_KEY_SECRET")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        assert!(validate_secret_strength(&"ab".repeat(20), "ADMIN_API_TOKEN").is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        assert!(
            validate_secret_strength("Qm7$kR2!vX9@pL4#tN8^wZ3&", "RAZORPAY_KEY_SECRET").is_ok()
        );
    }

    #[test]
    fn test_validate_token_length() {
        assert!(validate_token_length(&SecretString::from("short"), "ADMIN_API_TOKEN").is_err());
        let token = SecretString::from("k".repeat(32));
        assert!(validate_token_length(&token, "ADMIN_API_TOKEN").is_ok());
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins(" https://kirana.shop/, ,http://localhost:5173"),
            vec!["https://kirana.shop", "http://localhost:5173"]
        );
    }

    #[test]
    fn test_razorpay_config_debug_redacts_secret() {
        let config = RazorpayConfig {
            key_id: "rzp_test_Kc81a".to_string(),
            key_secret: SecretString::from("super_secret_gateway_key"),
            api_base: DEFAULT_RAZORPAY_API_BASE.to_string(),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("rzp_test_Kc81a"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_gateway_key"));
    }

    #[test]
    fn test_email_config_debug_redacts_password() {
        let config = EmailConfig {
            smtp_host: "smtp.mailgun.org".to_string(),
            smtp_port: 587,
            smtp_username: "postmaster@kirana.shop".to_string(),
            smtp_password: SecretString::from("smtp_pw_value"),
            from_address: "Kirana <orders@kirana.shop>".to_string(),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("smtp.mailgun.org"));
        assert!(!debug_output.contains("smtp_pw_value"));
    }
}
