//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STORE_API_BASE_URL` - Base URL of the remote store API
//!
//! ## Optional
//! - `STORE_APP_NAME` - Display name (default: Clementine)
//! - `STORE_PER_PAGE` - Default product page size (default: 12)
//! - `STORE_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `STORE_RETRY` - Retries for failed GET requests (default: 1)
//! - `STORE_CACHE_TTL_SECS` - Cache freshness window (default: 300)
//! - `STORE_CACHE_CAPACITY` - Max cached entries (default: 1000)
//! - `STORE_DATA_DIR` - Durable storage directory (default: platform data dir)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Maximum page size the remote API accepts.
pub const MAX_PER_PAGE: u32 = 100;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Base URL of the remote store API.
    pub api_base_url: Url,
    /// Display name shown by consuming UIs.
    pub app_name: String,
    /// Default page size for product listings.
    pub per_page: u32,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Number of retries for failed GET requests (no backoff).
    pub retry: u32,
    /// Freshness window for cached reads.
    pub cache_ttl: Duration,
    /// Maximum number of cached entries.
    pub cache_capacity: u64,
    /// Durable storage directory; `None` selects the platform data dir.
    pub data_dir: Option<PathBuf>,
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_required_env("STORE_API_BASE_URL")?
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STORE_API_BASE_URL".to_owned(), e.to_string())
            })?;

        let per_page = get_parsed_or("STORE_PER_PAGE", 12)?;
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(ConfigError::InvalidEnvVar(
                "STORE_PER_PAGE".to_owned(),
                format!("must be between 1 and {MAX_PER_PAGE}"),
            ));
        }

        Ok(Self {
            api_base_url,
            app_name: get_env_or_default("STORE_APP_NAME", "Clementine"),
            per_page,
            timeout: Duration::from_secs(get_parsed_or("STORE_TIMEOUT_SECS", 10)?),
            retry: get_parsed_or("STORE_RETRY", 1)?,
            cache_ttl: Duration::from_secs(get_parsed_or("STORE_CACHE_TTL_SECS", 300)?),
            cache_capacity: get_parsed_or("STORE_CACHE_CAPACITY", 1000)?,
            data_dir: get_optional_env("STORE_DATA_DIR").map(PathBuf::from),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_owned()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse an environment variable, falling back to `default` when unset.
fn get_parsed_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string())),
        Err(_) => Ok(default),
    }
}
