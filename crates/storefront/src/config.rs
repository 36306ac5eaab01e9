//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `MEGACART_API_URL` - Backend API base URL (default: `http://localhost:8000/api`)
//! - `MEGACART_HEALTH_URL` - Connectivity probe URL (default: `<api origin>/health`)
//! - `MEGACART_TOKEN_PATH` - File holding the bearer token (default: `$HOME/.megacart/token`)
//! - `MEGACART_CACHE_TTL_SECS` - Catalog cache lifetime in seconds (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const TOKEN_DIR: &str = ".megacart";
const TOKEN_FILE: &str = "token";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend endpoints
    pub api: ApiConfig,
    /// Where the bearer token is persisted between runs
    pub token_path: PathBuf,
    /// How long fetched products and categories are reused
    pub cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production", "staging")
    pub sentry_environment: Option<String>,
}

/// Backend endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL that `/products`, `/categories` and `/auth/*` hang off
    pub base_url: Url,
    /// Liveness endpoint used for the connectivity indicator
    pub health_url: Url,
}

impl ApiConfig {
    /// Build endpoint configuration for `base_url`, deriving the health URL
    /// from its origin.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the URL does not parse or is not http(s).
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = parse_http_url("MEGACART_API_URL", base_url)?;
        let health_url = default_health_url(&base_url);
        Ok(Self {
            base_url,
            health_url,
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let base_url = parse_http_url(
            "MEGACART_API_URL",
            &get("MEGACART_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        )?;
        let health_url = match get("MEGACART_HEALTH_URL") {
            Some(value) => parse_http_url("MEGACART_HEALTH_URL", &value)?,
            None => default_health_url(&base_url),
        };

        let token_path = get("MEGACART_TOKEN_PATH").map_or_else(
            || default_token_path(get("HOME").as_deref()),
            PathBuf::from,
        );

        let cache_ttl = match get("MEGACART_CACHE_TTL_SECS") {
            Some(value) => value.trim().parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("MEGACART_CACHE_TTL_SECS".to_string(), e.to_string())
            })?,
            None => DEFAULT_CACHE_TTL_SECS,
        };

        Ok(Self {
            api: ApiConfig {
                base_url,
                health_url,
            },
            token_path,
            cache_ttl: Duration::from_secs(cache_ttl),
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a URL and require an http(s) scheme.
fn parse_http_url(var_name: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

/// `/health` on the API origin, which is where the backend mounts its probe.
fn default_health_url(base_url: &Url) -> Url {
    let mut url = base_url.clone();
    url.set_path("/health");
    url.set_query(None);
    url.set_fragment(None);
    url
}

fn default_token_path(home: Option<&str>) -> PathBuf {
    home.map_or_else(|| PathBuf::from(TOKEN_DIR), |home| PathBuf::from(home).join(TOKEN_DIR))
        .join(TOKEN_FILE)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:8000/api");
        assert_eq!(config.api.health_url.as_str(), "http://localhost:8000/health");
        assert_eq!(config.token_path, PathBuf::from(".megacart/token"));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_token_path_under_home() {
        let config = load(&[("HOME", "/home/shopper")]).unwrap();
        assert_eq!(
            config.token_path,
            PathBuf::from("/home/shopper/.megacart/token")
        );

        let config = load(&[("MEGACART_TOKEN_PATH", "/tmp/t")]).unwrap();
        assert_eq!(config.token_path, PathBuf::from("/tmp/t"));
    }

    #[test]
    fn test_health_url_follows_api_origin() {
        let config = load(&[("MEGACART_API_URL", "https://shop.example.in/v1/api?x=1")]).unwrap();
        assert_eq!(
            config.api.health_url.as_str(),
            "https://shop.example.in/health"
        );

        let config = load(&[
            ("MEGACART_API_URL", "https://shop.example.in/api"),
            ("MEGACART_HEALTH_URL", "https://status.example.in/ping"),
        ])
        .unwrap();
        assert_eq!(
            config.api.health_url.as_str(),
            "https://status.example.in/ping"
        );
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = load(&[("MEGACART_API_URL", "  "), ("SENTRY_DSN", "")]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://localhost:8000/api");
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            load(&[("MEGACART_API_URL", "not a url")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            load(&[("MEGACART_API_URL", "ftp://files.example.in/")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            load(&[("MEGACART_CACHE_TTL_SECS", "five")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }

    #[test]
    fn test_api_config_new() {
        let api = ApiConfig::new("http://127.0.0.1:9000/api").unwrap();
        assert_eq!(api.health_url.as_str(), "http://127.0.0.1:9000/health");
        assert!(ApiConfig::new("mailto:shop@example.in").is_err());
    }
}
