//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `PETALBOX_API_URL` - Backend REST base URL (default: `http://localhost:5000/api`)
//! - `PETALBOX_API_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `PETALBOX_SESSION_FILE` - Where the session is persisted
//!   (default: `$HOME/.petalbox/session.json`, or `./.petalbox-session.json`
//!   when `HOME` is unset)
//! - `PETALBOX_LOGIN_PATH` - Sign-in route used for gate redirects (default: `/login`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT_SECS: &str = "10";
const DEFAULT_LOGIN_PATH: &str = "/login";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Petalbox client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend REST base URL, always without a trailing slash
    pub api_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// Session persistence file
    pub session_file: PathBuf,
    /// Sign-in route for gate redirects
    pub login_path: String,
}

impl ClientConfig {
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

        let api_url = parse_api_url(&get_env_or_default("PETALBOX_API_URL", DEFAULT_API_URL))?;
        let timeout = parse_timeout(&get_env_or_default(
            "PETALBOX_API_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        ))?;
        let session_file = get_optional_env("PETALBOX_SESSION_FILE")
            .map_or_else(default_session_file, PathBuf::from);
        let login_path = get_env_or_default("PETALBOX_LOGIN_PATH", DEFAULT_LOGIN_PATH);

        Ok(Self {
            api_url,
            timeout,
            session_file,
            login_path,
        })
    }

    /// Configuration pointing at `api_url` with defaults for everything else.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `api_url` is not an absolute http(s) URL.
    pub fn for_api_url(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            timeout: Duration::from_secs(10),
            session_file: default_session_file(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        })
    }

    /// Cart file stored beside the session file.
    #[must_use]
    pub fn cart_file(&self) -> PathBuf {
        self.session_file.with_file_name("cart.json")
    }
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("PETALBOX_API_URL".to_string(), reason);

    let url = Url::parse(raw.trim().trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    Ok(url)
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let secs = raw.trim().parse::<u64>().map_err(|e| {
        ConfigError::InvalidEnvVar("PETALBOX_API_TIMEOUT_SECS".to_string(), e.to_string())
    })?;
    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            "PETALBOX_API_TIMEOUT_SECS".to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_secs(secs))
}

fn default_session_file() -> PathBuf {
    get_optional_env("HOME").map_or_else(
        || PathBuf::from(".petalbox-session.json"),
        |home| PathBuf::from(home).join(".petalbox").join("session.json"),
    )
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_trailing_slash_trimmed() {
        let url = parse_api_url("https://api.petalbox.shop/api/").unwrap();
        assert_eq!(url.as_str(), "https://api.petalbox.shop/api");
    }

    #[test]
    fn test_api_url_rejects_non_http() {
        assert!(matches!(
            parse_api_url("ftp://example.com"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(parse_api_url("not a url").is_err());
    }

    #[test]
    fn test_timeout_parsing() {
        assert_eq!(parse_timeout("15").unwrap(), Duration::from_secs(15));
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("soon").is_err());
    }

    #[test]
    fn test_cart_file_beside_session() {
        let mut config = ClientConfig::for_api_url("http://localhost:5000/api").unwrap();
        config.session_file = PathBuf::from("/tmp/petal/session.json");
        assert_eq!(config.cart_file(), PathBuf::from("/tmp/petal/cart.json"));
    }
}
