//! Registry client configuration.
//!
//! The base URL defaults to a local registry. Override via environment
//! variables or explicit construction for staging and tests.

use url::Url;
use zeroize::Zeroizing;

/// Default registry base URL.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for connecting to the AI system registry.
///
/// Custom `Debug` implementation redacts the `api_token` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the registry. Always ends with `/`.
    pub base_url: Url,
    /// Optional bearer token. Zeroed on drop.
    pub api_token: Option<Zeroizing<String>>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    /// Build a configuration for `base_url` with no token and the default timeout.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("base_url", base_url)?,
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `AIRA_API_URL` (default: `http://127.0.0.1:8000`)
    /// - `AIRA_API_TOKEN` (optional)
    /// - `AIRA_TIMEOUT_SECS` (default: 30)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("AIRA_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let timeout_secs = match std::env::var("AIRA_TIMEOUT_SECS") {
            Ok(s) => s
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(s.clone()))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            base_url: parse_base_url("AIRA_API_URL", &raw)?,
            api_token: std::env::var("AIRA_API_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty())
                .map(Zeroizing::new),
            timeout_secs,
        })
    }

    /// Create a configuration pointing at a local mock server (for testing).
    pub fn local_mock(port: u16, token: Option<&str>) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url("localhost", &format!("http://127.0.0.1:{port}"))?,
            api_token: token.map(|t| Zeroizing::new(t.to_string())),
            timeout_secs: 5,
        })
    }

    /// Replace the bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(Zeroizing::new(token.into()));
        self
    }
}

/// Parse a base URL and make sure its path ends with `/`, so resource paths
/// append rather than replace the last segment.
fn parse_base_url(source: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidUrl(source.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(source.to_string(), "not a base URL".into()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("AIRA_TIMEOUT_SECS must be a whole number of seconds, got {0:?}")]
    InvalidTimeout(String),
    #[error("API token contains characters not allowed in an HTTP header")]
    InvalidToken,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_mock_builds_valid_config() {
        let cfg = ClientConfig::local_mock(9000, Some("test-token")).unwrap();
        assert_eq!(cfg.api_token.as_deref().map(String::as_str), Some("test-token"));
        assert_eq!(cfg.timeout_secs, 5);
        assert_eq!(cfg.base_url.as_str(), "http://127.0.0.1:9000/");
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let cfg = ClientConfig::new("https://registry.example.com/api").unwrap();
        assert_eq!(cfg.base_url.as_str(), "https://registry.example.com/api/");
        let cfg = ClientConfig::new("https://registry.example.com/api/").unwrap();
        assert_eq!(cfg.base_url.as_str(), "https://registry.example.com/api/");
    }

    #[test]
    fn invalid_url_is_rejected() {
        assert!(matches!(
            ClientConfig::new("not a url"),
            Err(ConfigError::InvalidUrl(..))
        ));
        assert!(ClientConfig::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = ClientConfig::local_mock(9000, Some("super-secret")).unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
