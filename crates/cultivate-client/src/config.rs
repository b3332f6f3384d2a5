//! API client configuration.
//!
//! A single base URL (all endpoints hang off it) and a per-request timeout.
//! Defaults point at a local development backend. Override via environment
//! variables or explicit construction for staging/testing.

use url::Url;

/// Default base URL when `CULTIVATE_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration for connecting to the CultivateCo API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every request path is appended to, e.g. `https://api.cultivateco.com/api`.
    pub base_url: Url,
    /// Request timeout in seconds. Applies to every call, including refresh.
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Build a configuration from an explicit base URL with the default timeout.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_url("base_url", base_url)?,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `CULTIVATE_API_URL` (default: `http://localhost:3001/api`)
    /// - `CULTIVATE_TIMEOUT_SECS` (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("CULTIVATE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let timeout_secs = match std::env::var("CULTIVATE_TIMEOUT_SECS") {
            Ok(s) => s
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(s.clone()))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            base_url: parse_url("CULTIVATE_API_URL", &raw)?,
            timeout_secs,
        })
    }

    /// Configuration pointing at a local server on `port` (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the localhost URL cannot be parsed
    /// (should not occur for valid port numbers, but avoids `expect()`).
    pub fn local(port: u16) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_url("localhost", &format!("http://127.0.0.1:{port}/api"))?,
            timeout_secs: 5,
        })
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

fn parse_url(name: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(name.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(
            name.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }
    Ok(url)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
    #[error("CULTIVATE_TIMEOUT_SECS must be a whole number of seconds, got {0:?}")]
    InvalidTimeout(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_builds_valid_config() {
        let cfg = ClientConfig::local(9000).unwrap();
        assert_eq!(cfg.base_url.as_str(), "http://127.0.0.1:9000/api");
        assert_eq!(cfg.timeout_secs, 5);
    }

    #[test]
    fn new_uses_default_timeout() {
        let cfg = ClientConfig::new("https://api.example.com/api/").unwrap();
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cfg.with_timeout(2).timeout_secs, 2);
    }

    #[test]
    fn rejects_invalid_and_non_base_urls() {
        assert!(ClientConfig::new("not a url").is_err());
        assert!(ClientConfig::new("mailto:ops@example.com").is_err());
    }
}
