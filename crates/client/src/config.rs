//! Client configuration.

use std::time::Duration;

/// Environment variable overriding the API base URL.
pub const API_BASE_ENV: &str = "API_BASE";

/// Base URL used when nothing is configured.
pub const DEFAULT_API_BASE: &str = "http://localhost:8080";

/// Configuration for [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, without a trailing slash.
    pub base_url: String,

    /// Per-request timeout. A request exceeding it fails as a transport
    /// error and is never retried.
    pub timeout: Duration,

    /// Maximum idle connections kept per host.
    pub pool_max_idle_per_host: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 64,
        }
    }
}

impl ClientConfig {
    /// Create a config for the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base(base_url.into()),
            ..Default::default()
        }
    }

    /// Create a config from `API_BASE`, falling back to the default.
    pub fn from_env() -> Self {
        match std::env::var(API_BASE_ENV) {
            Ok(base) if !base.trim().is_empty() => Self::new(base.trim()),
            _ => Self::default(),
        }
    }

    /// Point at a different API, keeping timeout and pool settings.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = normalize_base(base_url.into());
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the idle connection pool size.
    pub fn with_pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.pool_max_idle_per_host = max;
        self
    }
}

fn normalize_base(base: String) -> String {
    base.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = ClientConfig::new("http://api.local:8080/");
        assert_eq!(config.base_url, "http://api.local:8080");
    }

    #[test]
    fn test_with_base_url_keeps_other_settings() {
        let config = ClientConfig::default()
            .with_timeout(Duration::from_secs(2))
            .with_pool_max_idle_per_host(8)
            .with_base_url("http://other:9000/");
        assert_eq!(config.base_url, "http://other:9000");
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.pool_max_idle_per_host, 8);
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_API_BASE);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }
}
