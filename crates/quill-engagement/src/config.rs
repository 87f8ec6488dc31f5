//! Engagement configuration.

use std::env;
use std::time::Duration;

use crate::error::{EngagementError, EngagementResult};

/// Configuration for the backend adapter and page shell.
#[derive(Debug, Clone)]
pub struct EngagementConfig {
    /// Base URL of the REST backend (without trailing slash)
    pub api_base_url: String,
    /// Public site URL used to build share links
    pub site_url: String,
    /// Whole-request timeout
    pub request_timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:5000/api".to_string(),
            site_url: "http://localhost:3000".to_string(),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(2),
        }
    }
}

impl EngagementConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `QUILL_API_URL`: Backend base URL (default: http://127.0.0.1:5000/api)
    /// - `QUILL_SITE_URL`: Public site URL (default: http://localhost:3000)
    /// - `QUILL_HTTP_TIMEOUT_SECS`: Request timeout (default: 5)
    /// - `QUILL_CONNECT_TIMEOUT_SECS`: Connect timeout (default: 2)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_base_url: env::var("QUILL_API_URL")
                .map(|v| trim_base(&v))
                .unwrap_or(defaults.api_base_url),

            site_url: env::var("QUILL_SITE_URL")
                .map(|v| trim_base(&v))
                .unwrap_or(defaults.site_url),

            request_timeout: env::var("QUILL_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),

            connect_timeout: env::var("QUILL_CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
        }
    }

    pub fn with_api_base_url(mut self, url: &str) -> Self {
        self.api_base_url = trim_base(url);
        self
    }

    pub fn with_site_url(mut self, url: &str) -> Self {
        self.site_url = trim_base(url);
        self
    }

    /// Reject URLs the HTTP adapter cannot use.
    pub fn validate(&self) -> EngagementResult<()> {
        for (name, url) in [("api_base_url", &self.api_base_url), ("site_url", &self.site_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(EngagementError::Config(format!(
                    "{name} must be an http(s) URL, got {url:?}"
                )));
            }
        }
        if self.request_timeout.is_zero() {
            return Err(EngagementError::Config(
                "request_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn trim_base(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EngagementConfig::default().validate().is_ok());
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = EngagementConfig::default().with_api_base_url("https://api.example.com/v1/");
        assert_eq!(config.api_base_url, "https://api.example.com/v1");
    }

    #[test]
    fn test_non_http_url_rejected() {
        let config = EngagementConfig::default().with_site_url("ftp://example.com");
        assert!(matches!(config.validate(), Err(EngagementError::Config(_))));
    }
}
