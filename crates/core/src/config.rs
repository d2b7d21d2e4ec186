//! # Client Configuration
//!
//! Where the analysis service lives and how long to wait for it.
//!
//! ## Environment
//! - `FOUNDERSLENS_API_URL` - service base URL (default `http://127.0.0.1:8000`)
//! - `FOUNDERSLENS_TIMEOUT_SECS` - request timeout in seconds (default 120)
//! - `FOUNDERSLENS_API_KEY` - credential sent as `custom_api_key` on every request

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for reaching the analysis service
///
/// ## Example
/// ```rust,ignore
/// use founderslens_core::config::ClientConfig;
///
/// let config = ClientConfig::new("https://lens.example.com")
///     .with_timeout_secs(30)
///     .with_api_key("sk-...");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the service, without the `/analyze` path
    pub base_url: String,
    /// Whole-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Default credential, used until a retry supplies a different one
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Load from `FOUNDERSLENS_*` environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("FOUNDERSLENS_API_URL") {
            if !url.trim().is_empty() {
                config.base_url = url.trim().to_string();
            }
        }
        if let Ok(secs) = std::env::var("FOUNDERSLENS_TIMEOUT_SECS") {
            config.timeout_secs = secs
                .trim()
                .parse()
                .with_context(|| format!("Invalid FOUNDERSLENS_TIMEOUT_SECS: {}", secs))?;
        }
        if let Ok(key) = std::env::var("FOUNDERSLENS_API_KEY") {
            if !key.trim().is_empty() {
                config.api_key = Some(key.trim().to_string());
            }
        }

        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full URL of the analyze endpoint
    pub fn analyze_url(&self) -> String {
        format!("{}/analyze", self.base_url.trim_end_matches('/'))
    }

    /// Full URL of the health check
    pub fn health_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(120));
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_endpoint_urls() {
        let config = ClientConfig::new("https://lens.example.com/");
        assert_eq!(config.analyze_url(), "https://lens.example.com/analyze");
        assert_eq!(config.health_url(), "https://lens.example.com/");
    }

    #[test]
    fn test_config_deserialization_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url": "http://localhost:9000"}"#).unwrap();
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.api_key.is_none());
    }
}
