//! Client configuration.
//!
//! Everything the client needs to know about its backend lives in
//! [`ClientConfig`], built once at process start (usually through
//! [`ClientConfig::from_env`]) and handed to
//! [`crate::client::ConversionClient::new`]. Tests construct their own
//! config pointing at a mock backend; nothing is read from global state
//! after construction.

use crate::error::{ConverterError, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the backend base URL.
pub const API_URL_ENV: &str = "CONVERTER_API_URL";

/// Base URL used when [`API_URL_ENV`] is unset or empty.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// Configuration for a [`crate::client::ConversionClient`].
///
/// # Example
/// ```rust
/// use docconv_client::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("http://converter.internal:8000/")
///     .conversion_timeout_secs(600)
///     .build()
///     .unwrap();
/// assert_eq!(config.base_url, "http://converter.internal:8000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash. Default: [`DEFAULT_API_URL`].
    pub base_url: String,

    /// Timeout for `GET /health` in seconds. Default: 10.
    pub health_timeout_secs: u64,

    /// Timeout for conversion uploads in seconds. Default: 300.
    ///
    /// Conversion is server-side compute on the whole document, so the
    /// request stays open far longer than a plain API call would.
    pub conversion_timeout_secs: u64,

    /// Timeout for `GET /download/{filename}` in seconds. Default: 60.
    pub download_timeout_secs: u64,

    /// Size of each upload body chunk in bytes. Default: 64 KiB.
    ///
    /// One progress tick is emitted per chunk handed to the transport.
    pub upload_chunk_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            health_timeout_secs: 10,
            conversion_timeout_secs: 300,
            download_timeout_secs: 60,
            upload_chunk_size: 64 * 1024,
        }
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Default configuration with the base URL taken from [`API_URL_ENV`].
    pub fn from_env() -> Result<Self> {
        let value = std::env::var(API_URL_ENV).ok();
        Self::builder().base_url(resolve_base_url(value.as_deref())).build()
    }
}

/// Pick the configured base URL, falling back to [`DEFAULT_API_URL`].
fn resolve_base_url(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => DEFAULT_API_URL,
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim().trim_end_matches('/').to_string();
        self
    }

    pub fn health_timeout_secs(mut self, secs: u64) -> Self {
        self.config.health_timeout_secs = secs;
        self
    }

    pub fn conversion_timeout_secs(mut self, secs: u64) -> Self {
        self.config.conversion_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn upload_chunk_size(mut self, bytes: usize) -> Self {
        self.config.upload_chunk_size = bytes.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig> {
        let c = &self.config;
        let url = Url::parse(&c.base_url).map_err(|e| {
            ConverterError::InvalidConfig(format!("base URL '{}' is not valid: {e}", c.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConverterError::InvalidConfig(format!(
                "base URL must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if c.health_timeout_secs == 0
            || c.conversion_timeout_secs == 0
            || c.download_timeout_secs == 0
        {
            return Err(ConverterError::InvalidConfig(
                "Timeouts must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend_contract() {
        let c = ClientConfig::default();
        assert_eq!(c.base_url, "http://127.0.0.1:5000");
        assert_eq!(c.health_timeout_secs, 10);
        assert_eq!(c.conversion_timeout_secs, 300);
        assert_eq!(c.download_timeout_secs, 60);
    }

    #[test]
    fn env_value_falls_back_when_missing_or_blank() {
        assert_eq!(resolve_base_url(None), DEFAULT_API_URL);
        assert_eq!(resolve_base_url(Some("   ")), DEFAULT_API_URL);
        assert_eq!(
            resolve_base_url(Some("https://api.example.com")),
            "https://api.example.com"
        );
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let c = ClientConfig::builder()
            .base_url("http://localhost:8000///")
            .build()
            .unwrap();
        assert_eq!(c.base_url, "http://localhost:8000");
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = ClientConfig::builder()
            .base_url("ftp://files.example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConverterError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_garbage_url() {
        let err = ClientConfig::builder().base_url("not a url").build().unwrap_err();
        assert!(err.to_string().contains("not a url"));
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = ClientConfig::builder()
            .download_timeout_secs(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConverterError::InvalidConfig(_)));
    }

    #[test]
    fn chunk_size_is_at_least_one() {
        let c = ClientConfig::builder().upload_chunk_size(0).build().unwrap();
        assert_eq!(c.upload_chunk_size, 1);
    }
}
