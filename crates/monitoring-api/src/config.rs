//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can start with zero
//! configuration against a local backend.

use std::path::PathBuf;
use std::time::Duration;

use monitoring_shared::constants::{DEFAULT_BASE_URL, DEFAULT_HUB_PATH, DEFAULT_PAGE_SIZE};

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, without a trailing slash.
    /// Env: `MONITORING_BASE_URL`
    /// Default: `http://localhost:5100`
    pub base_url: String,

    /// Path of the real-time chat hub.
    /// Env: `MONITORING_HUB_PATH`
    /// Default: `/chatHub`
    pub hub_path: String,

    /// Work item page size.
    /// Env: `MONITORING_PAGE_SIZE`
    /// Default: `50`
    pub page_size: u32,

    /// Per-request timeout.
    /// Env: `MONITORING_TIMEOUT_SECS`
    /// Default: none (wait for the transport).
    pub request_timeout: Option<Duration>,

    /// Where the persisted credentials live.
    /// Env: `MONITORING_CREDENTIALS_PATH`
    /// Default: none (platform data directory).
    pub credentials_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            hub_path: DEFAULT_HUB_PATH.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout: None,
            credentials_path: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("MONITORING_BASE_URL") {
            let url = url.trim().trim_end_matches('/');
            if url.starts_with("http://") || url.starts_with("https://") {
                config.base_url = url.to_string();
            } else {
                tracing::warn!(value = %url, "Invalid MONITORING_BASE_URL, using default");
            }
        }

        if let Some(path) = lookup("MONITORING_HUB_PATH") {
            config.hub_path = if path.starts_with('/') {
                path
            } else {
                format!("/{path}")
            };
        }

        if let Some(val) = lookup("MONITORING_PAGE_SIZE") {
            match val.parse::<u32>() {
                Ok(n) if n > 0 => config.page_size = n,
                _ => tracing::warn!(value = %val, "Invalid MONITORING_PAGE_SIZE, using default"),
            }
        }

        if let Some(val) = lookup("MONITORING_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(0) => config.request_timeout = None,
                Ok(secs) => config.request_timeout = Some(Duration::from_secs(secs)),
                Err(_) => tracing::warn!(value = %val, "Invalid MONITORING_TIMEOUT_SECS, ignoring"),
            }
        }

        if let Some(path) = lookup("MONITORING_CREDENTIALS_PATH") {
            if !path.is_empty() {
                config.credentials_path = Some(PathBuf::from(path));
            }
        }

        config
    }

    /// Full URL of the chat hub endpoint.
    pub fn hub_url(&self) -> String {
        format!("{}{}", self.base_url, self.hub_path)
    }
}
