//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_STATE_FILE: &str = ".labtrack/state.json";

/// Errors raised while building a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The API base URL is not an `http://` or `https://` URL.
    #[error("invalid API URL: {0}")]
    InvalidApiUrl(String),
}

impl ConfigError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidApiUrl(_) => "E_INVALID_API_URL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL every API path is appended to, without a trailing slash.
    pub api_url: String,
    pub timeouts: Timeouts,
    /// JSON file backing the persisted session record and token pair.
    pub state_file: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            timeouts: Timeouts::default(),
            state_file: PathBuf::from(DEFAULT_STATE_FILE),
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `LABTRACK_API_URL`: default `http://localhost:3000/api`
    /// - `LABTRACK_REQUEST_TIMEOUT_SECS`: default 30
    /// - `LABTRACK_CONNECT_TIMEOUT_SECS`: default 10
    /// - `LABTRACK_STATE_FILE`: default `.labtrack/state.json`
    ///
    /// # Errors
    ///
    /// Returns an error if `LABTRACK_API_URL` is not an HTTP(S) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = normalize_api_url(
            &std::env::var("LABTRACK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned()),
        )?;
        let timeouts = Timeouts {
            request_secs: env_parse_u64("LABTRACK_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("LABTRACK_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let state_file = std::env::var("LABTRACK_STATE_FILE")
            .map_or_else(|_| PathBuf::from(DEFAULT_STATE_FILE), PathBuf::from);

        Ok(Self { api_url, timeouts, state_file })
    }

    /// Replace the API base URL, applying the same checks as [`Self::from_env`].
    ///
    /// # Errors
    ///
    /// Returns an error if `api_url` is not an HTTP(S) URL.
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self, ConfigError> {
        self.api_url = normalize_api_url(api_url)?;
        Ok(self)
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_owned())
    } else {
        Err(ConfigError::InvalidApiUrl(raw.to_owned()))
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
