//! Configuration for the MentorIA client.
//!
//! Settings are read from `mentoria.json` in the working directory. Every field
//! has a default, so a missing file yields a usable configuration. The backend
//! URL can be overridden at runtime with the `MENTORIA_API_URL` environment
//! variable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use mentoria_api::{ClientOptions, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// The default config file name.
pub const CONFIG_FILE_NAME: &str = "mentoria.json";

/// Environment variable overriding `apiBaseUrl`.
pub const API_URL_ENV: &str = "MENTORIA_API_URL";

/// Default backend base URL.
fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Default per-request timeout in seconds.
const fn default_request_timeout() -> u64 {
    30
}

/// Default cap on session restoration in milliseconds.
const fn default_auth_init_timeout() -> u64 {
    10_000
}

/// Default client-side upload cap in megabytes.
const fn default_max_upload_mb() -> u64 {
    50
}

/// Default token file path.
fn default_token_file() -> String {
    ".mentoria/session.json".to_string()
}

/// Default store event buffer per subscriber.
const fn default_event_capacity() -> usize {
    64
}

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Base URL of the backend API.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Upper bound on restoring a persisted session, in milliseconds.
    #[serde(default = "default_auth_init_timeout")]
    pub auth_init_timeout_ms: u64,

    /// Client-side upload cap in megabytes.
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u64,

    /// Path of the file holding the persisted bearer token.
    #[serde(default = "default_token_file")]
    pub token_file: String,

    /// Number of store events buffered per subscriber.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout(),
            auth_init_timeout_ms: default_auth_init_timeout(),
            max_upload_mb: default_max_upload_mb(),
            token_file: default_token_file(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl Config {
    /// Loads configuration from the current working directory.
    ///
    /// Looks for `mentoria.json` in the current directory. If not found,
    /// returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load() -> Result<Self> {
        let current_dir = std::env::current_dir().map_err(|e| {
            StoreError::config_parse(
                "<current directory>",
                format!("cannot determine current directory: {e}"),
            )
        })?;
        Self::load_from_dir(&current_dir)
    }

    /// Loads configuration from `mentoria.json` in a specific directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but contains invalid JSON.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_file(&dir.join(CONFIG_FILE_NAME))
    }

    /// Loads configuration from a specific file path.
    ///
    /// If the file does not exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConfigParseError` if the file exists but cannot be
    /// read or contains invalid JSON.
    ///
    /// Returns `StoreError::ConfigValidationError` if the configuration values
    /// are invalid (e.g., zero timeouts, empty paths).
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Self::default();
                config.validate()?;
                return Ok(config);
            }
            Err(e) => {
                return Err(StoreError::config_parse(
                    path,
                    format!("failed to read file: {e}"),
                ));
            }
        };

        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| StoreError::config_parse(path, e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides (`MENTORIA_API_URL`).
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_api_url_override(std::env::var(API_URL_ENV).ok())
    }

    /// Replaces `api_base_url` when an override is given and non-blank.
    #[must_use]
    pub fn with_api_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        self
    }

    /// Validates the configuration values.
    ///
    /// Checks that:
    /// - `api_base_url` is an `http(s)` URL
    /// - `request_timeout_secs`, `auth_init_timeout_ms` and `max_upload_mb`
    ///   are greater than 0
    /// - `token_file` is not empty
    /// - `event_capacity` is greater than 0
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConfigValidationError` if any check fails.
    pub fn validate(&self) -> Result<()> {
        let url = self.api_base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(StoreError::config_validation(
                format!("apiBaseUrl must be an http(s) URL, got '{url}'"),
                "Set apiBaseUrl to e.g. http://localhost:8000/api/v1 in your mentoria.json",
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(StoreError::config_validation(
                "requestTimeoutSecs must be greater than 0",
                "Set requestTimeoutSecs to at least 1 second in your mentoria.json",
            ));
        }

        if self.auth_init_timeout_ms == 0 {
            return Err(StoreError::config_validation(
                "authInitTimeoutMs must be greater than 0",
                "Set authInitTimeoutMs to e.g. 10000 in your mentoria.json",
            ));
        }

        if self.max_upload_mb == 0 {
            return Err(StoreError::config_validation(
                "maxUploadMb must be greater than 0",
                "Set maxUploadMb to at least 1 in your mentoria.json",
            ));
        }

        if self.token_file.trim().is_empty() {
            return Err(StoreError::config_validation(
                "tokenFile must not be empty",
                "Provide a path for the session file in your mentoria.json",
            ));
        }

        if self.event_capacity == 0 {
            return Err(StoreError::config_validation(
                "eventCapacity must be greater than 0",
                "Set eventCapacity to at least 1 in your mentoria.json",
            ));
        }

        Ok(())
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Upper bound on restoring a persisted session.
    #[must_use]
    pub const fn auth_init_timeout(&self) -> Duration {
        Duration::from_millis(self.auth_init_timeout_ms)
    }

    /// Upload cap in bytes.
    #[must_use]
    pub const fn max_upload_bytes(&self) -> u64 {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    /// Token file path.
    #[must_use]
    pub fn token_path(&self) -> PathBuf {
        PathBuf::from(&self.token_file)
    }

    /// HTTP client options derived from this configuration.
    #[must_use]
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions::new(self.api_base_url.clone()).with_timeout(self.request_timeout())
    }
}
