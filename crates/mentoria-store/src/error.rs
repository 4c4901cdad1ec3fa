//! Error types for the MentorIA store.
//!
//! Operation failures coming from the backend stay [`ClientError`]s so they can
//! be kept in state as-is; this module only adds the failures that happen
//! before a store exists (configuration) and a wrapper for setup errors.

use std::path::PathBuf;

use mentoria_api::ClientError;

/// A specialized `Result` type for store setup.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised while configuring and building a store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid JSON syntax in the configuration file.
    #[error("Invalid JSON in config file '{path}': {message}\n\nSuggestion: Validate your mentoria.json with a JSON linter")]
    ConfigParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Description of the parse error.
        message: String,
    },

    /// Configuration validation failed.
    #[error("Invalid configuration: {message}\n\nSuggestion: {suggestion}")]
    ConfigValidationError {
        /// Description of the validation failure.
        message: String,
        /// Actionable suggestion for the user.
        suggestion: String,
    },

    // ========================================================================
    // Client Errors
    // ========================================================================
    /// The API client could not be built.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl StoreError {
    /// Creates a new `ConfigParseError`.
    #[must_use]
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new `ConfigValidationError`.
    #[must_use]
    pub fn config_validation(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::ConfigValidationError {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Returns `true` if the error comes from configuration loading.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(
            self,
            Self::ConfigParseError { .. } | Self::ConfigValidationError { .. }
        )
    }
}
