//! Error types for the MentorIA API client.
//!
//! Every service call fails with a [`ClientError`]. The variants form a small,
//! stable taxonomy (see [`ErrorKind`]) so that state containers can store the
//! error as-is and views can decide how to render it without inspecting
//! transport details.

use serde::{Deserialize, Serialize};

use crate::id::EntityId;

/// A specialized `Result` type for API client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors returned by the HTTP wrapper and the domain services.
///
/// The type is `Clone` so a failure can be both returned to the caller and
/// kept in a state container.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    // ========================================================================
    // Client-side validation (raised before any network call)
    // ========================================================================
    /// Input failed client-side validation.
    #[error("Validation failed: {message}")]
    Validation {
        /// What was wrong with the input.
        message: String,
    },

    /// No file was provided for an upload.
    #[error("No file selected for upload")]
    NoFile,

    /// The file exceeds the client-side upload cap.
    #[error("File too large: '{file_name}' exceeds the {limit_mb}MB upload limit")]
    FileTooLarge {
        /// Name of the rejected file.
        file_name: String,
        /// Actual size in bytes.
        size_bytes: u64,
        /// Configured limit in megabytes.
        limit_mb: u64,
    },

    // ========================================================================
    // Transport and server errors
    // ========================================================================
    /// The request never produced an HTTP response.
    #[error("Network error: {message}")]
    Network {
        /// Description of the transport failure.
        message: String,
    },

    /// The server answered with a 4xx/5xx status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message supplied by the server, or a status-derived fallback.
        message: String,
    },

    /// The server rejected the bearer token (HTTP 401).
    #[error("Authentication failed: {message}")]
    Auth {
        /// Message supplied by the server.
        message: String,
    },

    /// The requested mentor does not exist.
    #[error("Mentor not found: '{id}'")]
    MentorNotFound {
        /// Id that was looked up.
        id: EntityId,
    },

    // ========================================================================
    // Local failures
    // ========================================================================
    /// Reading or writing the persisted token failed.
    #[error("Token storage error: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
    },

    /// Anything else, including undecodable response bodies.
    #[error("Unexpected error: {message}")]
    Unknown {
        /// Description of the failure.
        message: String,
    },
}

/// Stable tags for [`ClientError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Client-side validation failure.
    ValidationError,
    /// Transport failure.
    NetworkError,
    /// Server 4xx/5xx.
    ApiError,
    /// Server rejected the session.
    AuthError,
    /// Mentor lookup failed.
    MentorNotFound,
    /// Upload over the size cap.
    FileTooLarge,
    /// Upload without a file.
    NoFile,
    /// Token persistence failure.
    StorageError,
    /// Unclassified.
    UnknownError,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::NetworkError => "NETWORK_ERROR",
            Self::ApiError => "API_ERROR",
            Self::AuthError => "AUTH_ERROR",
            Self::MentorNotFound => "MENTOR_NOT_FOUND",
            Self::FileTooLarge => "FILE_TOO_LARGE",
            Self::NoFile => "NO_FILE",
            Self::StorageError => "STORAGE_ERROR",
            Self::UnknownError => "UNKNOWN_ERROR",
        };
        f.write_str(tag)
    }
}

impl ClientError {
    /// Creates a new `Validation` error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a new `Network` error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Creates a new `Api` error.
    #[must_use]
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Creates a new `Auth` error.
    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Creates a new `MentorNotFound` error.
    #[must_use]
    pub fn mentor_not_found(id: impl Into<EntityId>) -> Self {
        Self::MentorNotFound { id: id.into() }
    }

    /// Creates a new `FileTooLarge` error.
    #[must_use]
    pub fn file_too_large(file_name: impl Into<String>, size_bytes: u64, limit_mb: u64) -> Self {
        Self::FileTooLarge {
            file_name: file_name.into(),
            size_bytes,
            limit_mb,
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Unknown` error.
    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Returns the taxonomy tag for this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::ValidationError,
            Self::NoFile => ErrorKind::NoFile,
            Self::FileTooLarge { .. } => ErrorKind::FileTooLarge,
            Self::Network { .. } => ErrorKind::NetworkError,
            Self::Api { .. } => ErrorKind::ApiError,
            Self::Auth { .. } => ErrorKind::AuthError,
            Self::MentorNotFound { .. } => ErrorKind::MentorNotFound,
            Self::Storage { .. } => ErrorKind::StorageError,
            Self::Unknown { .. } => ErrorKind::UnknownError,
        }
    }

    /// Returns the HTTP status associated with this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Auth { .. } => Some(401),
            Self::MentorNotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Returns the human-readable part of the error, without the category prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Validation { message }
            | Self::Network { message }
            | Self::Api { message, .. }
            | Self::Auth { message }
            | Self::Storage { message }
            | Self::Unknown { message } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Returns `true` if the error was raised before any network call.
    #[must_use]
    pub const fn is_client_side(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::NoFile | Self::FileTooLarge { .. }
        )
    }

    /// Returns `true` if retrying the same request may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the session is no longer valid and the user must log in again.
    #[must_use]
    pub const fn forces_logout(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return Self::api(status.as_u16(), e.to_string());
        }
        if e.is_decode() {
            return Self::unknown(format!("invalid response body: {e}"));
        }
        if e.is_builder() {
            return Self::unknown(format!("invalid request: {e}"));
        }
        Self::network(e.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::unknown(format!("invalid JSON: {e}"))
    }
}
