//! Error types for Sensu backend operations.
//!
//! The error kinds form a closed set so callers can pattern-match on the
//! failure class instead of inspecting message strings: a connectivity
//! problem, a login failure, a privilege problem and an unexpected API
//! answer are all distinct variants with structured fields.

use std::fmt;

/// Result type alias for Sensu backend operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to a Sensu Go backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Network-level failure reaching the backend (DNS, TCP, TLS).
    ///
    /// This is the only hard transport failure; HTTP error statuses are
    /// returned as regular responses and judged by the caller.
    #[error("transport failure: {reason}")]
    Transport {
        /// Underlying failure reason, verbatim.
        reason: String,
    },

    /// Obtaining an access token failed.
    #[error("authentication failed: {reason}")]
    Auth {
        /// What went wrong: the status code, a JSON parse failure, or a
        /// missing token field.
        reason: String,
    },

    /// The backend rejected an authenticated request with 401 or 403.
    #[error("request to {path} returned status {status}: invalid or insufficient credentials")]
    Authorization {
        /// Path of the rejected request.
        path: String,
        /// The rejecting status code (401 or 403).
        status: u16,
    },

    /// An operation received a status code it does not accept.
    #[error("{path} returned unexpected status {status}: {body}")]
    Sync {
        /// Path of the failing request.
        path: String,
        /// The unexpected status code.
        status: u16,
        /// Raw response body, for diagnosis.
        body: String,
    },

    /// A response that must carry JSON does not parse as JSON, or has
    /// the wrong shape.
    #[error("invalid JSON response from {path}: {reason}")]
    Json {
        /// Path of the request that produced the body.
        path: String,
        /// Parse or shape problem description.
        reason: String,
    },

    /// Parameters were invalid before any network call was made.
    #[error("invalid parameters: {reason}")]
    Validation {
        /// Description of the invalid input.
        reason: String,
    },
}

impl Error {
    /// Create a transport error.
    pub fn transport(reason: impl fmt::Display) -> Self {
        Self::Transport {
            reason: reason.to_string(),
        }
    }

    /// Create an authentication error.
    pub fn auth(reason: impl Into<String>) -> Self {
        Self::Auth {
            reason: reason.into(),
        }
    }

    /// Create a sync error from an unexpected response.
    pub fn sync(path: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Sync {
            path: path.into(),
            status,
            body: body.into(),
        }
    }

    /// Create an invalid-JSON error.
    pub fn json(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Json {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a validation error.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }
}
