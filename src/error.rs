//! Error types for the provider layer.
//!
//! Library modules return [`Error`] via `thiserror`, while the CLI uses
//! `anyhow` for convenient error propagation.
//!
//! # Design
//!
//! - [`TransportError`]: anything the server or the network reported. These
//!   are handed to the caller verbatim and never retried.
//! - [`Error::EmptyResponse`]: the server said "ok" but left out a payload
//!   the operation needs.
//! - Batched mutations return the first [`Error`] they saw; later failures in
//!   the same call are only logged.

/// Provider-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Subsonic error codes that mean the credentials were rejected.
const AUTH_ERROR_CODES: [i32; 3] = [40, 41, 44];

/// Failure reported by the transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Request never produced a response (DNS, TLS, connection reset, ...)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    /// Server answered with `status="failed"`
    #[error("Server error {code}: {message}")]
    Api { code: i32, message: String },

    /// Response body could not be decoded
    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl TransportError {
    /// Whether the server rejected our credentials.
    pub fn is_auth_error(&self) -> bool {
        match self {
            TransportError::Api { code, .. } => AUTH_ERROR_CODES.contains(code),
            TransportError::Http { status, .. } => *status == 401 || *status == 403,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            return TransportError::Parse(e.to_string());
        }
        match e.status() {
            Some(status) => TransportError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            },
            None => TransportError::Network(e.to_string()),
        }
    }
}

/// Top-level provider error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Transport or server failure, passed through untouched
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Server reported success without the content we asked for
    #[error("Server returned empty {0}")]
    EmptyResponse(&'static str),

    /// Caller passed a value the protocol cannot express
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// True when the failure means the login itself is wrong rather than
    /// the server being unreachable.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Transport(t) if t.is_auth_error())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e.into())
    }
}
