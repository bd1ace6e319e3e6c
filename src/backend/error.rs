//! Backend error types

use thiserror::Error;

/// Backend error with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Network, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Timeout, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::ServerError, message)
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Auth, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::InvalidRequest, message)
    }

    pub fn malformed_response(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::MalformedResponse, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Unknown, message)
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Connection-level failure
    Network,
    /// Request deadline exceeded
    Timeout,
    /// Rate limited (429)
    RateLimit,
    /// Server error (5xx)
    ServerError,
    /// Authentication failed (401, 403)
    Auth,
    /// Bad request (400)
    InvalidRequest,
    /// Response body did not match the expected shape
    MalformedResponse,
    /// Unknown error
    Unknown,
}

/// Map an HTTP status to an error classification.
pub(crate) fn classify_status(status: reqwest::StatusCode) -> BackendErrorKind {
    match status.as_u16() {
        401 | 403 => BackendErrorKind::Auth,
        429 => BackendErrorKind::RateLimit,
        400 => BackendErrorKind::InvalidRequest,
        s if s >= 500 => BackendErrorKind::ServerError,
        _ => BackendErrorKind::Unknown,
    }
}
