//! Error types for stacklink
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use std::sync::Arc;
use thiserror::Error;

/// Failure of the HTTP exchange itself
///
/// Kept separate from [`Error`] and cloneable so a `ResultEnvelope` can hand
/// the same transport failure back on every extraction.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Request(Arc<reqwest::Error>),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl TransportError {
    /// Create an unexpected status error
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }

    /// HTTP status code, when the server answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::Timeout { .. } => None,
        }
    }

    /// Check if this transport failure is worth retrying
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => is_retryable_status(*status),
            Self::Timeout { .. } => true,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(Arc::new(e))
    }
}

/// The main error type for stacklink
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Decode Errors
    // ============================================================================
    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    #[error("Unexpected type for field '{field}': {observed}")]
    TypeMismatch { field: String, observed: String },

    #[error("Failed to parse timestamp field '{field}': {value:?}")]
    TimestampParse { field: String, value: String },

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    #[error("Missing or malformed pagination metadata: {message}")]
    MissingPaginationMetadata { message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a malformed payload error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(field: impl Into<String>, observed: impl Into<String>) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            observed: observed.into(),
        }
    }

    /// Create a timestamp parse error
    pub fn timestamp(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::TimestampParse {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a pagination metadata error
    pub fn pagination(message: impl Into<String>) -> Self {
        Self::MissingPaginationMetadata {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Check if the HTTP exchange failed rather than decoding
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(
        status,
        429 | 500 | 502 | 503 | 504 | 520 | 521 | 522 | 523 | 524
    )
}

/// Result type alias for stacklink
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
