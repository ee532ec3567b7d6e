//! Error types for the meinETA client
//!
//! Every failure the library reports to its caller is a [`MeinEtaError`].
//! The three protocol-level kinds (connection, invalid response, parsing)
//! share a common shape: a message, an optional numeric error code and
//! optional diagnostic details.

use thiserror::Error;

/// Result type alias for meinETA operations
pub type Result<T> = std::result::Result<T, MeinEtaError>;

/// Error types for meinETA operations
#[derive(Error, Debug)]
pub enum MeinEtaError {
    /// Network unreachable, DNS failure, timeout or exhausted retries
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        /// HTTP status, when a response was received at all
        status: Option<u16>,
    },

    /// HTTP response received with a status other than 200
    #[error("Invalid response: failed request with status {status}")]
    InvalidResponse { status: u16 },

    /// Response body did not have the expected document shape
    #[error("Parsing error: {message}")]
    Parsing {
        message: String,
        /// Raw response body
        details: Option<String>,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown sensor keys
    #[error("Not found: {0}")]
    NotFound(String),
}

impl MeinEtaError {
    /// Create a connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Self::Connection {
            message: msg.into(),
            status: None,
        }
    }

    /// Create a connection error carrying the HTTP status that caused it
    pub fn connection_with_status<S: Into<String>>(msg: S, status: u16) -> Self {
        Self::Connection {
            message: msg.into(),
            status: Some(status),
        }
    }

    /// Connection error raised once every fetch attempt failed at the network level
    pub fn retries_exhausted(url: &str, attempts: u32, cause: impl std::fmt::Display) -> Self {
        Self::connection(format!(
            "Request to {url} failed after {attempts} attempts: {cause}"
        ))
    }

    /// Create an invalid response error
    pub fn invalid_response(status: u16) -> Self {
        Self::InvalidResponse { status }
    }

    /// Create a parsing error with the offending body attached
    pub fn parsing<S: Into<String>>(msg: S, body: &str) -> Self {
        Self::Parsing {
            message: msg.into(),
            details: Some(body.to_string()),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Human readable message without the kind prefix
    pub fn message(&self) -> String {
        match self {
            Self::Connection { message, .. } | Self::Parsing { message, .. } => message.clone(),
            Self::InvalidResponse { status } => format!("Failed request with status {status}"),
            Self::Config(msg) | Self::NotFound(msg) => msg.clone(),
        }
    }

    /// Numeric error code (the HTTP status where one is known)
    pub fn error_code(&self) -> Option<u16> {
        match self {
            Self::Connection { status, .. } => *status,
            Self::InvalidResponse { status } => Some(*status),
            _ => None,
        }
    }

    /// Diagnostic details, e.g. the raw document that failed to parse
    pub fn details(&self) -> Option<&str> {
        match self {
            Self::Parsing { details, .. } => details.as_deref(),
            _ => None,
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { status: None, .. })
    }

    /// Check if error stems from an unexpected document shape
    pub fn is_parsing_error(&self) -> bool {
        matches!(self, Self::Parsing { .. })
    }
}
