//! Error type definitions.
//!
//! This module defines all error types used by the throttler, the request
//! wrapper, and application setup.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Invalid throttler configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `k` must be a finite number greater than zero.
    #[error("K must be a finite number greater than 0, got {0}")]
    InvalidK(f64),

    /// The window must span at least one second.
    #[error("window length must be at least 1 second")]
    InvalidWindowLength,

    /// The sweeper must run at a non-zero interval.
    #[error("cleanup interval must be at least 1 second")]
    InvalidCleanupInterval,
}

/// Failure reported by a [`Transport`](crate::Transport).
///
/// Cancellation is kept separate so the request wrapper can pass it through
/// without counting it against the destination.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The caller aborted the request.
    #[error("request was cancelled")]
    Cancelled,

    /// The HTTP client failed (connect, timeout, body, ...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] ReqwestError),

    /// Any other transport failure.
    #[error("transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Returns `true` for deliberate, client-initiated aborts.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransportError::Cancelled)
    }
}

/// Error returned by [`ThrottledClient::request`](crate::ThrottledClient::request).
#[derive(Error, Debug)]
pub enum FetchError {
    /// The throttler rejected the request locally; nothing was sent.
    #[error("the request to {key} was throttled")]
    Throttled {
        /// Destination key the decision was made for
        key: String,
    },

    /// The request was cancelled before it completed. Not recorded as a failure.
    #[error("request was cancelled")]
    Cancelled,

    /// The transport failed. Recorded as a failure before being returned.
    #[error(transparent)]
    Transport(TransportError),
}

impl FetchError {
    /// Returns `true` if the throttler rejected the request.
    pub fn is_throttled(&self) -> bool {
        matches!(self, FetchError::Throttled { .. })
    }

    /// Returns `true` if the request was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }
}

impl From<TransportError> for FetchError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Cancelled => FetchError::Cancelled,
            other => FetchError::Transport(other),
        }
    }
}
