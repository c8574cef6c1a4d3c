//! Error types for the No-IP updater
//!
//! This module defines all error types used throughout the crate.
//!
//! None of these errors terminate the update loop: the scheduler logs them
//! and moves on. Only an explicit cancellation ends a run.

use thiserror::Error;

/// Result type alias for updater operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the No-IP updater
#[derive(Error, Debug)]
pub enum Error {
    /// Settings could not be read from the host
    #[error("Settings error: {0}")]
    Settings(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Host user interface failures (dialogs, notifications)
    #[error("User interface error: {0}")]
    Ui(String),

    /// Filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a settings error
    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a user interface error
    ///
    /// For hosts whose dialogs or notifications can fail; the scheduler logs
    /// these and carries on.
    pub fn ui(msg: impl Into<String>) -> Self {
        Self::Ui(msg.into())
    }
}

/// Failure of a single update request below the protocol level
///
/// DNS resolution, TLS, timeouts and non-2xx statuses all end up here.
/// The reason is meant for humans and never carries credentials.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct TransportError {
    /// Human-readable failure reason
    pub reason: String,
}

impl TransportError {
    /// Create a transport error from a reason string
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
