//! # Live Error Types
//!
//! Failures on the delivery side of the hub. None of these ever reach a
//! producer: `broadcast` is infallible, and a failing observer is simply
//! removed.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Configuration    InvalidConfig                                         │
//! │  Protocol         SerializationFailed                                   │
//! │  Transport        TransportError · Timeout · Closed                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for live operations.
pub type LiveResult<T> = Result<T, LiveError>;

#[derive(Debug, Error)]
pub enum LiveError {
    #[error("Invalid hub configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// The underlying connection reported an error.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// A single send took longer than the configured timeout.
    #[error("Send timed out after {0} ms")]
    Timeout(u64),

    /// The observer went away.
    #[error("Connection closed")]
    Closed,
}

impl From<serde_json::Error> for LiveError {
    fn from(err: serde_json::Error) -> Self {
        LiveError::SerializationFailed(err.to_string())
    }
}

impl From<axum::Error> for LiveError {
    fn from(err: axum::Error) -> Self {
        LiveError::TransportError(err.to_string())
    }
}

impl LiveError {
    /// True when the observer is gone or unresponsive and should be dropped.
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            LiveError::TransportError(_) | LiveError::Timeout(_) | LiveError::Closed
        )
    }
}
