//! Error types for transport operations

use thiserror::Error;

/// Result type for transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Transport-level errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Transport is not connected")]
    NotConnected,

    #[error("Publish to channel '{channel}' failed: {reason}")]
    PublishFailed { channel: String, reason: String },

    #[error("Transport closed unexpectedly")]
    Closed,
}

impl TransportError {
    /// Whether the same operation may succeed if attempted again later
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PublishFailed { .. } | Self::Closed)
    }
}
