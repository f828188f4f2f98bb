//! Error types for client operations

use pubsub_rpc_protocol::{JsonRpcErrorObject, ProtocolError};
use pubsub_rpc_transport::TransportError;
use serde_json::Value;
use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors returned by [`RpcClient`](crate::RpcClient) operations
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Configuration error: {0}")]
    Config(String),

    /// No response arrived before the call's deadline
    #[error("Timeout")]
    Timeout,

    /// The client disconnected while the call was pending
    #[error("Client disconnected")]
    Disconnected,

    /// `connect()` has not been called, so no response could ever arrive
    #[error("Client is not connected")]
    NotConnected,

    /// The server answered with an error object. Displays as the remote message only.
    #[error("{message}")]
    Remote {
        code: i64,
        message: String,
        data: Option<Value>,
    },
}

impl ClientError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Timeout => true,
            ClientError::Transport(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Get the remote error code if this came from the server
    pub fn error_code(&self) -> Option<i64> {
        match self {
            ClientError::Remote { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<JsonRpcErrorObject> for ClientError {
    fn from(error: JsonRpcErrorObject) -> Self {
        Self::Remote {
            code: error.code,
            message: error.message,
            data: error.data,
        }
    }
}
