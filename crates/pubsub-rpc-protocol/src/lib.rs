//! # JSON-RPC over Publish/Subscribe: Message Model
//!
//! Wire shapes shared by the pub/sub RPC server and client. Every published
//! message is one UTF-8 JSON object: a request (with an optional correlation
//! id and the caller's reply channel), a response echoing that id, or a
//! notification that expects no answer.
//!
//! This crate carries no transport or runtime code.
//!
//! ## Features
//! - Request, response, notification and error object types
//! - Correlation id truthiness rules (which requests expect a response)
//! - Classification of inbound payloads into requests or responses
//! - Channel naming helpers for per-client reply channels

pub mod channel;
pub mod duration_ms;
pub mod error;
pub mod message;
pub mod notification;
pub mod request;
pub mod response;
pub mod types;

pub mod prelude;

// Re-export main types
pub use channel::{DEFAULT_REQUEST_CHANNEL, reply_channel_name};
pub use error::{JsonRpcErrorCode, JsonRpcErrorObject, ProtocolError};
pub use message::{JsonRpcMessage, parse_message};
pub use notification::JsonRpcNotification;
pub use request::JsonRpcRequest;
pub use response::JsonRpcResponse;
pub use types::{JsonRpcVersion, RequestId, is_call_id, is_call_id_value};

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// Error codes used on the wire
pub mod error_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;

    /// Code attached to every failure raised by a method handler
    pub const HANDLER_ERROR: i64 = -32000;
}
