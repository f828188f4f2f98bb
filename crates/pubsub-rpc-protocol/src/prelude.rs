//! # Protocol Prelude
//!
//! ```rust
//! use pubsub_rpc_protocol::prelude::*;
//! ```

pub use crate::channel::{DEFAULT_REQUEST_CHANNEL, reply_channel_name};
pub use crate::error::{JsonRpcErrorCode, JsonRpcErrorObject, ProtocolError};
pub use crate::message::{JsonRpcMessage, parse_message};
pub use crate::notification::JsonRpcNotification;
pub use crate::request::JsonRpcRequest;
pub use crate::response::JsonRpcResponse;
pub use crate::types::{JsonRpcVersion, RequestId};

// Standard error codes
pub use crate::error_codes::*;
