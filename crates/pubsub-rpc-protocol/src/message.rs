use serde_json::Value;

use crate::error::ProtocolError;
use crate::request::JsonRpcRequest;
use crate::response::JsonRpcResponse;
use crate::types::RequestId;

/// An inbound payload classified by shape
#[derive(Debug, Clone, PartialEq)]
pub enum JsonRpcMessage {
    /// Carries a `method`: a call or, without a truthy id, a notification
    Request(JsonRpcRequest),
    /// No `method`: an answer to an earlier call
    Response(JsonRpcResponse),
}

impl JsonRpcMessage {
    /// The id carried by either shape
    pub fn id(&self) -> Option<&RequestId> {
        match self {
            JsonRpcMessage::Request(req) => req.id.as_ref(),
            JsonRpcMessage::Response(resp) => resp.id.as_ref(),
        }
    }

    /// The method name, for requests and notifications
    pub fn method(&self) -> Option<&str> {
        match self {
            JsonRpcMessage::Request(req) => Some(&req.method),
            JsonRpcMessage::Response(_) => None,
        }
    }

    /// A message with a method and no id (absent or `null`)
    pub fn is_notification(&self) -> bool {
        matches!(self, JsonRpcMessage::Request(req) if req.id.is_none())
    }
}

/// Parse one published payload.
///
/// Objects with a `method` field are requests; objects with only an `id` are
/// responses. Anything else is rejected.
pub fn parse_message(text: &str) -> Result<JsonRpcMessage, ProtocolError> {
    let value: Value = serde_json::from_str(text)?;

    let Some(obj) = value.as_object() else {
        return Err(ProtocolError::InvalidMessage(
            "payload is not a JSON object".to_string(),
        ));
    };

    if obj.contains_key("method") {
        Ok(JsonRpcMessage::Request(serde_json::from_value(value)?))
    } else if obj.contains_key("id") {
        Ok(JsonRpcMessage::Response(serde_json::from_value(value)?))
    } else {
        Err(ProtocolError::InvalidMessage(
            "payload has neither a method nor an id".to_string(),
        ))
    }
}
