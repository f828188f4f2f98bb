use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;
use crate::types::{JsonRpcVersion, RequestId, is_call_id};

/// A request published on the shared request channel.
///
/// A request with a truthy `id` is a call and will be answered on
/// `reply_channel`; without one it is a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(rename = "jsonrpc", default)]
    pub version: JsonRpcVersion,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    #[serde(
        rename = "replyChannel",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reply_channel: Option<String>,
}

impl JsonRpcRequest {
    /// Create a call that expects a response on `reply_channel`
    pub fn call(
        id: RequestId,
        method: impl Into<String>,
        params: Option<Value>,
        reply_channel: impl Into<String>,
    ) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            method: method.into(),
            params,
            id: Some(id),
            reply_channel: Some(reply_channel.into()),
        }
    }

    /// Create a fire-and-forget request (no id, no reply channel)
    pub fn notification(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            method: method.into(),
            params,
            id: None,
            reply_channel: None,
        }
    }

    /// Whether the sender expects a response
    pub fn is_call(&self) -> bool {
        is_call_id(self.id.as_ref())
    }

    pub fn is_notification(&self) -> bool {
        !self.is_call()
    }

    /// Get a parameter by name (if params are an object)
    pub fn get_param(&self, name: &str) -> Option<&Value> {
        self.params.as_ref()?.as_object()?.get(name)
    }

    /// Get a parameter by index (if params are an array)
    pub fn get_param_index(&self, index: usize) -> Option<&Value> {
        self.params.as_ref()?.as_array()?.get(index)
    }

    /// Deserialize the params into a typed value; absent params decode from `null`
    pub fn parse_params<T: DeserializeOwned>(&self) -> Result<T, ProtocolError> {
        let params = self.params.clone().unwrap_or(Value::Null);
        serde_json::from_value(params).map_err(|e| ProtocolError::InvalidParams(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{from_str, json, to_value};

    #[test]
    fn test_call_wire_format() {
        let request = JsonRpcRequest::call(
            RequestId::from("req-1"),
            "soma",
            Some(json!({"a": 2, "b": 3})),
            "server_request_channel:resp:abc",
        );

        assert_eq!(
            to_value(&request).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "method": "soma",
                "params": {"a": 2, "b": 3},
                "id": "req-1",
                "replyChannel": "server_request_channel:resp:abc"
            })
        );
    }

    #[test]
    fn test_notification_omits_id_and_reply_channel() {
        let request = JsonRpcRequest::notification("ping", None);
        let json = request.to_json().unwrap();

        assert!(!json.contains("\"id\""));
        assert!(!json.contains("replyChannel"));
        assert!(request.is_notification());
    }

    #[test]
    fn test_null_and_falsy_ids_are_notifications() {
        let null_id: JsonRpcRequest =
            from_str(r#"{"jsonrpc":"2.0","method":"m","id":null}"#).unwrap();
        assert!(null_id.id.is_none());
        assert!(null_id.is_notification());

        let zero_id: JsonRpcRequest =
            from_str(r#"{"jsonrpc":"2.0","method":"m","id":0}"#).unwrap();
        assert_eq!(zero_id.id, Some(RequestId::Number(0)));
        assert!(zero_id.is_notification());

        let call: JsonRpcRequest =
            from_str(r#"{"jsonrpc":"2.0","method":"m","id":9,"replyChannel":"c"}"#).unwrap();
        assert!(call.is_call());
        assert_eq!(call.reply_channel.as_deref(), Some("c"));
    }

    #[test]
    fn test_missing_version_defaults() {
        let request: JsonRpcRequest = from_str(r#"{"method":"m"}"#).unwrap();
        assert_eq!(request.version, JsonRpcVersion::V2_0);
    }

    #[test]
    fn test_param_access() {
        let object = JsonRpcRequest::notification("m", Some(json!({"a": 1})));
        assert_eq!(object.get_param("a"), Some(&json!(1)));
        assert_eq!(object.get_param_index(0), None);

        let array = JsonRpcRequest::notification("m", Some(json!(["x", true])));
        assert_eq!(array.get_param_index(1), Some(&json!(true)));
        assert_eq!(array.get_param("x"), None);
    }

    #[test]
    fn test_parse_params() {
        #[derive(Deserialize)]
        struct Operands {
            a: i64,
            b: i64,
        }

        let request = JsonRpcRequest::notification("soma", Some(json!({"a": 2, "b": 3})));
        let operands: Operands = request.parse_params().unwrap();
        assert_eq!(operands.a + operands.b, 5);

        let missing = JsonRpcRequest::notification("soma", None);
        assert!(matches!(
            missing.parse_params::<Operands>(),
            Err(ProtocolError::InvalidParams(_))
        ));
    }
}
