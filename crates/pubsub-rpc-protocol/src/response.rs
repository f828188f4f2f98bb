use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{JsonRpcErrorObject, ProtocolError};
use crate::types::{JsonRpcVersion, RequestId};

/// A response published on a caller's reply channel.
///
/// `result` and `error` are mutually exclusive by convention; decoding does
/// not enforce it, and `error` takes precedence when both are present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(rename = "jsonrpc", default)]
    pub version: JsonRpcVersion,
    /// Echo of the request id; serialized as `null` when absent
    #[serde(default)]
    pub id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcErrorObject>,
}

impl JsonRpcResponse {
    /// An empty response for the given id, to be completed with a result or error
    pub fn new(id: Option<RequestId>) -> Self {
        Self {
            version: JsonRpcVersion::V2_0,
            id,
            result: None,
            error: None,
        }
    }

    pub fn success(id: Option<RequestId>, result: Value) -> Self {
        Self {
            result: Some(result),
            ..Self::new(id)
        }
    }

    pub fn error(id: Option<RequestId>, error: JsonRpcErrorObject) -> Self {
        Self {
            error: Some(error),
            ..Self::new(id)
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Borrow the result, treating an absent result as `null`
    pub fn result_or_null(&self) -> &Value {
        self.result.as_ref().unwrap_or(&Value::Null)
    }

    /// Split into the result value or the remote error
    pub fn into_result(self) -> Result<Value, JsonRpcErrorObject> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
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
    fn test_success_wire_format() {
        let response = JsonRpcResponse::success(Some(RequestId::from("r1")), json!(5));
        assert_eq!(
            to_value(&response).unwrap(),
            json!({"jsonrpc": "2.0", "id": "r1", "result": 5})
        );
    }

    #[test]
    fn test_missing_id_serializes_as_null() {
        let response = JsonRpcResponse::error(None, JsonRpcErrorObject::method_not_found());
        assert_eq!(
            to_value(&response).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": {"code": -32601, "message": "Method not found"}
            })
        );
    }

    #[test]
    fn test_into_result() {
        let ok = JsonRpcResponse::success(Some(RequestId::from(1)), json!({"sum": 5}));
        assert_eq!(ok.into_result().unwrap()["sum"], 5);

        let err = JsonRpcResponse::error(
            Some(RequestId::from(1)),
            JsonRpcErrorObject::handler_error(Some("boom".to_string())),
        );
        let error = err.into_result().unwrap_err();
        assert_eq!(error.code, -32000);
        assert_eq!(error.message, "boom");
    }

    #[test]
    fn test_decode_tolerates_both_fields() {
        let response: JsonRpcResponse = from_str(
            r#"{"jsonrpc":"2.0","id":"x","result":1,"error":{"code":-32000,"message":"m"}}"#,
        )
        .unwrap();
        assert!(response.is_error());
        assert!(response.into_result().is_err());
    }
}
