use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Correlation id of a call.
///
/// The wire allows a string or an integer; an absent or `null` id is modelled
/// as `Option::None` on the message types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
}

impl RequestId {
    /// Whether this id marks its request as a call expecting a response.
    ///
    /// Empty strings and zero are falsy: a request carrying one is handled
    /// as a notification and never answered.
    pub fn is_truthy(&self) -> bool {
        match self {
            RequestId::String(s) => !s.is_empty(),
            RequestId::Number(n) => *n != 0,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RequestId::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RequestId::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Read an id out of a raw JSON value. Only strings and integers qualify.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(RequestId::String(s.clone())),
            Value::Number(n) => n.as_i64().map(RequestId::Number),
            _ => None,
        }
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::String(s) => write!(f, "{}", s),
            RequestId::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

/// Whether an optional id makes its request a call
pub fn is_call_id(id: Option<&RequestId>) -> bool {
    id.is_some_and(RequestId::is_truthy)
}

/// Whether a raw `id` value makes its request a call.
///
/// Same rules as [`RequestId::is_truthy`], extended to ids that do not fit a
/// `RequestId` (fractional numbers, booleans, objects).
pub fn is_call_id_value(id: &Value) -> bool {
    match id {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// JSON-RPC version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonRpcVersion {
    #[default]
    V2_0,
}

impl JsonRpcVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            JsonRpcVersion::V2_0 => crate::JSONRPC_VERSION,
        }
    }
}

impl fmt::Display for JsonRpcVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for JsonRpcVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for JsonRpcVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "2.0" => Ok(JsonRpcVersion::V2_0),
            _ => Err(serde::de::Error::custom(format!(
                "Invalid JSON-RPC version: {}",
                s
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_serialization() {
        let id_str = RequestId::String("test".to_string());
        let id_num = RequestId::Number(42);

        assert_eq!(serde_json::to_string(&id_str).unwrap(), r#""test""#);
        assert_eq!(serde_json::to_string(&id_num).unwrap(), "42");
    }

    #[test]
    fn test_request_id_truthiness() {
        assert!(RequestId::from("abc").is_truthy());
        assert!(RequestId::from(7).is_truthy());
        assert!(!RequestId::from("").is_truthy());
        assert!(!RequestId::from(0).is_truthy());

        assert!(is_call_id(Some(&RequestId::from(1))));
        assert!(!is_call_id(None));
    }

    #[test]
    fn test_json_rpc_version() {
        let version = JsonRpcVersion::V2_0;
        assert_eq!(version.as_str(), "2.0");
        assert_eq!(serde_json::to_string(&version).unwrap(), r#""2.0""#);
        assert!(serde_json::from_str::<JsonRpcVersion>(r#""1.0""#).is_err());
    }

    #[test]
    fn test_ids_from_raw_values() {
        use serde_json::json;

        assert_eq!(RequestId::from_value(&json!("a")), Some(RequestId::from("a")));
        assert_eq!(RequestId::from_value(&json!(3)), Some(RequestId::from(3)));
        assert_eq!(RequestId::from_value(&json!(1.5)), None);
        assert_eq!(RequestId::from_value(&Value::Null), None);

        assert!(is_call_id_value(&json!(1.5)));
        assert!(is_call_id_value(&json!("x")));
        assert!(!is_call_id_value(&json!(0)));
        assert!(!is_call_id_value(&json!(0.0)));
        assert!(!is_call_id_value(&json!("")));
        assert!(!is_call_id_value(&Value::Null));
    }
}
