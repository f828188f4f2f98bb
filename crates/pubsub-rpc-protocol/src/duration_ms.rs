//! Serde helper for `Duration` fields written as whole milliseconds
//!
//! ```rust
//! use std::time::Duration;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Settings {
//!     #[serde(with = "pubsub_rpc_protocol::duration_ms")]
//!     timeout: Duration,
//! }
//! ```

use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = u64::deserialize(deserializer)?;
    Ok(Duration::from_millis(millis))
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use std::time::Duration;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Settings {
        #[serde(with = "super")]
        timeout: Duration,
    }

    #[test]
    fn test_millis_on_the_wire() {
        let settings = Settings {
            timeout: Duration::from_millis(1500),
        };
        assert_eq!(serde_json::to_value(&settings).unwrap(), json!({"timeout": 1500}));

        let parsed: Settings = serde_json::from_value(json!({"timeout": 50})).unwrap();
        assert_eq!(parsed.timeout, Duration::from_millis(50));
    }
}
