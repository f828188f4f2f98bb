//! Configuration types for the RPC client

use pubsub_rpc_protocol::DEFAULT_REQUEST_CHANNEL;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Shared channel the server listens on
    pub request_channel: String,

    /// Prefix of the private reply channel (defaults to `request_channel`)
    pub base_channel: Option<String>,

    /// Deadline applied by `call`; zero disables it
    #[serde(with = "pubsub_rpc_protocol::duration_ms")]
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_channel: DEFAULT_REQUEST_CHANNEL.to_string(),
            base_channel: None,
            request_timeout: Duration::from_millis(5000),
        }
    }
}

impl ClientConfig {
    pub fn with_request_channel(mut self, channel: impl Into<String>) -> Self {
        self.request_channel = channel.into();
        self
    }

    pub fn with_base_channel(mut self, channel: impl Into<String>) -> Self {
        self.base_channel = Some(channel.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Prefix used to build the reply channel name
    pub fn effective_base_channel(&self) -> &str {
        self.base_channel.as_deref().unwrap_or(&self.request_channel)
    }
}
