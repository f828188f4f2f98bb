//! Configuration types for the RPC server

use pubsub_rpc_protocol::DEFAULT_REQUEST_CHANNEL;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Shared channel the server subscribes to for requests
    pub request_channel: String,

    /// Where to answer calls that arrive without a `replyChannel`.
    ///
    /// `None` treats such calls as protocol errors: the handler still runs but
    /// the response is dropped with a warning.
    pub fallback_reply_channel: Option<String>,

    /// Upper bound on handler invocations running at once (`None` or 0: unbounded)
    pub max_concurrent_handlers: Option<usize>,

    /// How long `disconnect` waits for in-flight handlers before closing the transport
    #[serde(with = "pubsub_rpc_protocol::duration_ms")]
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            request_channel: DEFAULT_REQUEST_CHANNEL.to_string(),
            fallback_reply_channel: None,
            max_concurrent_handlers: None,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl ServerConfig {
    pub fn with_request_channel(mut self, channel: impl Into<String>) -> Self {
        self.request_channel = channel.into();
        self
    }

    pub fn with_fallback_reply_channel(mut self, channel: impl Into<String>) -> Self {
        self.fallback_reply_channel = Some(channel.into());
        self
    }

    pub fn with_max_concurrent_handlers(mut self, limit: usize) -> Self {
        self.max_concurrent_handlers = Some(limit);
        self
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Effective handler limit, if any
    pub fn handler_limit(&self) -> Option<usize> {
        self.max_concurrent_handlers.filter(|limit| *limit > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.request_channel, "server_request_channel");
        assert!(config.fallback_reply_channel.is_none());
        assert_eq!(config.handler_limit(), None);
    }

    #[test]
    fn test_zero_limit_means_unbounded() {
        let config = ServerConfig::default().with_max_concurrent_handlers(0);
        assert_eq!(config.handler_limit(), None);

        let config = ServerConfig::default().with_max_concurrent_handlers(4);
        assert_eq!(config.handler_limit(), Some(4));
    }

    #[test]
    fn test_config_serialization() {
        let config = ServerConfig::default()
            .with_request_channel("wallet")
            .with_shutdown_timeout(Duration::from_millis(250));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["shutdown_timeout"], 250);

        let parsed: ServerConfig = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.request_channel, "wallet");
        assert_eq!(parsed.shutdown_timeout, Duration::from_millis(250));
    }
}
