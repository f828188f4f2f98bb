//! The transport trait

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TransportResult;
use crate::subscription::Subscription;

/// Callback invoked once per payload delivered to a subscription.
///
/// Runs on the transport's delivery task: it must not block. Long work is
/// expected to be spawned by the callback itself.
pub type MessageCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Shared handle to a transport, held by servers and clients alike
pub type SharedTransport = Arc<dyn Transport>;

/// Publish/subscribe primitive the RPC layer is built on
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Open the underlying connections. Calling it again while connected is a no-op.
    async fn connect(&self) -> TransportResult<()>;

    /// Close the underlying connections and stop every subscription made through this transport
    async fn disconnect(&self) -> TransportResult<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Deliver `payload` to every current subscriber of `channel`
    async fn publish(&self, channel: &str, payload: String) -> TransportResult<()>;

    /// Register `on_message` for `channel`.
    ///
    /// Delivery stops when the returned [`Subscription`] is dropped or
    /// unsubscribed, or when the transport disconnects.
    async fn subscribe(
        &self,
        channel: &str,
        on_message: MessageCallback,
    ) -> TransportResult<Subscription>;

    /// Get transport statistics
    fn statistics(&self) -> TransportStatistics {
        TransportStatistics::default()
    }
}

/// Transport statistics for monitoring
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportStatistics {
    /// Number of payloads published
    pub messages_published: u64,
    /// Number of payloads handed to subscription callbacks
    pub messages_delivered: u64,
    /// Number of payloads lost to slow subscribers
    pub messages_lagged: u64,
    /// Number of subscriptions opened
    pub subscriptions_opened: u64,
}
