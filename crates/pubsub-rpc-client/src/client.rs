//! RPC client implementation

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::RwLock;
use pubsub_rpc_protocol::{
    JsonRpcMessage, JsonRpcRequest, JsonRpcResponse, RequestId, parse_message,
    reply_channel_name,
};
use pubsub_rpc_transport::{MessageCallback, SharedTransport, Subscription};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::pending::PendingCalls;

/// Callback invoked with the `params` of a server notification.
///
/// Runs on the transport's delivery task and must not block.
pub type NotificationHandler = Arc<dyn Fn(Option<Value>) + Send + Sync>;

/// JSON-RPC client with a private reply channel
#[derive(Clone)]
pub struct RpcClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    transport: SharedTransport,
    /// Unique per instance, prefix of every correlation id
    instance_id: String,
    reply_channel: String,
    next_id: AtomicU64,
    pending: PendingCalls,
    notification_handlers: RwLock<HashMap<String, NotificationHandler>>,
    subscription: Mutex<Option<Subscription>>,
}

impl RpcClient {
    pub fn new(transport: SharedTransport, config: ClientConfig) -> Self {
        let instance_id = Uuid::new_v4().simple().to_string();
        let reply_channel = reply_channel_name(config.effective_base_channel(), &instance_id);

        Self {
            inner: Arc::new(ClientInner {
                config,
                transport,
                instance_id,
                reply_channel,
                next_id: AtomicU64::new(1),
                pending: PendingCalls::new(),
                notification_handlers: RwLock::new(HashMap::new()),
                subscription: Mutex::new(None),
            }),
        }
    }

    pub fn builder() -> RpcClientBuilder {
        RpcClientBuilder::new()
    }

    /// The private channel responses and notifications arrive on
    pub fn reply_channel(&self) -> &str {
        &self.inner.reply_channel
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Number of calls still waiting for a response
    pub fn pending_calls(&self) -> usize {
        self.inner.pending.len()
    }

    /// Connect the transport and subscribe to the reply channel.
    ///
    /// Idempotent: repeated calls never add a second subscription.
    pub async fn connect(&self) -> ClientResult<()> {
        let mut slot = self.inner.subscription.lock().await;
        if slot.as_ref().is_some_and(Subscription::is_active) {
            debug!(channel = %self.inner.reply_channel, "Client already connected");
            return Ok(());
        }

        info!(
            transport = self.inner.transport.name(),
            channel = %self.inner.reply_channel,
            "Connecting RPC client"
        );
        self.inner.transport.connect().await?;

        let weak = Arc::downgrade(&self.inner);
        let on_message: MessageCallback = Arc::new(move |payload| {
            ClientInner::on_payload(&weak, &payload);
        });
        let subscription = self
            .inner
            .transport
            .subscribe(&self.inner.reply_channel, on_message)
            .await?;

        *slot = Some(subscription);
        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        self.inner
            .subscription
            .lock()
            .await
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    /// Call `method` with the configured default timeout
    pub async fn call(&self, method: &str, params: Option<Value>) -> ClientResult<JsonRpcResponse> {
        self.call_with_timeout(method, params, self.inner.config.request_timeout)
            .await
    }

    /// Call `method` and wait for its response.
    ///
    /// A zero `timeout` waits until the response arrives or the client
    /// disconnects. Resolves with the full response; an error response
    /// becomes [`ClientError::Remote`].
    pub async fn call_with_timeout(
        &self,
        method: &str,
        params: Option<Value>,
        timeout: Duration,
    ) -> ClientResult<JsonRpcResponse> {
        if !self.is_connected().await {
            return Err(ClientError::NotConnected);
        }

        let id = self.inner.next_request_id();
        let request = JsonRpcRequest::call(
            id.clone(),
            method,
            params,
            self.inner.reply_channel.clone(),
        );
        let payload = request.to_json()?;

        // Registered before publishing so a fast response cannot slip past
        let (_guard, rx) = self.inner.pending.register(id.clone());

        // disconnect() takes the subscription before rejecting pending calls,
        // so an entry registered after that sweep is caught here
        if !self.is_connected().await {
            return Err(ClientError::Disconnected);
        }

        debug!(method = %method, id = %id, "Sending request");
        self.inner
            .transport
            .publish(&self.inner.config.request_channel, payload)
            .await?;

        let outcome = if timeout.is_zero() {
            rx.await
        } else {
            match tokio::time::timeout(timeout, rx).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    debug!(method = %method, id = %id, "Request timed out");
                    return Err(ClientError::Timeout);
                }
            }
        };

        let response = outcome.map_err(|_| ClientError::Disconnected)??;
        match response.error {
            Some(error) => Err(error.into()),
            None => Ok(response),
        }
    }

    /// Publish a request without an id; the server sends no response
    pub async fn notify(&self, method: &str, params: Option<Value>) -> ClientResult<()> {
        let payload = JsonRpcRequest::notification(method, params).to_json()?;
        self.inner
            .transport
            .publish(&self.inner.config.request_channel, payload)
            .await?;
        Ok(())
    }

    /// Route server notifications for `method` to `handler`, replacing any previous one
    pub fn on_notification<F>(&self, method: impl Into<String>, handler: F)
    where
        F: Fn(Option<Value>) + Send + Sync + 'static,
    {
        self.inner
            .notification_handlers
            .write()
            .insert(method.into(), Arc::new(handler));
    }

    pub fn remove_notification_handler(&self, method: &str) -> bool {
        self.inner
            .notification_handlers
            .write()
            .remove(method)
            .is_some()
    }

    /// Stop listening, fail every pending call with [`ClientError::Disconnected`]
    /// and close the transport
    pub async fn disconnect(&self) -> ClientResult<()> {
        info!(channel = %self.inner.reply_channel, "Disconnecting RPC client");

        if let Some(subscription) = self.inner.subscription.lock().await.take() {
            subscription.unsubscribe();
        }

        let rejected = self.inner.pending.reject_all(|| ClientError::Disconnected);
        if rejected > 0 {
            warn!(rejected, "Rejected pending calls on disconnect");
        }

        self.inner.transport.disconnect().await?;
        Ok(())
    }
}

impl ClientInner {
    fn next_request_id(&self) -> RequestId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        RequestId::String(format!("{}-{}", self.instance_id, n))
    }

    fn on_payload(weak: &Weak<ClientInner>, payload: &str) {
        if let Some(inner) = weak.upgrade() {
            inner.handle_payload(payload);
        }
    }

    fn handle_payload(&self, payload: &str) {
        match parse_message(payload) {
            Ok(JsonRpcMessage::Request(request)) if request.id.is_none() => {
                self.handle_notification(request.method, request.params);
            }
            Ok(JsonRpcMessage::Request(request)) => {
                debug!(
                    method = %request.method,
                    channel = %self.reply_channel,
                    "Ignoring request with id on reply channel"
                );
            }
            Ok(JsonRpcMessage::Response(response)) => self.handle_response(response),
            Err(e) => {
                debug!(error = %e, channel = %self.reply_channel, "Dropping malformed payload");
            }
        }
    }

    fn handle_notification(&self, method: String, params: Option<Value>) {
        let handler = self.notification_handlers.read().get(&method).cloned();
        match handler {
            Some(handler) => {
                trace!(method = %method, "Dispatching notification");
                handler(params);
            }
            None => debug!(method = %method, "No handler for notification"),
        }
    }

    fn handle_response(&self, response: JsonRpcResponse) {
        let Some(id) = response.id.clone().filter(RequestId::is_truthy) else {
            debug!("Dropping response without a usable id");
            return;
        };

        if !self.pending.complete(&id, Ok(response)) {
            debug!(id = %id, "Dropping unmatched response");
        }
    }
}

/// Builder for creating RPC clients
pub struct RpcClientBuilder {
    transport: Option<SharedTransport>,
    config: ClientConfig,
}

impl RpcClientBuilder {
    pub fn new() -> Self {
        Self {
            transport: None,
            config: ClientConfig::default(),
        }
    }

    pub fn with_transport(mut self, transport: SharedTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn request_channel(mut self, channel: impl Into<String>) -> Self {
        self.config.request_channel = channel.into();
        self
    }

    pub fn base_channel(mut self, channel: impl Into<String>) -> Self {
        self.config.base_channel = Some(channel.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn build(self) -> ClientResult<RpcClient> {
        let transport = self
            .transport
            .ok_or_else(|| ClientError::config("Transport must be set before building client"))?;
        if self.config.request_channel.is_empty() {
            return Err(ClientError::config("Request channel must not be empty"));
        }
        Ok(RpcClient::new(transport, self.config))
    }
}

impl Default for RpcClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
