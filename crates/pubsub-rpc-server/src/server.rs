//! RPC server: method registry and request dispatch

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};

use futures::FutureExt;
use parking_lot::RwLock;
use pubsub_rpc_protocol::{
    JsonRpcErrorObject, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, JsonRpcVersion,
    RequestId, is_call_id_value,
};
use pubsub_rpc_transport::{MessageCallback, SharedTransport, Subscription};
use serde_json::Value;
use tokio::sync::{Mutex, Semaphore};
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, trace, warn};

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::RpcHandler;

/// JSON-RPC server bound to one shared request channel.
///
/// Cheap to clone; clones share the registry and the subscription.
#[derive(Clone)]
pub struct RpcServer {
    inner: Arc<ServerInner>,
}

struct ServerInner {
    config: ServerConfig,
    transport: SharedTransport,
    handlers: RwLock<HashMap<String, Arc<dyn RpcHandler>>>,
    /// The single request-channel subscription shared by every registered method
    subscription: Mutex<Option<Subscription>>,
    limiter: Option<Arc<Semaphore>>,
    tasks: TaskTracker,
}

impl RpcServer {
    pub fn new(transport: SharedTransport, config: ServerConfig) -> Self {
        let limiter = config
            .handler_limit()
            .map(|limit| Arc::new(Semaphore::new(limit)));

        Self {
            inner: Arc::new(ServerInner {
                config,
                transport,
                handlers: RwLock::new(HashMap::new()),
                subscription: Mutex::new(None),
                limiter,
                tasks: TaskTracker::new(),
            }),
        }
    }

    pub fn builder() -> RpcServerBuilder {
        RpcServerBuilder::new()
    }

    pub fn request_channel(&self) -> &str {
        &self.inner.config.request_channel
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Connect the transport and, if methods are already registered, start listening
    pub async fn connect(&self) -> ServerResult<()> {
        info!(
            transport = self.inner.transport.name(),
            channel = %self.request_channel(),
            "Connecting RPC server"
        );

        self.inner.tasks.reopen();
        self.inner.transport.connect().await?;

        let has_handlers = !self.inner.handlers.read().is_empty();
        if has_handlers {
            self.ensure_subscribed().await?;
        }
        Ok(())
    }

    /// Register `handler` for `method`, replacing any previous handler.
    ///
    /// All methods share one subscription to the request channel. If the
    /// transport is not connected yet, the subscription is opened by
    /// [`RpcServer::connect`].
    pub async fn listen<H>(&self, method: impl Into<String>, handler: H) -> ServerResult<()>
    where
        H: RpcHandler + 'static,
    {
        let method = method.into();
        let replaced = self
            .inner
            .handlers
            .write()
            .insert(method.clone(), Arc::new(handler))
            .is_some();
        debug!(method = %method, replaced, "Registered method handler");

        if self.inner.transport.is_connected() {
            self.ensure_subscribed().await?;
        }
        Ok(())
    }

    /// Remove the handler for `method`; later calls get "Method not found"
    pub fn unlisten(&self, method: &str) -> bool {
        self.inner.handlers.write().remove(method).is_some()
    }

    /// Get all registered methods
    pub fn registered_methods(&self) -> Vec<String> {
        self.inner.handlers.read().keys().cloned().collect()
    }

    /// Whether the request-channel subscription is live
    pub async fn is_listening(&self) -> bool {
        self.inner
            .subscription
            .lock()
            .await
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    /// Run one request through the registry and build its response.
    ///
    /// Never fails: unknown methods, handler errors and handler panics all
    /// become error responses.
    pub async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        self.inner.dispatch(request).await
    }

    /// Push a notification (no id, no response) to a channel, usually a caller's reply channel
    pub async fn notify(
        &self,
        channel: &str,
        method: impl Into<String>,
        params: Option<Value>,
    ) -> ServerResult<()> {
        let payload = JsonRpcNotification::new(method, params).to_json()?;
        self.inner.transport.publish(channel, payload).await?;
        Ok(())
    }

    /// Stop listening, wait for in-flight handlers, then close the transport
    pub async fn disconnect(&self) -> ServerResult<()> {
        info!(channel = %self.request_channel(), "Disconnecting RPC server");

        if let Some(subscription) = self.inner.subscription.lock().await.take() {
            subscription.unsubscribe();
        }

        self.inner.tasks.close();
        let drain = tokio::time::timeout(self.inner.config.shutdown_timeout, self.inner.tasks.wait());
        if drain.await.is_err() {
            warn!(
                in_flight = self.inner.tasks.len(),
                "Shutdown timeout elapsed with handlers still running"
            );
        }

        self.inner.transport.disconnect().await?;
        Ok(())
    }

    async fn ensure_subscribed(&self) -> ServerResult<()> {
        let mut slot = self.inner.subscription.lock().await;
        if slot.as_ref().is_some_and(Subscription::is_active) {
            return Ok(());
        }

        // Weak: the transport's delivery task must not keep the server alive
        let weak = Arc::downgrade(&self.inner);
        let on_message: MessageCallback = Arc::new(move |payload| {
            ServerInner::spawn_handling(&weak, payload);
        });

        let channel = self.inner.config.request_channel.clone();
        let subscription = self.inner.transport.subscribe(&channel, on_message).await?;
        info!(channel = %channel, "RPC server listening");

        *slot = Some(subscription);
        Ok(())
    }
}

impl ServerInner {
    /// Handlers are not serialized: every inbound payload gets its own task
    fn spawn_handling(weak: &Weak<ServerInner>, payload: String) {
        let Some(inner) = weak.upgrade() else {
            return;
        };

        let tasks = inner.tasks.clone();
        tasks.spawn(async move {
            let _permit = match &inner.limiter {
                Some(limiter) => match limiter.clone().acquire_owned().await {
                    Ok(permit) => Some(permit),
                    Err(_) => return,
                },
                None => None,
            };
            inner.handle_payload(&payload).await;
        });
    }

    async fn handle_payload(&self, payload: &str) {
        let value: Value = match serde_json::from_str(payload) {
            Ok(value) => value,
            Err(e) => {
                debug!(error = %e, "Dropping request payload that is not JSON");
                return;
            }
        };
        let Some(InboundRequest {
            request,
            raw_id,
            reply_channel,
        }) = InboundRequest::from_value(value)
        else {
            debug!("Ignoring payload that is not a request");
            return;
        };

        let is_call = is_call_id_value(&raw_id);
        let (method, response) = match request {
            Some(request) => {
                let method = request.method.clone();
                (method, self.dispatch(request).await)
            }
            None => {
                debug!(id = %raw_id, "Request has no string method");
                let response = JsonRpcResponse::error(None, JsonRpcErrorObject::method_not_found());
                (String::new(), response)
            }
        };

        if !is_call {
            trace!(method = %method, "Notification handled, no response sent");
            return;
        }

        let Some(channel) = reply_channel.or_else(|| self.config.fallback_reply_channel.clone())
        else {
            warn!(
                method = %method,
                id = %raw_id,
                "Call has no replyChannel, dropping response"
            );
            return;
        };

        let payload = match encode_reply(&response, raw_id) {
            Ok(payload) => payload,
            Err(e) => {
                error!(method = %method, error = %e, "Failed to encode response");
                return;
            }
        };

        if let Err(e) = self.transport.publish(&channel, payload).await {
            warn!(
                method = %method,
                channel = %channel,
                error = %e,
                "Failed to publish response"
            );
        }
    }

    async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();
        let handler = self.handlers.read().get(&request.method).cloned();

        let Some(handler) = handler else {
            debug!(method = %request.method, "Method not found");
            return JsonRpcResponse::error(id, JsonRpcErrorObject::method_not_found());
        };

        let method = request.method.clone();
        match AssertUnwindSafe(handler.handle(request)).catch_unwind().await {
            Ok(Ok(result)) => JsonRpcResponse::success(id, result),
            Ok(Err(e)) => {
                debug!(method = %method, error = %e, "Handler returned an error");
                JsonRpcResponse::error(id, e.to_error_object())
            }
            Err(panic) => {
                error!(method = %method, "Handler panicked");
                JsonRpcResponse::error(id, JsonRpcErrorObject::handler_error(panic_message(&*panic)))
            }
        }
    }
}

/// A request read field by field, so that calls with odd shapes still get an answer.
///
/// The `jsonrpc` member is not checked. Ids that do not fit [`RequestId`]
/// (fractional numbers, for instance) are still echoed back verbatim.
struct InboundRequest {
    /// `None` when `method` is missing or not a string
    request: Option<JsonRpcRequest>,
    raw_id: Value,
    reply_channel: Option<String>,
}

impl InboundRequest {
    /// `None` for payloads that cannot be requests: non-objects and responses
    fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut obj) = value else {
            return None;
        };

        let method = obj.remove("method");
        if method.is_none() && (obj.contains_key("result") || obj.contains_key("error")) {
            return None;
        }

        let raw_id = obj.remove("id").unwrap_or(Value::Null);
        let reply_channel = match obj.remove("replyChannel") {
            Some(Value::String(channel)) => Some(channel),
            _ => None,
        };

        let request = match method {
            Some(Value::String(method)) => Some(JsonRpcRequest {
                version: JsonRpcVersion::V2_0,
                method,
                params: obj.remove("params").filter(|params| !params.is_null()),
                id: RequestId::from_value(&raw_id),
                reply_channel: reply_channel.clone(),
            }),
            _ => None,
        };

        Some(Self {
            request,
            raw_id,
            reply_channel,
        })
    }
}

/// Encode `response` with the caller's id exactly as it was sent
fn encode_reply(response: &JsonRpcResponse, raw_id: Value) -> Result<String, serde_json::Error> {
    let mut body = serde_json::to_value(response)?;
    body["id"] = raw_id;
    serde_json::to_string(&body)
}

fn panic_message(panic: &(dyn Any + Send)) -> Option<String> {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
}

/// Builder for creating RPC servers
pub struct RpcServerBuilder {
    transport: Option<SharedTransport>,
    config: ServerConfig,
}

impl RpcServerBuilder {
    pub fn new() -> Self {
        Self {
            transport: None,
            config: ServerConfig::default(),
        }
    }

    pub fn with_transport(mut self, transport: SharedTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn request_channel(mut self, channel: impl Into<String>) -> Self {
        self.config.request_channel = channel.into();
        self
    }

    pub fn max_concurrent_handlers(mut self, limit: usize) -> Self {
        self.config.max_concurrent_handlers = Some(limit);
        self
    }

    pub fn fallback_reply_channel(mut self, channel: impl Into<String>) -> Self {
        self.config.fallback_reply_channel = Some(channel.into());
        self
    }

    pub fn build(self) -> ServerResult<RpcServer> {
        let transport = self
            .transport
            .ok_or_else(|| ServerError::config("Transport must be set before building server"))?;
        if self.config.request_channel.is_empty() {
            return Err(ServerError::config("Request channel must not be empty"));
        }
        Ok(RpcServer::new(transport, self.config))
    }
}

impl Default for RpcServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
