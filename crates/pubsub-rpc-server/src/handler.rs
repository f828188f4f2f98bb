//! Method handlers

use std::future::Future;

use async_trait::async_trait;
use pubsub_rpc_protocol::{JsonRpcErrorObject, JsonRpcRequest, ProtocolError};
use serde_json::Value;
use thiserror::Error;

/// Failure returned by a method handler.
///
/// Every variant ends up in the `error` field of the response; the server
/// never propagates it further.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Reported as code -32000 with this message ("Internal error" if empty)
    #[error("{0}")]
    Failed(String),

    /// Forwarded to the caller as-is, code and data included
    #[error("{0}")]
    Rpc(JsonRpcErrorObject),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Convert to the error object placed in the response
    pub fn to_error_object(&self) -> JsonRpcErrorObject {
        match self {
            HandlerError::Failed(message) => {
                JsonRpcErrorObject::handler_error(Some(message.clone()))
            }
            HandlerError::Rpc(error) => error.clone(),
        }
    }
}

impl From<JsonRpcErrorObject> for HandlerError {
    fn from(error: JsonRpcErrorObject) -> Self {
        Self::Rpc(error)
    }
}

impl From<ProtocolError> for HandlerError {
    fn from(error: ProtocolError) -> Self {
        match error {
            ProtocolError::InvalidParams(message) => {
                Self::Rpc(JsonRpcErrorObject::invalid_params(&message))
            }
            other => Self::Failed(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(error: serde_json::Error) -> Self {
        Self::Failed(error.to_string())
    }
}

impl From<anyhow::Error> for HandlerError {
    fn from(error: anyhow::Error) -> Self {
        Self::Failed(error.to_string())
    }
}

/// Trait for serving calls to one registered method
#[async_trait]
pub trait RpcHandler: Send + Sync {
    /// Handle a request. The returned value becomes the response `result`.
    async fn handle(&self, request: JsonRpcRequest) -> Result<Value, HandlerError>;
}

/// A handler backed by an async closure, see [`handler_fn`]
#[derive(Clone)]
pub struct FnHandler<F> {
    f: F,
}

/// Wrap an async closure as an [`RpcHandler`].
///
/// ```rust
/// use pubsub_rpc_server::{HandlerError, handler_fn};
/// use serde_json::json;
///
/// let soma = handler_fn(|req| async move {
///     let a = req.get_param("a").and_then(|v| v.as_i64()).unwrap_or_default();
///     let b = req.get_param("b").and_then(|v| v.as_i64()).unwrap_or_default();
///     Ok::<_, HandlerError>(json!(a + b))
/// });
/// ```
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(JsonRpcRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, HandlerError>> + Send,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> RpcHandler for FnHandler<F>
where
    F: Fn(JsonRpcRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, HandlerError>> + Send,
{
    async fn handle(&self, request: JsonRpcRequest) -> Result<Value, HandlerError> {
        (self.f)(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fn_handler() {
        let handler = handler_fn(|req: JsonRpcRequest| async move {
            Ok(json!({"echo": req.method}))
        });

        let request = JsonRpcRequest::notification("ping", None);
        let result = handler.handle(request).await.unwrap();
        assert_eq!(result["echo"], "ping");
    }

    #[test]
    fn test_error_objects() {
        let failed = HandlerError::failed("Erro esperado").to_error_object();
        assert_eq!(failed.code, -32000);
        assert_eq!(failed.message, "Erro esperado");

        let empty = HandlerError::failed("").to_error_object();
        assert_eq!(empty.message, "Internal error");

        let custom = HandlerError::from(JsonRpcErrorObject::server_error(
            -32001,
            "insufficient funds",
            Some(json!({"balance": 0})),
        ))
        .to_error_object();
        assert_eq!(custom.code, -32001);
        assert_eq!(custom.data, Some(json!({"balance": 0})));
    }

    #[test]
    fn test_invalid_params_conversion() {
        let error: HandlerError = ProtocolError::InvalidParams("missing field `a`".into()).into();
        assert_eq!(error.to_error_object().code, -32602);

        let error: HandlerError = anyhow::anyhow!("database unavailable").into();
        assert_eq!(error.to_error_object().message, "database unavailable");
    }
}
