//! # Pub/Sub JSON-RPC Server
//!
//! Registers named method handlers and serves them over a single shared
//! request channel. Each call is answered on the reply channel named in the
//! request; notifications are handled but never answered.
//!
//! ## Features
//! - One subscription for all methods, opened lazily
//! - Handlers run concurrently, optionally bounded
//! - Handler errors and panics become JSON-RPC error responses
//! - Graceful shutdown that waits for in-flight handlers
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), pubsub_rpc_server::ServerError> {
//! use std::sync::Arc;
//! use pubsub_rpc_server::{HandlerError, RpcServer, handler_fn};
//! use pubsub_rpc_transport::{MemoryBus, MemoryTransport};
//! use serde_json::json;
//!
//! let server = RpcServer::builder()
//!     .with_transport(Arc::new(MemoryTransport::new(MemoryBus::new())))
//!     .build()?;
//! server.connect().await?;
//!
//! server
//!     .listen("soma", handler_fn(|req| async move {
//!         let a = req.get_param("a").and_then(|v| v.as_i64()).unwrap_or_default();
//!         let b = req.get_param("b").and_then(|v| v.as_i64()).unwrap_or_default();
//!         Ok::<_, HandlerError>(json!(a + b))
//!     }))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod server;

pub mod prelude;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{FnHandler, HandlerError, RpcHandler, handler_fn};
pub use server::{RpcServer, RpcServerBuilder};
