//! # Pub/Sub JSON-RPC Client
//!
//! Sends calls to a server's shared request channel and matches the
//! responses that come back on a private reply channel
//! (`{base}:resp:{uuid}`), so any number of clients can share one server
//! without seeing each other's traffic.
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), pubsub_rpc_client::ClientError> {
//! use std::sync::Arc;
//! use std::time::Duration;
//! use pubsub_rpc_client::RpcClient;
//! use pubsub_rpc_transport::{MemoryBus, MemoryTransport};
//! use serde_json::json;
//!
//! let client = RpcClient::builder()
//!     .with_transport(Arc::new(MemoryTransport::new(MemoryBus::new())))
//!     .request_timeout(Duration::from_secs(2))
//!     .build()?;
//! client.connect().await?;
//!
//! let response = client.call("soma", Some(json!({"a": 2, "b": 3}))).await?;
//! println!("{}", response.result_or_null());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
mod pending;

pub mod prelude;

pub use client::{NotificationHandler, RpcClient, RpcClientBuilder};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
