//! # Publish/Subscribe Transport Layer
//!
//! The RPC server and client never talk to each other directly. They only
//! publish text payloads to named channels and subscribe callbacks to
//! channels. This crate defines that seam ([`Transport`]) and ships an
//! in-process implementation ([`MemoryTransport`]) used by tests, demos and
//! embedded deployments.
//!
//! A transport is expected to deliver every published payload to all
//! current subscribers of the channel, at least once. Persistence, replay
//! and ordering across channels are out of scope.
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), pubsub_rpc_transport::TransportError> {
//! use std::sync::Arc;
//! use pubsub_rpc_transport::{MemoryBus, MemoryTransport, Transport};
//!
//! let bus = MemoryBus::new();
//! let transport = MemoryTransport::new(bus);
//! transport.connect().await?;
//!
//! let _subscription = transport
//!     .subscribe("greetings", Arc::new(|payload: String| println!("{payload}")))
//!     .await?;
//! transport.publish("greetings", "hello".to_string()).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod memory;
pub mod subscription;
pub mod transport;

pub use error::{TransportError, TransportResult};
pub use memory::{MemoryBus, MemoryTransport, MemoryTransportConfig};
pub use subscription::Subscription;
pub use transport::{MessageCallback, SharedTransport, Transport, TransportStatistics};
