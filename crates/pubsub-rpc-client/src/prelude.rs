//! # Client Prelude
//!
//! ```rust
//! use pubsub_rpc_client::prelude::*;
//! ```

pub use crate::client::{RpcClient, RpcClientBuilder};
pub use crate::config::ClientConfig;
pub use crate::error::{ClientError, ClientResult};

pub use pubsub_rpc_protocol::prelude::*;
