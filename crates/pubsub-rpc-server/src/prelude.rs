//! # Server Prelude
//!
//! ```rust
//! use pubsub_rpc_server::prelude::*;
//! ```

pub use crate::config::ServerConfig;
pub use crate::error::{ServerError, ServerResult};
pub use crate::handler::{HandlerError, RpcHandler, handler_fn};
pub use crate::server::{RpcServer, RpcServerBuilder};

pub use async_trait::async_trait;
pub use pubsub_rpc_protocol::prelude::*;
