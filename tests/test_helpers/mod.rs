//! Shared fixtures for the pub/sub RPC integration tests
//!
//! Every test builds its own [`MemoryBus`], so tests never share channels
//! even when they run in parallel.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use pubsub_rpc_client::{ClientConfig, RpcClient};
use pubsub_rpc_protocol::JsonRpcRequest;
use pubsub_rpc_server::{HandlerError, RpcServer, ServerConfig, handler_fn};
use pubsub_rpc_transport::{MemoryBus, MemoryTransport};
use serde::Deserialize;
use serde_json::{Value, json};

static TRACING: Once = Once::new();

/// Route library logs to the test output (`RUST_LOG=debug cargo test`)
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

#[derive(Debug, Deserialize)]
pub struct SomaParams {
    pub a: i64,
    pub b: i64,
}

/// Server on `bus` with `soma` and `erro` registered and connected
pub async fn calculator_server(bus: &MemoryBus, config: ServerConfig) -> RpcServer {
    init_tracing();
    let server = RpcServer::new(Arc::new(MemoryTransport::new(bus.clone())), config);
    server.connect().await.expect("server connects");

    server
        .listen(
            "soma",
            handler_fn(|req: JsonRpcRequest| async move {
                let params: SomaParams = req.parse_params()?;
                Ok(json!(params.a + params.b))
            }),
        )
        .await
        .expect("register soma");
    server
        .listen(
            "erro",
            handler_fn(|_req: JsonRpcRequest| async move {
                Err::<Value, _>(HandlerError::failed("Erro esperado"))
            }),
        )
        .await
        .expect("register erro");

    server
}

/// Connected client on `bus` with its own transport
pub async fn client(bus: &MemoryBus, config: ClientConfig) -> RpcClient {
    init_tracing();
    let client = RpcClient::new(Arc::new(MemoryTransport::new(bus.clone())), config);
    client.connect().await.expect("client connects");
    client
}
