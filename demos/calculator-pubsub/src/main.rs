//! # Calculator over Pub/Sub
//!
//! Runs a JSON-RPC server and a client in one process, connected through an
//! in-memory bus, and exercises the main call paths: a successful call, a
//! handler error, an unknown method, a timeout and a server notification.
//!
//! ## Usage
//! ```bash
//! cargo run --package calculator-pubsub -- --a 2 --b 3
//! RUST_LOG=debug cargo run --package calculator-pubsub -- --timeout-ms 100
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pubsub_rpc_client::{ClientConfig, RpcClient};
use pubsub_rpc_protocol::JsonRpcRequest;
use pubsub_rpc_server::{HandlerError, RpcServer, ServerConfig, handler_fn};
use pubsub_rpc_transport::{MemoryBus, MemoryTransport, Transport};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Shared request channel
    #[arg(long, default_value = pubsub_rpc_protocol::DEFAULT_REQUEST_CHANNEL)]
    channel: String,

    /// First operand
    #[arg(long, default_value_t = 2)]
    a: i64,

    /// Second operand
    #[arg(long, default_value_t = 3)]
    b: i64,

    /// Client call timeout in milliseconds
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    /// Upper bound on concurrently running handlers (0 = unbounded)
    #[arg(long, default_value_t = 0)]
    max_handlers: usize,
}

#[derive(Deserialize)]
struct Operands {
    a: i64,
    b: i64,
}

async fn start_server(bus: &MemoryBus, args: &Args) -> Result<RpcServer> {
    let config = ServerConfig::default()
        .with_request_channel(&args.channel)
        .with_max_concurrent_handlers(args.max_handlers);
    let server = RpcServer::new(Arc::new(MemoryTransport::new(bus.clone())), config);
    server.connect().await?;

    server
        .listen(
            "soma",
            handler_fn(|req: JsonRpcRequest| async move {
                let Operands { a, b } = req.parse_params()?;
                Ok(json!(a + b))
            }),
        )
        .await?;
    server
        .listen(
            "divide",
            handler_fn(|req: JsonRpcRequest| async move {
                let Operands { a, b } = req.parse_params()?;
                let quotient = a
                    .checked_div(b)
                    .ok_or_else(|| HandlerError::failed("Division by zero"))?;
                Ok(json!(quotient))
            }),
        )
        .await?;
    server
        .listen(
            "erro",
            handler_fn(|_req: JsonRpcRequest| async move {
                Err::<Value, _>(HandlerError::failed("Erro esperado"))
            }),
        )
        .await?;
    server
        .listen(
            "dorme",
            handler_fn(|req: JsonRpcRequest| async move {
                let millis = req.get_param("ms").and_then(Value::as_u64).unwrap_or(1000);
                tokio::time::sleep(Duration::from_millis(millis)).await;
                Ok(json!("acordei"))
            }),
        )
        .await?;

    info!(methods = ?server.registered_methods(), "Server ready");
    Ok(server)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let bus = MemoryBus::new();

    let server = start_server(&bus, &args)
        .await
        .context("failed to start server")?;

    let client_transport = Arc::new(MemoryTransport::new(bus.clone()));
    let client = RpcClient::new(
        client_transport.clone(),
        ClientConfig::default()
            .with_request_channel(&args.channel)
            .with_request_timeout(Duration::from_millis(args.timeout_ms)),
    );
    client.connect().await.context("failed to connect client")?;
    info!(reply_channel = %client.reply_channel(), "Client ready");

    client.on_notification("aviso", |params| {
        info!(params = ?params, "Notification received");
    });

    let response = client
        .call("soma", Some(json!({"a": args.a, "b": args.b})))
        .await?;
    info!(a = args.a, b = args.b, result = %response.result_or_null(), "soma");

    match client
        .call("divide", Some(json!({"a": args.a, "b": args.b})))
        .await
    {
        Ok(response) => info!(result = %response.result_or_null(), "divide"),
        Err(e) => warn!(error = %e, "divide failed"),
    }

    if let Err(e) = client.call("erro", None).await {
        info!(error = %e, code = ?e.error_code(), "erro failed as expected");
    }

    if let Err(e) = client.call("multiplica", None).await {
        info!(error = %e, code = ?e.error_code(), "multiplica is not registered");
    }

    if let Err(e) = client
        .call_with_timeout("dorme", Some(json!({"ms": 200})), Duration::from_millis(50))
        .await
    {
        info!(error = %e, "dorme timed out as expected");
    }

    server
        .notify(client.reply_channel(), "aviso", Some(json!({"texto": "ola"})))
        .await?;
    tokio::time::sleep(Duration::from_millis(50)).await;

    client.disconnect().await?;
    server.disconnect().await?;

    let stats = client_transport.statistics();
    info!(
        published = stats.messages_published,
        delivered = stats.messages_delivered,
        "Client transport statistics"
    );
    Ok(())
}
