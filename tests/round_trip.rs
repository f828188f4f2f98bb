//! # Call / Response Round Trip
//!
//! End-to-end calls through a server and a client sharing one in-memory bus.
//!
//! Tests:
//! 1. `soma` resolves with the sum and the full response
//! 2. A failing handler surfaces its message on the client
//! 3. Unknown methods fail with "Method not found" (-32601)
//! 4. Invalid params become -32602
//! 5. A silent method times out and its late response settles nothing
//! 6. Many concurrent calls each get their own result

mod test_helpers;

use std::time::Duration;

use pubsub_rpc_client::{ClientConfig, ClientError};
use pubsub_rpc_protocol::{JsonRpcRequest, RequestId};
use pubsub_rpc_server::{ServerConfig, handler_fn};
use pubsub_rpc_transport::MemoryBus;
use serde_json::json;
use test_helpers::{calculator_server, client};

#[tokio::test]
async fn test_soma_round_trip() {
    let bus = MemoryBus::new();
    let _server = calculator_server(&bus, ServerConfig::default()).await;
    let client = client(&bus, ClientConfig::default()).await;

    let response = client
        .call("soma", Some(json!({"a": 2, "b": 3})))
        .await
        .unwrap();

    assert_eq!(response.result, Some(json!(5)));
    assert!(response.error.is_none());
    assert!(matches!(response.id, Some(RequestId::String(ref id)) if !id.is_empty()));
    assert_eq!(client.pending_calls(), 0);
}

#[tokio::test]
async fn test_handler_error_propagates_message() {
    let bus = MemoryBus::new();
    let _server = calculator_server(&bus, ServerConfig::default()).await;
    let client = client(&bus, ClientConfig::default()).await;

    let error = client.call("erro", None).await.unwrap_err();

    assert!(error.to_string().contains("Erro esperado"));
    assert_eq!(error.error_code(), Some(-32000));
}

#[tokio::test]
async fn test_method_not_found() {
    let bus = MemoryBus::new();
    let _server = calculator_server(&bus, ServerConfig::default()).await;
    let client = client(&bus, ClientConfig::default()).await;

    let error = client.call("multiplica", None).await.unwrap_err();

    assert_eq!(error.to_string(), "Method not found");
    assert_eq!(error.error_code(), Some(-32601));
}

#[tokio::test]
async fn test_invalid_params() {
    let bus = MemoryBus::new();
    let _server = calculator_server(&bus, ServerConfig::default()).await;
    let client = client(&bus, ClientConfig::default()).await;

    let error = client
        .call("soma", Some(json!({"a": "two"})))
        .await
        .unwrap_err();

    assert_eq!(error.error_code(), Some(-32602));
}

#[tokio::test]
async fn test_timeout_then_late_response_is_ignored() {
    let bus = MemoryBus::new();
    let server = calculator_server(&bus, ServerConfig::default()).await;
    server
        .listen(
            "lento",
            handler_fn(|_req: JsonRpcRequest| async move {
                tokio::time::sleep(Duration::from_millis(150)).await;
                Ok(json!("tarde"))
            }),
        )
        .await
        .unwrap();
    let client = client(&bus, ClientConfig::default()).await;

    let error = client
        .call_with_timeout("lento", None, Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(error, ClientError::Timeout));
    assert_eq!(error.to_string(), "Timeout");
    assert_eq!(client.pending_calls(), 0);

    // Let the late response arrive; the client is still usable afterwards
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(client.pending_calls(), 0);

    let response = client
        .call("soma", Some(json!({"a": 1, "b": 1})))
        .await
        .unwrap();
    assert_eq!(response.result, Some(json!(2)));
}

#[tokio::test]
async fn test_concurrent_calls_are_correlated() {
    let bus = MemoryBus::new();
    let _server = calculator_server(&bus, ServerConfig::default()).await;
    let client = client(&bus, ClientConfig::default()).await;

    let calls = (0..20i64).map(|i| {
        let client = client.clone();
        tokio::spawn(async move {
            let response = client
                .call("soma", Some(json!({"a": i, "b": 100})))
                .await
                .unwrap();
            (i, response.result)
        })
    });

    for call in calls.collect::<Vec<_>>() {
        let (i, result) = call.await.unwrap();
        assert_eq!(result, Some(json!(i + 100)));
    }
    assert_eq!(client.pending_calls(), 0);
}
