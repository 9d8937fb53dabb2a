//! JSON-RPC over `POST /mcp`: request context, tool errors and Host checks.

use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::{Value, json};
use switchyard_auth::AuthConfig;
use switchyard_mcp::router;
use tower::ServiceExt;

use crate::common::TestHarness;

const LOOPBACK: [&str; 3] = ["localhost", "127.0.0.1", "::1"];

fn call_echo(uri: &str, host: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Host", host)
        .header("User-Agent", "inspector/1.0")
        .header("Content-Type", "application/json")
        .header("Accept", "application/json, text/event-stream")
        .body(Body::from(
            json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "tools/call",
                "params": {"name": "echo", "arguments": {"msg": "hi"}}
            })
            .to_string(),
        ))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn hosts(names: &[&str]) -> Vec<String> {
    names.iter().map(|h| h.to_string()).collect()
}

#[tokio::test]
async fn test_tools_call_carries_query_and_agent() {
    let harness = TestHarness::default();
    let compute = harness.compute.clone();
    let app = router(
        harness.catalog().await,
        &AuthConfig::default(),
        hosts(&["mcp.example.com"]),
    );

    let resp = app
        .oneshot(call_echo("/mcp?tenant=acme", "mcp.example.com"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert_eq!(body["id"], 1);
    assert_eq!(body["result"]["isError"], false);
    assert_eq!(body["result"]["content"][0]["text"], "ok");

    let calls = compute.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].unit_id, "switchyard-echo");
    assert_eq!(calls[0].payload["input"], json!({"msg": "hi"}));
    assert_eq!(
        calls[0].side_channel,
        json!({"agent": "inspector/1.0", "query": {"tenant": "acme"}})
    );
}

#[tokio::test]
async fn test_tool_error_is_error_result() {
    let harness =
        TestHarness::with_response(json!({"status": "error", "content": [{"text": "boom"}]}));
    let app = router(harness.catalog().await, &AuthConfig::default(), Vec::new());

    let resp = app
        .oneshot(call_echo("/mcp", "mcp.example.com"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body = body_json(resp).await;
    assert!(body.get("error").is_none());
    assert_eq!(body["result"]["isError"], true);
    assert_eq!(body["result"]["content"][0]["text"], "boom");
}

#[tokio::test]
async fn test_platform_error_is_internal_error() {
    let harness = TestHarness::with_response(
        json!({"errorType": "TimeoutError", "errorMessage": "Task timed out"}),
    );
    let app = router(harness.catalog().await, &AuthConfig::default(), Vec::new());

    let resp = app
        .oneshot(call_echo("/mcp", "localhost:3000"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["error"]["code"], -32603);
}

#[tokio::test]
async fn test_loopback_hosts_reject_public_host() {
    let harness = TestHarness::default();
    let compute = harness.compute.clone();
    let app = router(harness.catalog().await, &AuthConfig::default(), hosts(&LOOPBACK));

    let resp = app
        .clone()
        .oneshot(call_echo("/mcp", "mcp.example.com"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(compute.calls().is_empty());

    let resp = app
        .oneshot(call_echo("/mcp", "127.0.0.1:3000"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_listed_public_host_is_accepted() {
    let mut allowed = hosts(&LOOPBACK);
    allowed.push("mcp.example.com".to_string());
    let app = router(
        TestHarness::default().catalog().await,
        &AuthConfig::default(),
        allowed,
    );

    for host in ["mcp.example.com", "mcp.example.com:8443"] {
        let resp = app.clone().oneshot(call_echo("/mcp", host)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{host}");
    }
    let resp = app
        .oneshot(call_echo("/mcp", "evil.example.com"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_empty_host_list_accepts_any_host() {
    let app = router(
        TestHarness::default().catalog().await,
        &AuthConfig::default(),
        Vec::new(),
    );
    let resp = app
        .oneshot(call_echo("/mcp", "anything.internal:8080"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
