//! Capability listing and dispatch through a built server.

use rmcp::model::{ErrorCode, PromptMessageContent, RawContent, ResourceContents};
use serde_json::json;
use switchyard_core::InvocationContext;

use crate::common::TestHarness;

fn text_of(content: &rmcp::model::Content) -> &str {
    match &content.raw {
        RawContent::Text(t) => &t.text,
        other => panic!("expected text content, got {other:?}"),
    }
}

#[tokio::test]
async fn test_only_valid_entries_are_listed() {
    let server = TestHarness::default().catalog().await.current();

    let tools: Vec<String> = server.tools().iter().map(|t| t.name.to_string()).collect();
    assert_eq!(tools, vec!["echo"]);
    let prompts: Vec<String> = server.prompts().iter().map(|p| p.name.clone()).collect();
    assert_eq!(prompts, vec!["greet"]);
    let uris: Vec<String> = server.resources().iter().map(|r| r.uri.clone()).collect();
    assert_eq!(uris, vec!["doc://guide"]);
    assert_eq!(
        server.resources()[0].description.as_deref(),
        Some("Operator guide")
    );

    let echo = &server.tools()[0];
    assert_eq!(echo.description.as_deref(), Some("Echo a message"));
    assert_eq!(echo.input_schema["properties"]["msg"]["type"], "string");
}

#[tokio::test]
async fn test_tool_call_reaches_compute_with_context() {
    let harness = TestHarness::with_response(json!({"content": [{"text": "hi back"}]}));
    let compute = harness.compute.clone();
    let server = harness.catalog().await.current();

    let context = InvocationContext::new()
        .with("agent", "inspector/1.0")
        .with("query", json!({"tenant": "acme"}));
    let result = server
        .call(
            "echo",
            json!({"msg": "hi"}).as_object().cloned(),
            context.clone(),
        )
        .await
        .unwrap();

    assert_eq!(result.is_error, Some(false));
    assert_eq!(text_of(&result.content[0]), "hi back");

    let calls = compute.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].unit_id, "switchyard-echo");
    assert_eq!(calls[0].payload["input"], json!({"msg": "hi"}));
    assert_eq!(calls[0].side_channel, context.to_value());
}

#[tokio::test]
async fn test_tool_error_status_is_error_result() {
    let harness = TestHarness::with_response(json!({
        "status": "error",
        "content": [{"text": "boom"}]
    }));
    let server = harness.catalog().await.current();

    let result = server
        .call("echo", json!({"msg": "x"}).as_object().cloned(), InvocationContext::new())
        .await
        .unwrap();
    assert_eq!(result.is_error, Some(true));
    assert_eq!(text_of(&result.content[0]), "boom");
}

#[tokio::test]
async fn test_platform_error_is_internal_error() {
    let harness = TestHarness::with_response(json!({
        "errorType": "Runtime.Crash",
        "errorMessage": "oops"
    }));
    let server = harness.catalog().await.current();

    let err = server
        .call("echo", json!({"msg": "x"}).as_object().cloned(), InvocationContext::new())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INTERNAL_ERROR);
    assert!(err.message.contains("oops"));
}

#[tokio::test]
async fn test_invalid_arguments_never_reach_compute() {
    let harness = TestHarness::default();
    let compute = harness.compute.clone();
    let server = harness.catalog().await.current();

    let err = server
        .call("echo", json!({"msg": 42}).as_object().cloned(), InvocationContext::new())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert!(compute.calls().is_empty());
}

#[tokio::test]
async fn test_resource_read_returns_static_content() {
    let server = TestHarness::default().catalog().await.current();

    let result = server
        .read("doc://guide", InvocationContext::new())
        .await
        .unwrap();
    assert_eq!(result.contents.len(), 1);
    match &result.contents[0] {
        ResourceContents::TextResourceContents { text, .. } => assert_eq!(text, "Read me"),
        other => panic!("expected text resource, got {other:?}"),
    }
}

#[tokio::test]
async fn test_prompt_renders_input_and_context() {
    let server = TestHarness::default().catalog().await.current();

    let result = server
        .prompt(
            "greet",
            json!({"who": "Ada"}).as_object().cloned(),
            InvocationContext::new().with("agent", "inspector"),
        )
        .await
        .unwrap();

    assert_eq!(result.description.as_deref(), Some("Greet someone"));
    match &result.messages[0].content {
        PromptMessageContent::Text { text } => assert_eq!(text, "Hello Ada from inspector"),
        other => panic!("expected text message, got {other:?}"),
    }
}

#[tokio::test]
async fn test_prompt_missing_argument_is_invalid_params() {
    let server = TestHarness::default().catalog().await.current();

    let err = server
        .prompt("greet", None, InvocationContext::new())
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
    assert!(err.message.contains("who: required parameter is missing"));
}
