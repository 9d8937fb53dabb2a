//! The HTTP router: health, method handling, auth gate and discovery.

use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::{Value, json};
use switchyard_auth::{AuthConfig, AuthMode};
use switchyard_mcp::{HealthResponse, router};
use tower::ServiceExt;

use crate::common::TestHarness;

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_reports_counts() {
    let catalog = TestHarness::default().catalog().await;
    let app = router(catalog, &AuthConfig::default(), Vec::new());

    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let health: HealthResponse = serde_json::from_value(body_json(resp).await).unwrap();
    assert_eq!(health.status, "healthy");
    assert_eq!(health.server_name, "switchyard-test");
    assert_eq!(health.version, "0.0.1");
    assert_eq!(
        (health.tool_count, health.prompt_count, health.resource_count),
        (1, 1, 1)
    );
}

#[tokio::test]
async fn test_get_and_delete_mcp_are_not_allowed() {
    let catalog = TestHarness::default().catalog().await;
    let app = router(catalog, &AuthConfig::default(), Vec::new());

    for method in ["GET", "DELETE"] {
        let req = Request::builder()
            .method(method)
            .uri("/mcp")
            .body(Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(
            body_json(resp).await,
            json!({"jsonrpc": "2.0", "error": {"code": -32000, "message": "Method not allowed."}, "id": null})
        );
    }
}

#[tokio::test]
async fn test_token_mode_rejects_missing_token() {
    let catalog = TestHarness::default().catalog().await;
    let auth = AuthConfig {
        mode: AuthMode::Token,
        tokens: vec!["s3cret".to_string()],
        ..Default::default()
    };
    let app = router(catalog, &auth, Vec::new());

    let req = Request::builder()
        .method("POST")
        .uri("/mcp")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}).to_string(),
        ))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"]["code"], -32600);

    // Health stays public.
    let resp = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_discovery_routes_only_in_oauth_mode() {
    let catalog = TestHarness::default().catalog().await;
    let app = router(catalog.clone(), &AuthConfig::default(), Vec::new());
    let resp = app
        .oneshot(get("/.well-known/oauth-protected-resource"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let auth = AuthConfig {
        mode: AuthMode::OAuth,
        resource_url: "https://switchyard.example".to_string(),
        issuer: "https://issuer.example".to_string(),
        jwks_url: "https://issuer.example/jwks".to_string(),
        ..Default::default()
    };
    let app = router(catalog, &auth, Vec::new());
    let resp = app
        .oneshot(get("/.well-known/oauth-protected-resource"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let metadata = body_json(resp).await;
    assert_eq!(metadata["resource"], "https://switchyard.example");
    assert_eq!(metadata["authorization_servers"][0], "https://issuer.example");
}
