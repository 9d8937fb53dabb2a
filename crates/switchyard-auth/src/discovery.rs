//! OAuth discovery metadata endpoints.
//!
//! Serves the two documents MCP clients fetch before authenticating:
//!
//! - **Protected Resource Metadata** (RFC 9728) at
//!   `/.well-known/oauth-protected-resource`
//! - **Authorization Server Metadata** (RFC 8414) at
//!   `/.well-known/oauth-authorization-server`
//!
//! Both are also mounted with an `/mcp` suffix.

use axum::Json;
use axum::routing::get;
use serde_json::{Value, json};

/// Create an axum `Router` with the discovery routes.
///
/// - `resource_url`: public URL of this server
/// - `issuer`: the authorization server (the JWT `iss`)
/// - `jwks_url`: where the issuer publishes its signing keys
pub fn discovery_routes(resource_url: &str, issuer: &str, jwks_url: &str) -> axum::Router {
    let resource = protected_resource_metadata(resource_url, issuer);
    let authorization = authorization_server_metadata(issuer, jwks_url);

    let resource_1 = resource.clone();
    let authorization_1 = authorization.clone();

    axum::Router::new()
        .route(
            "/.well-known/oauth-protected-resource",
            get(move || async move { Json(resource) }),
        )
        .route(
            "/.well-known/oauth-protected-resource/mcp",
            get(move || async move { Json(resource_1) }),
        )
        .route(
            "/.well-known/oauth-authorization-server",
            get(move || async move { Json(authorization) }),
        )
        .route(
            "/.well-known/oauth-authorization-server/mcp",
            get(move || async move { Json(authorization_1) }),
        )
}

fn protected_resource_metadata(resource_url: &str, issuer: &str) -> Value {
    json!({
        "resource": resource_url,
        "authorization_servers": [issuer],
        "bearer_methods_supported": ["header"]
    })
}

fn authorization_server_metadata(issuer: &str, jwks_url: &str) -> Value {
    json!({
        "issuer": issuer,
        "jwks_uri": jwks_url,
        "response_types_supported": ["code"],
        "grant_types_supported": ["authorization_code", "refresh_token"],
        "id_token_signing_alg_values_supported": ["RS256"],
        "code_challenge_methods_supported": ["S256"]
    })
}
