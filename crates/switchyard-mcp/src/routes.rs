//! Streamable HTTP transport.
//!
//! Routes:
//!
//! - `POST /mcp`: stateless MCP endpoint, one server snapshot per request
//! - `GET /mcp`, `DELETE /mcp`: 405, no sessions to stream or close
//! - `GET /health`: [`HealthResponse`] for the current snapshot
//! - `/.well-known/*`: OAuth discovery documents (`oauth` mode only)
//!
//! `/mcp` sits behind the auth layer and answers with plain JSON rather than
//! an SSE stream. Its `Host` header must be one of the allowed hosts; an
//! empty list accepts any host. Every request is logged, and a panicking
//! handler is answered with a JSON-RPC internal error.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use axum::extract::{Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post_service};
use axum::{Json, Router};
use futures::FutureExt;
use http::StatusCode;
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use switchyard_auth::{AuthConfig, AuthMode, discovery_routes};

use crate::catalog::Catalog;
use crate::error::Result;
use crate::health::HealthResponse;
use crate::server::SwitchyardServer;

/// Build the HTTP router over a live catalog.
///
/// `allowed_hosts` lists the `Host` values (`name` or `name:port`) accepted
/// on `/mcp`. Empty disables the check.
pub fn router(catalog: Catalog, auth: &AuthConfig, allowed_hosts: Vec<String>) -> Router {
    if allowed_hosts.is_empty() {
        log::warn!("Host header validation is disabled for /mcp");
    }
    let config = StreamableHttpServerConfig::default()
        .with_stateful_mode(false)
        .with_json_response(true)
        .with_allowed_hosts(allowed_hosts);

    let factory_catalog = catalog.clone();
    let mcp_service: StreamableHttpService<SwitchyardServer, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(factory_catalog.current()),
            LocalSessionManager::default().into(),
            config,
        );

    let mcp = Router::new()
        .route(
            "/mcp",
            post_service(mcp_service)
                .get(method_not_allowed)
                .delete(method_not_allowed),
        )
        .layer(auth.layer());

    let health_routes = Router::new()
        .route("/health", get(health))
        .with_state(catalog);

    let mut app = Router::new().merge(mcp).merge(health_routes);
    if auth.mode == AuthMode::OAuth {
        app = app.merge(discovery_routes(
            &auth.resource_url,
            &auth.issuer,
            &auth.jwks_url,
        ));
    }

    app.layer(middleware::from_fn(log_request))
        .layer(middleware::from_fn(catch_panic))
}

/// Serve `router` on `bind` until `shutdown` resolves.
pub async fn serve_http<F>(router: Router, bind: &str, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(bind).await?;
    log::info!("MCP endpoint listening on http://{}/mcp", listener.local_addr()?);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

async fn health(State(catalog): State<Catalog>) -> Json<HealthResponse> {
    Json(HealthResponse::for_server(&catalog.current()))
}

async fn method_not_allowed() -> Response {
    jsonrpc_error(
        StatusCode::METHOD_NOT_ALLOWED,
        -32000,
        "Method not allowed.",
    )
}

async fn log_request(req: Request, next: Next) -> Response {
    log::info!("{} {}", req.method(), req.uri());
    next.run(req).await
}

async fn catch_panic(req: Request, next: Next) -> Response {
    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(_) => {
            log::error!("Request handler panicked");
            jsonrpc_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                -32603,
                "Internal server error",
            )
        }
    }
}

fn jsonrpc_error(status: StatusCode, code: i64, message: &str) -> Response {
    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "error": { "code": code, "message": message },
        "id": null,
    });
    (status, Json(body)).into_response()
}
