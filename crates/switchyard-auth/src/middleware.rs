//! Tower authentication middleware.
//!
//! `AuthLayer` and `AuthService` gate any inner service on a bearer token,
//! then attach the caller [`Identity`] and an [`InvocationContext`] to the
//! request extensions. Rejections use JSON-RPC error envelopes so MCP
//! clients can surface them.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::IntoResponse;
use http::{Request, StatusCode};
use switchyard_core::InvocationContext;
use tower::{Layer, Service};

use crate::context::build_context;
use crate::{AuthConfig, Identity, TokenValidator};

/// Tower `Layer` that wraps services with token authentication.
#[derive(Clone)]
pub struct AuthLayer {
    validator: Option<Arc<dyn TokenValidator>>,
    config: AuthConfig,
}

impl AuthLayer {
    /// Create a new auth layer. A `None` validator lets every request through.
    pub fn new(validator: Option<Arc<dyn TokenValidator>>, config: AuthConfig) -> Self {
        Self { validator, config }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            validator: self.validator.clone(),
            config: self.config.clone(),
        }
    }
}

/// Tower `Service` that validates tokens before forwarding requests.
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    validator: Option<Arc<dyn TokenValidator>>,
    config: AuthConfig,
}

impl<S> Service<Request<Body>> for AuthService<S>
where
    S: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send,
{
    type Response = axum::response::Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let validator = self.validator.clone();
        let config = self.config.clone();

        Box::pin(async move {
            let token = extract_bearer_token(&req).map(str::to_string);

            let identity = match validator {
                None => None,
                Some(validator) => {
                    let Some(token) = token.as_deref() else {
                        log::warn!("Rejected request without bearer token");
                        return Ok(unauthorized_response(&config.resource_url));
                    };
                    match validator.validate(token).await {
                        Ok(identity) => Some(identity),
                        Err(auth_err) if auth_err.is_client_error() => {
                            log::warn!("Authentication failed: {auth_err}");
                            return Ok(unauthorized_response(&config.resource_url));
                        }
                        Err(auth_err) => {
                            log::error!("Authentication backend error: {auth_err}");
                            return Ok(internal_error_response());
                        }
                    }
                }
            };

            let context: InvocationContext = build_context(
                req.uri(),
                req.headers(),
                identity.as_ref(),
                token.as_deref(),
                config.forward_token,
            );
            req.extensions_mut().insert(context);
            if let Some(identity) = identity {
                req.extensions_mut().insert::<Identity>(identity);
            }

            let resp = inner
                .call(req)
                .await
                .unwrap_or_else(|infallible| match infallible {});
            Ok(resp.into_response())
        })
    }
}

/// Extract bearer token from the Authorization header.
fn extract_bearer_token(req: &Request<Body>) -> Option<&str> {
    req.headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn jsonrpc_error(status: StatusCode, code: i64, message: &str) -> axum::response::Response {
    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "error": { "code": code, "message": message },
        "id": null,
    });
    (
        status,
        [(http::header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
        .into_response()
}

/// Build a 401 JSON-RPC response, pointing at the resource metadata when a
/// public URL is configured.
fn unauthorized_response(resource_url: &str) -> axum::response::Response {
    let mut response = jsonrpc_error(StatusCode::UNAUTHORIZED, -32600, "Unauthorized");

    if !resource_url.is_empty() {
        let www_auth = format!(
            r#"Bearer resource_metadata="{}/.well-known/oauth-protected-resource""#,
            resource_url.trim_end_matches('/')
        );
        if let Ok(value) = http::HeaderValue::from_str(&www_auth) {
            response
                .headers_mut()
                .insert(http::header::WWW_AUTHENTICATE, value);
        }
    }

    response
}

fn internal_error_response() -> axum::response::Response {
    jsonrpc_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        -32603,
        "Internal server error",
    )
}
