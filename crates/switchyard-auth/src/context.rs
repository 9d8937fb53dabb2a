//! Per-request invocation context and extraction helpers.

use std::collections::HashMap;

use axum::extract::Query;
use http::request::Parts;
use serde_json::{Map, Value};
use switchyard_core::InvocationContext;

use crate::Identity;

/// Build the invocation context for a request.
///
/// Carries the query-string map (always present, possibly empty), the
/// `User-Agent`, the authenticated subject, and the bearer token when
/// `forward_token` is set.
pub(crate) fn build_context(
    parts_uri: &http::Uri,
    headers: &http::HeaderMap,
    identity: Option<&Identity>,
    token: Option<&str>,
    forward_token: bool,
) -> InvocationContext {
    let query: Map<String, Value> = Query::<HashMap<String, String>>::try_from_uri(parts_uri)
        .map(|Query(q)| q.into_iter().map(|(k, v)| (k, Value::String(v))).collect())
        .unwrap_or_default();

    let mut context = InvocationContext::new().with("query", Value::Object(query));

    if let Some(agent) = headers
        .get(http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
    {
        context.insert("agent", agent);
    }
    if let Some(subject) = identity.and_then(|i| i.subject.as_deref()) {
        context.insert("subject", subject);
    }
    if forward_token && let Some(token) = token {
        context.insert("token", token);
    }
    context
}

/// Extract the [`InvocationContext`] the auth layer attached to a request.
pub fn context_from_parts(parts: &Parts) -> Option<&InvocationContext> {
    parts.extensions.get::<InvocationContext>()
}

/// Extract the [`Identity`] established for a request, if any.
pub fn identity_from_parts(parts: &Parts) -> Option<&Identity> {
    parts.extensions.get::<Identity>()
}
