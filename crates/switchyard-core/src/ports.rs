//! Ports to the outside world.
//!
//! The bridge talks to three collaborators it does not own: the
//! configuration store, the remote compute platform, and a template engine.
//! Concrete HTTP adapters live in `switchyard-client`; in-memory fakes live
//! in [`crate::testing`].

use crate::error::Result;
use crate::model::{ConfigPage, InvocationContext};
use async_trait::async_trait;
use serde_json::Value;

/// Paginated listing of configuration entries.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// List one page of entries under `namespace` (recursively).
    ///
    /// `next_token` is `None` for the first page and the token returned by
    /// the previous page afterwards.
    async fn list_entries(&self, namespace: &str, next_token: Option<&str>) -> Result<ConfigPage>;
}

/// Synchronous invocation of a remote compute unit.
#[async_trait]
pub trait ComputeInvoker: Send + Sync {
    /// Invoke `unit_id` with `payload`, passing `side_channel` out of band.
    ///
    /// Returns the raw response body. Transport and platform failures
    /// (including timeouts) are reported as [`crate::Error::Invocation`].
    async fn invoke(&self, unit_id: &str, payload: &Value, side_channel: &Value)
    -> Result<Vec<u8>>;
}

/// Renders prompt templates.
pub trait TemplateRenderer: Send + Sync {
    /// Render `template` against the caller's `input` and the ambient `context`.
    fn render(&self, template: &str, input: &Value, context: &InvocationContext) -> Result<String>;
}
