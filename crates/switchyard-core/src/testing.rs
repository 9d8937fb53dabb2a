//! In-memory port implementations.
//!
//! These fakes back the unit and integration tests across the workspace and
//! are handy for wiring a server without any external services.

use crate::error::{Error, Result};
use crate::model::{
    CapabilityKind, ConfigEntry, ConfigPage, ContentItem, InvocationContext, PromptMessage,
};
use crate::ports::{ComputeInvoker, ConfigStore};
use crate::registrar::{
    Arguments, CapabilityRegistry, PromptHandler, ResourceHandler, ToolHandler,
};
use crate::schema::ParameterShape;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;

// ============================================================================
// MemoryConfigStore
// ============================================================================

/// A config store serving pre-built pages.
///
/// Page `i` hands out the continuation token `page-{i+1}` unless it is the
/// last page. Every request's token is recorded.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    pages: Vec<Vec<ConfigEntry>>,
    failure: Option<String>,
    requests: Mutex<Vec<Option<String>>>,
}

impl MemoryConfigStore {
    /// A store serving `pages` in order.
    pub fn new(pages: Vec<Vec<ConfigEntry>>) -> Self {
        Self {
            pages,
            ..Self::default()
        }
    }

    /// A store with all entries on a single page.
    pub fn single_page(entries: Vec<ConfigEntry>) -> Self {
        Self::new(vec![entries])
    }

    /// A store whose every request fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Tokens passed to each request, in order.
    pub fn requests(&self) -> Vec<Option<String>> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Number of requests served.
    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn page_index(token: Option<&str>) -> Result<usize> {
        match token {
            None => Ok(0),
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| Error::store(format!("Invalid continuation token: {token}"))),
        }
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn list_entries(&self, _namespace: &str, next_token: Option<&str>) -> Result<ConfigPage> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(next_token.map(str::to_string));
        }

        if let Some(message) = &self.failure {
            return Err(Error::store(message.clone()));
        }

        let index = Self::page_index(next_token)?;
        if self.pages.is_empty() && index == 0 {
            return Ok(ConfigPage::default());
        }

        let entries = self
            .pages
            .get(index)
            .cloned()
            .ok_or_else(|| Error::store(format!("No page at index {index}")))?;
        let next_token = (index + 1 < self.pages.len()).then(|| format!("page-{}", index + 1));

        Ok(ConfigPage {
            entries,
            next_token,
        })
    }
}

// ============================================================================
// StaticInvoker
// ============================================================================

/// One recorded remote call.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    /// Compute unit that was invoked.
    pub unit_id: String,
    /// Payload sent.
    pub payload: Value,
    /// Side-channel context sent.
    pub side_channel: Value,
}

/// A compute invoker returning a canned response body.
#[derive(Debug)]
pub struct StaticInvoker {
    response: std::result::Result<Vec<u8>, String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl StaticInvoker {
    /// Respond with the given raw bytes.
    pub fn bytes(body: impl Into<Vec<u8>>) -> Self {
        Self {
            response: Ok(body.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Respond with `body` serialized as JSON.
    pub fn json(body: Value) -> Self {
        Self::bytes(body.to_string())
    }

    /// Fail every call with an invocation error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ComputeInvoker for StaticInvoker {
    async fn invoke(
        &self,
        unit_id: &str,
        payload: &Value,
        side_channel: &Value,
    ) -> Result<Vec<u8>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                unit_id: unit_id.to_string(),
                payload: payload.clone(),
                side_channel: side_channel.clone(),
            });
        }
        self.response.clone().map_err(Error::invocation)
    }
}

// ============================================================================
// MemoryRegistry
// ============================================================================

struct Shaped<H> {
    name: String,
    shape: ParameterShape,
    handler: H,
}

/// A protocol-free capability registry that dispatches directly to handlers.
#[derive(Default)]
pub struct MemoryRegistry {
    resources: Vec<(String, String, ResourceHandler)>,
    prompts: Vec<Shaped<PromptHandler>>,
    tools: Vec<Shaped<ToolHandler>>,
}

impl MemoryRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered tool names, in registration order.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name.clone()).collect()
    }

    /// Registered prompt names, in registration order.
    pub fn prompt_names(&self) -> Vec<String> {
        self.prompts.iter().map(|p| p.name.clone()).collect()
    }

    /// Registered resource URIs, in registration order.
    pub fn resource_uris(&self) -> Vec<String> {
        self.resources.iter().map(|(_, uri, _)| uri.clone()).collect()
    }

    /// The handler registered for the resource called `name`.
    pub fn resource_handler(&self, name: &str) -> Option<ResourceHandler> {
        self.resources
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, _, handler)| handler.clone())
    }

    /// Read the resource published under `uri`.
    pub async fn read_resource(
        &self,
        uri: &str,
        context: InvocationContext,
    ) -> Result<Vec<ContentItem>> {
        let (_, _, handler) = self
            .resources
            .iter()
            .find(|(_, u, _)| u == uri)
            .ok_or_else(|| Error::config(format!("Unknown resource: {uri}")))?;
        handler(uri.to_string(), context).await
    }

    /// Render the named prompt.
    pub async fn get_prompt(
        &self,
        name: &str,
        args: Value,
        context: InvocationContext,
    ) -> Result<Vec<PromptMessage>> {
        let prompt = self
            .prompts
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| Error::config(format!("Unknown prompt: {name}")))?;
        let args = into_arguments(args);
        prompt.shape.validate(name, &args)?;
        (prompt.handler)(args, context).await
    }

    /// Call the named tool.
    pub async fn call_tool(
        &self,
        name: &str,
        args: Value,
        context: InvocationContext,
    ) -> Result<Vec<ContentItem>> {
        let tool = self
            .tools
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| Error::tool_not_found(name))?;
        let args = into_arguments(args);
        tool.shape.validate(name, &args)?;
        (tool.handler)(args, context).await
    }
}

fn into_arguments(args: Value) -> Arguments {
    match args {
        Value::Object(map) => map,
        _ => Arguments::new(),
    }
}

fn conflict(kind: CapabilityKind, name: &str) -> Error {
    Error::RegistrationConflict {
        kind,
        name: name.to_string(),
    }
}

impl CapabilityRegistry for MemoryRegistry {
    fn register_resource(
        &mut self,
        name: &str,
        uri: &str,
        _description: Option<&str>,
        handler: ResourceHandler,
    ) -> Result<()> {
        if self.resources.iter().any(|(n, _, _)| n == name) {
            return Err(conflict(CapabilityKind::Resource, name));
        }
        self.resources
            .push((name.to_string(), uri.to_string(), handler));
        Ok(())
    }

    fn register_prompt(
        &mut self,
        name: &str,
        _description: Option<&str>,
        shape: ParameterShape,
        handler: PromptHandler,
    ) -> Result<()> {
        if self.prompts.iter().any(|p| p.name == name) {
            return Err(conflict(CapabilityKind::Prompt, name));
        }
        self.prompts.push(Shaped {
            name: name.to_string(),
            shape,
            handler,
        });
        Ok(())
    }

    fn register_tool(
        &mut self,
        name: &str,
        _description: Option<&str>,
        shape: ParameterShape,
        handler: ToolHandler,
    ) -> Result<()> {
        if self.tools.iter().any(|t| t.name == name) {
            return Err(conflict(CapabilityKind::Tool, name));
        }
        self.tools.push(Shaped {
            name: name.to_string(),
            shape,
            handler,
        });
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_rejects_unknown_token() {
        let store = MemoryConfigStore::new(vec![vec![]]);
        let err = store.list_entries("/mcp", Some("bogus")).await.unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[tokio::test]
    async fn test_static_invoker_records_calls() {
        let invoker = StaticInvoker::json(json!({"content": []}));
        let body = invoker
            .invoke("unit-echo", &json!({"input": 1}), &json!({"agent": "x"}))
            .await
            .unwrap();
        assert_eq!(body, br#"{"content":[]}"#.to_vec());

        let calls = invoker.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].unit_id, "unit-echo");
        assert_eq!(calls[0].side_channel, json!({"agent": "x"}));
    }

    #[tokio::test]
    async fn test_static_invoker_failure() {
        let invoker = StaticInvoker::failing("Task timed out");
        let err = invoker.invoke("u", &json!({}), &json!({})).await.unwrap_err();
        assert!(matches!(err, Error::Invocation { .. }));
    }
}
