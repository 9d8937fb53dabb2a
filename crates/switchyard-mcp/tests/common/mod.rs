//! Common test utilities for the MCP integration tests.

use serde_json::{Value, json};
use std::sync::Arc;
use switchyard_core::ConfigEntry;
use switchyard_core::testing::{MemoryConfigStore, StaticInvoker};
use switchyard_mcp::{Catalog, Prefixes, ServerBuilder, ServerConfig};

pub const NAMESPACE: &str = "/switchyard";

/// A three-page snapshot: one good and one broken entry per class.
pub fn snapshot() -> Vec<Vec<ConfigEntry>> {
    vec![
        vec![
            ConfigEntry::new(
                "/switchyard/tools/echo",
                json!({
                    "name": "echo",
                    "description": "Echo a message",
                    "inputSchema": {"json": {
                        "type": "object",
                        "properties": {"msg": {"type": "string"}},
                        "required": ["msg"]
                    }}
                })
                .to_string(),
            ),
            ConfigEntry::new("/switchyard/tools/broken", "{not json"),
        ],
        vec![
            ConfigEntry::new(
                "/switchyard/resources/guide",
                json!({
                    "name": "guide",
                    "description": "Operator guide",
                    "uri": "doc://guide",
                    "content": "Read me"
                })
                .to_string(),
            ),
            ConfigEntry::new(
                "/switchyard/resources/partial",
                json!({"name": "partial"}).to_string(),
            ),
        ],
        vec![
            ConfigEntry::new(
                "/switchyard/prompts/greet",
                json!({
                    "name": "greet",
                    "description": "Greet someone",
                    "inputSchema": {
                        "type": "object",
                        "properties": {"who": {"type": "string"}},
                        "required": ["who"]
                    },
                    "content": "Hello {{input.who}} from {{context.agent}}"
                })
                .to_string(),
            ),
            ConfigEntry::new("/switchyard/prompts/empty", json!({"name": "empty"}).to_string()),
        ],
    ]
}

pub fn prefixes() -> Prefixes {
    Prefixes {
        tools: Some("/switchyard/tools/".to_string()),
        resources: Some("/switchyard/resources/".to_string()),
        prompts: Some("/switchyard/prompts/".to_string()),
    }
}

/// Test harness: a builder over the snapshot plus the compute fake it calls.
pub struct TestHarness {
    pub compute: Arc<StaticInvoker>,
    pub builder: ServerBuilder,
}

impl TestHarness {
    /// Harness whose compute unit always answers with `response`.
    pub fn with_response(response: Value) -> Self {
        let compute = Arc::new(StaticInvoker::json(response));
        let builder = ServerBuilder::new(Arc::new(MemoryConfigStore::new(snapshot())), compute.clone())
            .with_namespace(NAMESPACE)
            .with_prefixes(prefixes())
            .with_unit_prefix("switchyard-")
            .with_config(ServerConfig {
                name: "switchyard-test".to_string(),
                version: "0.0.1".to_string(),
                instructions: None,
            });
        Self { compute, builder }
    }

    /// Load a catalog from the harness builder.
    pub async fn catalog(self) -> Catalog {
        Catalog::load(self.builder).await.unwrap()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::with_response(json!({"content": [{"text": "ok"}]}))
    }
}
