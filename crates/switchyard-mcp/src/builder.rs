//! Server construction: fetch entries, classify them, register handlers.

use std::sync::Arc;

use switchyard_core::{
    ComputeInvoker, ConfigStore, HandlebarsRenderer, InvocationContext, TemplateRenderer,
    ToolInvoker, classify_prompts, classify_resources, classify_tools, fetch_entries,
    register_capabilities,
};

use crate::server::{ServerConfig, SwitchyardServer};

/// Store-key prefixes that select each capability class.
///
/// An unset prefix yields no capabilities of that class.
#[derive(Clone, Debug, Default)]
pub struct Prefixes {
    /// Prefix of tool entries.
    pub tools: Option<String>,
    /// Prefix of resource entries.
    pub resources: Option<String>,
    /// Prefix of prompt entries.
    pub prompts: Option<String>,
}

/// Builds a fully registered [`SwitchyardServer`] from the configuration store.
///
/// The builder is reusable; every [`ServerBuilder::build`] reads the store
/// afresh.
pub struct ServerBuilder {
    store: Arc<dyn ConfigStore>,
    compute: Arc<dyn ComputeInvoker>,
    renderer: Arc<dyn TemplateRenderer>,
    namespace: Option<String>,
    prefixes: Prefixes,
    unit_prefix: String,
    config: ServerConfig,
    default_context: InvocationContext,
}

impl ServerBuilder {
    /// Create a builder over a store and a compute platform.
    pub fn new(store: Arc<dyn ConfigStore>, compute: Arc<dyn ComputeInvoker>) -> Self {
        Self {
            store,
            compute,
            renderer: Arc::new(HandlebarsRenderer::new()),
            namespace: None,
            prefixes: Prefixes::default(),
            unit_prefix: String::new(),
            config: ServerConfig::default(),
            default_context: InvocationContext::new(),
        }
    }

    /// Root path to list entries under. Without one, no entries are read.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Per-class entry prefixes.
    pub fn with_prefixes(mut self, prefixes: Prefixes) -> Self {
        self.prefixes = prefixes;
        self
    }

    /// Prefix prepended to tool names to form compute unit ids.
    pub fn with_unit_prefix(mut self, unit_prefix: impl Into<String>) -> Self {
        self.unit_prefix = unit_prefix.into();
        self
    }

    /// Replace the prompt template renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn TemplateRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Server metadata.
    pub fn with_config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Context for requests that arrive without one.
    pub fn with_default_context(mut self, context: InvocationContext) -> Self {
        self.default_context = context;
        self
    }

    /// Server metadata this builder stamps on every server.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Read the store and build a server with every valid capability registered.
    ///
    /// Store, schema and registration failures abort the build; malformed
    /// entries are skipped.
    pub async fn build(&self) -> switchyard_core::Result<SwitchyardServer> {
        let entries = match &self.namespace {
            Some(namespace) => fetch_entries(self.store.as_ref(), namespace).await?,
            None => {
                log::warn!("No configuration namespace set; serving no capabilities");
                Vec::new()
            }
        };
        log::debug!("Fetched {} configuration entries", entries.len());

        let resources = classify_resources(&entries, self.prefixes.resources.as_deref());
        let prompts = classify_prompts(&entries, self.prefixes.prompts.as_deref());
        let tools = classify_tools(&entries, self.prefixes.tools.as_deref());

        let mut server = SwitchyardServer::new(self.config.clone(), self.default_context.clone());
        register_capabilities(
            &mut server,
            resources,
            prompts,
            tools,
            ToolInvoker::new(self.compute.clone(), self.unit_prefix.clone()),
            self.renderer.clone(),
        )?;
        Ok(server)
    }
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("namespace", &self.namespace)
            .field("prefixes", &self.prefixes)
            .field("unit_prefix", &self.unit_prefix)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use switchyard_core::ConfigEntry;
    use switchyard_core::testing::{MemoryConfigStore, StaticInvoker};

    fn entries() -> Vec<ConfigEntry> {
        vec![
            ConfigEntry::new(
                "/app/tools/echo",
                json!({"name": "echo", "description": "Echo"}).to_string(),
            ),
            ConfigEntry::new("/app/tools/broken", "{not json"),
            ConfigEntry::new(
                "/app/resources/guide",
                json!({"name": "guide", "uri": "docs://guide", "content": "# Guide"}).to_string(),
            ),
            ConfigEntry::new(
                "/app/prompts/greet",
                json!({"name": "greet", "content": "Hello {{input.who}}"}).to_string(),
            ),
        ]
    }

    fn prefixes() -> Prefixes {
        Prefixes {
            tools: Some("/app/tools/".to_string()),
            resources: Some("/app/resources/".to_string()),
            prompts: Some("/app/prompts/".to_string()),
        }
    }

    fn builder(store: MemoryConfigStore) -> ServerBuilder {
        ServerBuilder::new(
            Arc::new(store),
            Arc::new(StaticInvoker::json(json!({"content": []}))),
        )
    }

    #[tokio::test]
    async fn test_build_registers_valid_entries() {
        let server = builder(MemoryConfigStore::single_page(entries()))
            .with_namespace("/app")
            .with_prefixes(prefixes())
            .build()
            .await
            .unwrap();

        assert_eq!(server.tool_count(), 1);
        assert_eq!(server.resource_count(), 1);
        assert_eq!(server.prompt_count(), 1);
    }

    #[tokio::test]
    async fn test_build_without_namespace_reads_nothing() {
        let store = Arc::new(MemoryConfigStore::single_page(entries()));
        let server = ServerBuilder::new(
            store.clone(),
            Arc::new(StaticInvoker::json(json!({"content": []}))),
        )
        .with_prefixes(prefixes())
        .build()
        .await
        .unwrap();

        assert_eq!(server.tool_count(), 0);
        assert_eq!(store.request_count(), 0);
    }

    #[tokio::test]
    async fn test_build_without_prefix_skips_class() {
        let server = builder(MemoryConfigStore::single_page(entries()))
            .with_namespace("/app")
            .with_prefixes(Prefixes {
                tools: Some("/app/tools/".to_string()),
                ..Default::default()
            })
            .build()
            .await
            .unwrap();

        assert_eq!(server.tool_count(), 1);
        assert_eq!(server.resource_count(), 0);
        assert_eq!(server.prompt_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_aborts_build() {
        let result = builder(MemoryConfigStore::failing("denied"))
            .with_namespace("/app")
            .with_prefixes(prefixes())
            .build()
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_builder_applies_server_config() {
        let server = builder(MemoryConfigStore::default())
            .with_namespace("/app")
            .with_config(ServerConfig {
                name: "catalog".to_string(),
                version: "9.9.9".to_string(),
                instructions: Some("Use the tools".to_string()),
            })
            .build()
            .await
            .unwrap();
        assert_eq!(server.config().name, "catalog");
        assert_eq!(server.config().instructions.as_deref(), Some("Use the tools"));
    }
}
