//! Wiring from [`Settings`] to a loaded [`Catalog`].

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde_json::Value;
use switchyard_client::{FileConfigStore, HttpFunctionInvoker, HttpParameterStore};
use switchyard_core::{ComputeInvoker, ConfigStore};
use switchyard_mcp::{Catalog, Prefixes, ServerBuilder, ServerConfig};

use crate::config::Settings;

/// Compute port used when no function endpoint is configured.
///
/// Capabilities still register; tool calls fail with an invocation error.
struct DisabledCompute;

#[async_trait]
impl ComputeInvoker for DisabledCompute {
    async fn invoke(
        &self,
        unit_id: &str,
        _payload: &Value,
        _side_channel: &Value,
    ) -> switchyard_core::Result<Vec<u8>> {
        Err(switchyard_core::Error::invocation(format!(
            "no compute endpoint configured (unit '{unit_id}')"
        )))
    }
}

fn store(settings: &Settings) -> Result<Arc<dyn ConfigStore>> {
    if let Some(file) = &settings.store.file {
        let store = FileConfigStore::from_path(file)
            .with_context(|| format!("Failed to load entry file {}", file.display()))?;
        tracing::info!(path = %file.display(), entries = store.len(), "Using file store");
        return Ok(Arc::new(store));
    }
    if let Some(endpoint) = &settings.store.endpoint {
        tracing::info!(%endpoint, "Using parameter store");
        return Ok(Arc::new(HttpParameterStore::new(endpoint.clone())));
    }
    if settings.store.namespace.is_some() {
        bail!("store.namespace is set but neither store.file nor store.endpoint is configured");
    }
    // No namespace: the builder registers nothing and never reads the store.
    Ok(Arc::new(FileConfigStore::default()))
}

fn compute(settings: &Settings) -> Arc<dyn ComputeInvoker> {
    match &settings.compute.endpoint {
        Some(endpoint) => Arc::new(HttpFunctionInvoker::new(endpoint.clone())),
        None => {
            tracing::warn!("No compute endpoint configured; tool calls will fail");
            Arc::new(DisabledCompute)
        }
    }
}

/// Build the server builder described by `settings`.
pub fn builder(settings: &Settings) -> Result<ServerBuilder> {
    let mut builder = ServerBuilder::new(store(settings)?, compute(settings))
        .with_prefixes(Prefixes {
            tools: settings.prefixes.tools.clone(),
            resources: settings.prefixes.resources.clone(),
            prompts: settings.prefixes.prompts.clone(),
        })
        .with_unit_prefix(settings.compute.unit_prefix.clone())
        .with_config(ServerConfig {
            name: settings.server.name.clone(),
            version: settings.server.version.clone(),
            instructions: settings.server.instructions.clone(),
        });
    if let Some(namespace) = &settings.store.namespace {
        builder = builder.with_namespace(namespace.clone());
    }
    Ok(builder)
}

/// Build and load the initial catalog snapshot.
pub async fn load_catalog(settings: &Settings) -> Result<Catalog> {
    let catalog = Catalog::load(builder(settings)?)
        .await
        .context("Failed to build the capability catalog")?;
    let server = catalog.current();
    tracing::info!(
        tools = server.tool_count(),
        prompts = server.prompt_count(),
        resources = server.resource_count(),
        "Catalog loaded"
    );
    Ok(catalog)
}
