//! Capability Registrar: bind a live handler to every classified spec.
//!
//! The protocol server is abstracted as a [`CapabilityRegistry`]; the MCP
//! server in `switchyard-mcp` implements it, and
//! [`crate::testing::MemoryRegistry`] implements it for tests.
//!
//! Handlers receive the call arguments plus the [`InvocationContext`] the
//! server resolved for the request, and return a boxed future.

use crate::error::Result;
use crate::invoke::ToolInvoker;
use crate::model::{ContentItem, InvocationContext, PromptMessage, PromptSpec, ResourceSpec, ToolSpec};
use crate::ports::TemplateRenderer;
use crate::schema::{ParameterShape, to_parameter_shape};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Call arguments as a JSON object.
pub type Arguments = Map<String, Value>;

/// Type alias for async handler results.
pub type HandlerFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

/// Serves a resource read for the requested URI.
pub type ResourceHandler =
    Arc<dyn Fn(String, InvocationContext) -> HandlerFuture<Vec<ContentItem>> + Send + Sync>;

/// Renders a prompt.
pub type PromptHandler =
    Arc<dyn Fn(Arguments, InvocationContext) -> HandlerFuture<Vec<PromptMessage>> + Send + Sync>;

/// Runs a tool.
pub type ToolHandler =
    Arc<dyn Fn(Arguments, InvocationContext) -> HandlerFuture<Vec<ContentItem>> + Send + Sync>;

/// The registration surface of a protocol server.
///
/// Implementations reject a second registration of the same name within a
/// capability class with [`crate::Error::RegistrationConflict`].
pub trait CapabilityRegistry {
    /// Register a static resource under `uri`.
    fn register_resource(
        &mut self,
        name: &str,
        uri: &str,
        description: Option<&str>,
        handler: ResourceHandler,
    ) -> Result<()>;

    /// Register a prompt.
    fn register_prompt(
        &mut self,
        name: &str,
        description: Option<&str>,
        shape: ParameterShape,
        handler: PromptHandler,
    ) -> Result<()>;

    /// Register a tool.
    fn register_tool(
        &mut self,
        name: &str,
        description: Option<&str>,
        shape: ParameterShape,
        handler: ToolHandler,
    ) -> Result<()>;
}

/// Register handlers for all specs, resources first, then prompts, then tools.
///
/// Any schema or registration failure aborts with that error; specs
/// registered before the failure stay registered on `registry`.
pub fn register_capabilities<R>(
    registry: &mut R,
    resources: Vec<ResourceSpec>,
    prompts: Vec<PromptSpec>,
    tools: Vec<ToolSpec>,
    invoker: ToolInvoker,
    renderer: Arc<dyn TemplateRenderer>,
) -> Result<()>
where
    R: CapabilityRegistry + ?Sized,
{
    let counts = (resources.len(), prompts.len(), tools.len());

    for spec in resources {
        registry.register_resource(
            &spec.name,
            &spec.uri,
            spec.description.as_deref(),
            resource_handler(spec.content),
        )?;
    }

    for spec in prompts {
        let shape = to_parameter_shape(&spec.name, spec.input_schema.as_ref())?;
        let handler = prompt_handler(spec.content, renderer.clone());
        registry.register_prompt(&spec.name, spec.description.as_deref(), shape, handler)?;
    }

    for spec in tools {
        let shape = to_parameter_shape(&spec.name, spec.input_schema.as_ref())?;
        let handler = tool_handler(spec.name.clone(), invoker.clone());
        registry.register_tool(&spec.name, spec.description.as_deref(), shape, handler)?;
    }

    log::info!(
        "Registered {} resource(s), {} prompt(s), {} tool(s)",
        counts.0,
        counts.1,
        counts.2
    );
    Ok(())
}

fn resource_handler(content: String) -> ResourceHandler {
    Arc::new(
        move |_uri: String, _context: InvocationContext| -> HandlerFuture<Vec<ContentItem>> {
            let content = content.clone();
            Box::pin(async move { Ok(vec![ContentItem::text(content)]) })
        },
    )
}

fn prompt_handler(template: String, renderer: Arc<dyn TemplateRenderer>) -> PromptHandler {
    Arc::new(
        move |args: Arguments, context: InvocationContext| -> HandlerFuture<Vec<PromptMessage>> {
            let result = renderer
                .render(&template, &Value::Object(args), &context)
                .map(|text| vec![PromptMessage::user(text)]);
            Box::pin(async move { result })
        },
    )
}

fn tool_handler(name: String, invoker: ToolInvoker) -> ToolHandler {
    Arc::new(
        move |args: Arguments, context: InvocationContext| -> HandlerFuture<Vec<ContentItem>> {
            let name = name.clone();
            let invoker = invoker.clone();
            Box::pin(async move { invoker.invoke(&name, &Value::Object(args), &context).await })
        },
    )
}
