//! The MCP server: a [`CapabilityRegistry`] that speaks MCP via `rmcp`.
//!
//! Registration happens once, through `&mut self`; afterwards the server is
//! cloned freely (handlers live behind an `Arc`) and shared read-only by every
//! transport session.

use std::sync::Arc;

use rmcp::model::{
    AnnotateAble, CallToolRequestParams, CallToolResult, Content, ErrorData,
    GetPromptRequestParams, GetPromptResult, Implementation, JsonObject, ListPromptsResult,
    ListResourcesResult, ListToolsResult, PaginatedRequestParams, Prompt, PromptArgument,
    PromptMessage, PromptMessageRole, RawResource, ReadResourceRequestParams, ReadResourceResult,
    Resource, ResourceContents, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler};
use serde_json::json;
use switchyard_core::{
    CapabilityKind, CapabilityRegistry, ContentItem, Error as CoreError, InvocationContext,
    MessageRole, ParameterShape, PromptHandler, ResourceHandler, ToolHandler,
};

use crate::error::McpErrorExt;

/// MIME type reported for images whose format was not recognized.
const FALLBACK_IMAGE_MIME: &str = "application/octet-stream";

/// Server metadata reported during MCP initialization.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
    /// Usage instructions for clients.
    pub instructions: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "switchyard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            instructions: None,
        }
    }
}

#[derive(Clone)]
struct ToolEntry {
    tool: Tool,
    shape: ParameterShape,
    handler: ToolHandler,
}

#[derive(Clone)]
struct PromptEntry {
    prompt: Prompt,
    shape: ParameterShape,
    handler: PromptHandler,
}

#[derive(Clone)]
struct ResourceEntry {
    uri: String,
    resource: Resource,
    handler: ResourceHandler,
}

#[derive(Clone, Default)]
struct Capabilities {
    tools: Vec<ToolEntry>,
    prompts: Vec<PromptEntry>,
    resources: Vec<ResourceEntry>,
}

/// MCP server exposing registered tools, prompts and resources.
#[derive(Clone)]
pub struct SwitchyardServer {
    config: ServerConfig,
    default_context: InvocationContext,
    capabilities: Arc<Capabilities>,
}

impl SwitchyardServer {
    /// Create an empty server.
    ///
    /// `default_context` is used for requests that do not carry one of their
    /// own (stdio, or HTTP without the auth layer).
    pub fn new(config: ServerConfig, default_context: InvocationContext) -> Self {
        Self {
            config,
            default_context,
            capabilities: Arc::new(Capabilities::default()),
        }
    }

    /// Server metadata.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Number of registered tools.
    pub fn tool_count(&self) -> usize {
        self.capabilities.tools.len()
    }

    /// Number of registered prompts.
    pub fn prompt_count(&self) -> usize {
        self.capabilities.prompts.len()
    }

    /// Number of registered resources.
    pub fn resource_count(&self) -> usize {
        self.capabilities.resources.len()
    }

    /// MCP descriptors of all tools, in registration order.
    pub fn tools(&self) -> Vec<Tool> {
        self.capabilities.tools.iter().map(|t| t.tool.clone()).collect()
    }

    /// MCP descriptors of all prompts, in registration order.
    pub fn prompts(&self) -> Vec<Prompt> {
        self.capabilities
            .prompts
            .iter()
            .map(|p| p.prompt.clone())
            .collect()
    }

    /// MCP descriptors of all resources, in registration order.
    pub fn resources(&self) -> Vec<Resource> {
        self.capabilities
            .resources
            .iter()
            .map(|r| r.resource.clone())
            .collect()
    }

    /// Call a tool with an explicit context.
    ///
    /// A failure reported by the tool itself is returned as an error result
    /// carrying the tool's message; every other failure is a protocol error.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
        context: InvocationContext,
    ) -> Result<CallToolResult, ErrorData> {
        let entry = self
            .capabilities
            .tools
            .iter()
            .find(|t| t.tool.name == name)
            .ok_or_else(|| CoreError::tool_not_found(name).to_mcp_error())?;

        let arguments = arguments.unwrap_or_default();
        entry
            .shape
            .validate(name, &arguments)
            .map_err(|e| e.to_mcp_error())?;

        log::debug!("Calling tool '{name}'");
        match (entry.handler)(arguments, context).await {
            Ok(items) => Ok(CallToolResult::success(
                items.into_iter().map(to_content).collect(),
            )),
            Err(CoreError::ToolExecution { message }) => {
                log::debug!("Tool '{name}' reported failure: {message}");
                Ok(CallToolResult::error(vec![Content::text(message)]))
            }
            Err(e) => {
                log::warn!("Tool '{name}' failed: {e}");
                Err(e.to_mcp_error())
            }
        }
    }

    /// Render a prompt with an explicit context.
    pub async fn prompt(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
        context: InvocationContext,
    ) -> Result<GetPromptResult, ErrorData> {
        let entry = self
            .capabilities
            .prompts
            .iter()
            .find(|p| p.prompt.name == name)
            .ok_or_else(|| ErrorData::invalid_params(format!("Unknown prompt: {name}"), None))?;

        let arguments = arguments.unwrap_or_default();
        entry
            .shape
            .validate(name, &arguments)
            .map_err(|e| e.to_mcp_error())?;

        let messages = (entry.handler)(arguments, context)
            .await
            .map_err(|e| e.to_mcp_error())?
            .into_iter()
            .map(|m| {
                let role = match m.role {
                    MessageRole::User => PromptMessageRole::User,
                    MessageRole::Assistant => PromptMessageRole::Assistant,
                };
                PromptMessage::new_text(role, m.text)
            })
            .collect();

        let mut result = GetPromptResult::new(messages);
        result.description = entry.prompt.description.clone();
        Ok(result)
    }

    /// Read a resource with an explicit context.
    pub async fn read(
        &self,
        uri: &str,
        context: InvocationContext,
    ) -> Result<ReadResourceResult, ErrorData> {
        let entry = self
            .capabilities
            .resources
            .iter()
            .find(|r| r.uri == uri)
            .ok_or_else(|| {
                ErrorData::resource_not_found(format!("Unknown resource: {uri}"), None)
            })?;

        let items = (entry.handler)(uri.to_string(), context)
            .await
            .map_err(|e| e.to_mcp_error())?;
        let contents = items
            .into_iter()
            .map(|item| to_resource_contents(uri, item))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ReadResourceResult::new(contents))
    }

    /// The context attached to the HTTP request, or the server default.
    fn resolve_context(&self, request: &RequestContext<RoleServer>) -> InvocationContext {
        request
            .extensions
            .get::<http::request::Parts>()
            .and_then(switchyard_auth::context_from_parts)
            .cloned()
            .unwrap_or_else(|| self.default_context.clone())
    }

    fn capabilities_mut(&mut self) -> &mut Capabilities {
        Arc::make_mut(&mut self.capabilities)
    }
}

impl std::fmt::Debug for SwitchyardServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwitchyardServer")
            .field("name", &self.config.name)
            .field("tools", &self.tool_count())
            .field("prompts", &self.prompt_count())
            .field("resources", &self.resource_count())
            .finish()
    }
}

fn to_content(item: ContentItem) -> Content {
    match item {
        ContentItem::Text { text } => Content::text(text),
        ContentItem::Image { data, mime_type } => Content::image(
            data,
            mime_type.unwrap_or_else(|| FALLBACK_IMAGE_MIME.to_string()),
        ),
    }
}

fn to_resource_contents(uri: &str, item: ContentItem) -> Result<ResourceContents, ErrorData> {
    match item {
        ContentItem::Text { text } => Ok(ResourceContents::text(text, uri)),
        ContentItem::Image { data, mime_type } => serde_json::from_value(json!({
            "uri": uri,
            "mimeType": mime_type.unwrap_or_else(|| FALLBACK_IMAGE_MIME.to_string()),
            "blob": data,
        }))
        .map_err(|e| ErrorData::internal_error(e.to_string(), None)),
    }
}

fn conflict(kind: CapabilityKind, name: &str) -> CoreError {
    CoreError::RegistrationConflict {
        kind,
        name: name.to_string(),
    }
}

impl CapabilityRegistry for SwitchyardServer {
    fn register_resource(
        &mut self,
        name: &str,
        uri: &str,
        description: Option<&str>,
        handler: ResourceHandler,
    ) -> switchyard_core::Result<()> {
        let capabilities = self.capabilities_mut();
        if capabilities
            .resources
            .iter()
            .any(|r| r.resource.name == name || r.uri == uri)
        {
            return Err(conflict(CapabilityKind::Resource, name));
        }
        let mut resource = RawResource::new(uri, name);
        resource.description = description.map(str::to_string);
        capabilities.resources.push(ResourceEntry {
            uri: uri.to_string(),
            resource: resource.no_annotation(),
            handler,
        });
        Ok(())
    }

    fn register_prompt(
        &mut self,
        name: &str,
        description: Option<&str>,
        shape: ParameterShape,
        handler: PromptHandler,
    ) -> switchyard_core::Result<()> {
        let capabilities = self.capabilities_mut();
        if capabilities.prompts.iter().any(|p| p.prompt.name == name) {
            return Err(conflict(CapabilityKind::Prompt, name));
        }

        let arguments = (!shape.is_empty()).then(|| {
            shape
                .fields()
                .iter()
                .map(|field| {
                    let mut argument = PromptArgument::new(field.name().to_string());
                    argument.description = field.description().map(str::to_string);
                    argument.required = Some(field.is_required());
                    argument
                })
                .collect()
        });

        capabilities.prompts.push(PromptEntry {
            prompt: Prompt::new(name, description, arguments),
            shape,
            handler,
        });
        Ok(())
    }

    fn register_tool(
        &mut self,
        name: &str,
        description: Option<&str>,
        shape: ParameterShape,
        handler: ToolHandler,
    ) -> switchyard_core::Result<()> {
        let capabilities = self.capabilities_mut();
        if capabilities.tools.iter().any(|t| t.tool.name == name) {
            return Err(conflict(CapabilityKind::Tool, name));
        }

        capabilities.tools.push(ToolEntry {
            tool: {
                let mut tool = Tool::default();
                tool.name = name.to_string().into();
                tool.description = description.map(|d| d.to_string().into());
                tool.input_schema = Arc::new(shape.to_json_schema());
                tool
            },
            shape,
            handler,
        });
        Ok(())
    }
}

impl ServerHandler for SwitchyardServer {
    fn get_info(&self) -> ServerInfo {
        let mut info = ServerInfo::new(
            ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
        )
        .with_protocol_version(Default::default())
        .with_server_info(Implementation::new(
            self.config.name.clone(),
            self.config.version.clone(),
        ));
        info.instructions = self.config.instructions.clone();
        info
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: self.tools(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let invocation_context = self.resolve_context(&context);
        self.call(&request.name, request.arguments, invocation_context)
            .await
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult {
            resources: self.resources(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        let invocation_context = self.resolve_context(&context);
        self.read(&request.uri, invocation_context).await
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        Ok(ListPromptsResult {
            prompts: self.prompts(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParams,
        context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        let invocation_context = self.resolve_context(&context);
        self.prompt(&request.name, request.arguments, invocation_context)
            .await
    }
}
