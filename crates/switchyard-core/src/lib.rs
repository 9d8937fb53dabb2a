//! Switchyard Core: capability model, classification and tool invocation.
//!
//! Capability descriptions (tools, resources, prompts) live as JSON values
//! in a hierarchical key/value store. This crate turns them into handlers:
//!
//! ```text
//!  ConfigStore ──fetch_entries──▶ Vec<ConfigEntry>
//!                                     │
//!              ┌──────────────────────┼──────────────────────┐
//!              ▼                      ▼                      ▼
//!       classify_tools        classify_resources      classify_prompts
//!              │                      │                      │
//!              └──────────▶ register_capabilities ◀──────────┘
//!                                     │
//!                          CapabilityRegistry (server)
//!                                     │
//!                 tool call ──▶ ToolInvoker ──▶ ComputeInvoker
//! ```
//!
//! It has no protocol dependency; `switchyard-mcp` provides the MCP server
//! that implements [`CapabilityRegistry`].
//!
//! # Modules
//!
//! - [`error`]: Error taxonomy and Result alias
//! - [`model`]: Entries, specs, context and content
//! - [`ports`]: Store, compute and renderer traits
//! - [`fetch`]: Paginated entry fetch
//! - [`classify`]: Entry classifiers
//! - [`schema`]: Input schema to [`ParameterShape`]
//! - [`registrar`]: Handler construction and registration
//! - [`invoke`]: Remote invocation and content normalization
//! - [`render`]: Handlebars prompt rendering
//! - [`testing`]: In-memory ports for tests

pub mod classify;
pub mod error;
pub mod fetch;
pub mod invoke;
pub mod model;
pub mod ports;
pub mod registrar;
pub mod render;
pub mod schema;
pub mod testing;

pub use classify::{classify_prompts, classify_resources, classify_tools};
pub use error::{Error, Result};
pub use fetch::fetch_entries;
pub use invoke::{ToolInvoker, decode_response, map_content, mime_type_for};
pub use model::{
    CapabilityKind, ConfigEntry, ConfigPage, ContentItem, InvocationContext, MessageRole,
    PromptMessage, PromptSpec, ResourceSpec, ToolSpec,
};
pub use ports::{ComputeInvoker, ConfigStore, TemplateRenderer};
pub use registrar::{
    Arguments, CapabilityRegistry, HandlerFuture, PromptHandler, ResourceHandler, ToolHandler,
    register_capabilities,
};
pub use render::HandlebarsRenderer;
pub use schema::{FieldShape, ParameterShape, to_parameter_shape};
