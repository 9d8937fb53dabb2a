//! Error types for switchyard-mcp, and mapping of core errors onto MCP errors.

use rmcp::model::ErrorData;
use serde_json::json;
use switchyard_core::Error as CoreError;
use thiserror::Error;

/// Result type alias for switchyard-mcp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or serving the MCP server
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from switchyard-core
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// Listener or transport I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The MCP service loop failed
    #[error("MCP service error: {0}")]
    Service(String),
}

/// Converts core errors into MCP protocol errors.
pub trait McpErrorExt {
    /// Map to an `rmcp` error with a JSON-RPC code and a `kind` tag in `data`.
    fn to_mcp_error(&self) -> ErrorData;
}

impl McpErrorExt for CoreError {
    fn to_mcp_error(&self) -> ErrorData {
        let message = self.to_string();
        match self {
            CoreError::ToolNotFound { .. } => {
                ErrorData::invalid_params(message, Some(json!({"kind": "tool_not_found"})))
            }
            CoreError::InvalidArguments { .. } => {
                ErrorData::invalid_params(message, Some(json!({"kind": "invalid_arguments"})))
            }
            CoreError::Invocation { .. } => {
                ErrorData::internal_error(message, Some(json!({"kind": "invocation"})))
            }
            CoreError::ToolExecution { .. } => {
                ErrorData::internal_error(message, Some(json!({"kind": "tool_execution"})))
            }
            CoreError::Render { .. } => {
                ErrorData::internal_error(message, Some(json!({"kind": "render"})))
            }
            _ => ErrorData::internal_error(message, None),
        }
    }
}
