//! stdio transport.

use rmcp::ServiceExt;
use rmcp::transport::stdio;

use crate::error::{Error, Result};
use crate::server::SwitchyardServer;

/// Serve one MCP session over stdin/stdout until the client disconnects.
pub async fn serve_stdio(server: SwitchyardServer) -> Result<()> {
    log::info!("Serving MCP over stdio");
    let running = server
        .serve(stdio())
        .await
        .map_err(|e| Error::Service(e.to_string()))?;
    running
        .waiting()
        .await
        .map_err(|e| Error::Service(e.to_string()))?;
    Ok(())
}
