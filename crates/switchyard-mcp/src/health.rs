//! Health report for the HTTP transport.

use serde::{Deserialize, Serialize};

use crate::server::SwitchyardServer;

/// Health check response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Server status ("healthy").
    pub status: String,
    /// Server name.
    pub server_name: String,
    /// Server version.
    pub version: String,
    /// Number of registered tools.
    pub tool_count: usize,
    /// Number of registered prompts.
    pub prompt_count: usize,
    /// Number of registered resources.
    pub resource_count: usize,
}

impl HealthResponse {
    /// Report on a server snapshot.
    pub fn for_server(server: &SwitchyardServer) -> Self {
        Self {
            status: "healthy".to_string(),
            server_name: server.config().name.clone(),
            version: server.config().version.clone(),
            tool_count: server.tool_count(),
            prompt_count: server.prompt_count(),
            resource_count: server.resource_count(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::server::ServerConfig;
    use switchyard_core::InvocationContext;

    #[test]
    fn test_health_for_empty_server() {
        let server = SwitchyardServer::new(
            ServerConfig {
                name: "test-server".to_string(),
                version: "0.1.0".to_string(),
                instructions: None,
            },
            InvocationContext::new(),
        );
        let health = HealthResponse::for_server(&server);
        assert_eq!(health.status, "healthy");
        assert_eq!(health.server_name, "test-server");
        assert_eq!(health.tool_count, 0);
    }

    #[test]
    fn test_health_response_deserialization() {
        let json = r#"{"status":"healthy","server_name":"test","version":"1.0","tool_count":3,"prompt_count":1,"resource_count":2}"#;
        let response: HealthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.tool_count, 3);
        assert_eq!(response.resource_count, 2);
    }
}
