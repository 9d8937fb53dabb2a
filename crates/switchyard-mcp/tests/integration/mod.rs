mod capabilities;
mod http_routes;
mod mcp_endpoint;
