//! MCP server infrastructure for Switchyard.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      switchyard-mcp                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  SwitchyardServer: CapabilityRegistry + rmcp ServerHandler  │
//! │  ServerBuilder: fetch → classify → register                 │
//! │  Catalog: current server snapshot, periodic refresh         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  router / serve_http: POST /mcp, /health, discovery         │
//! │  serve_stdio: single session over stdin/stdout              │
//! ├─────────────────────────────────────────────────────────────┤
//! │  McpErrorExt: switchyard_core::Error → rmcp::ErrorData      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use switchyard_mcp::{Catalog, ServerBuilder, router, serve_http};
//!
//! let builder = ServerBuilder::new(store, compute)
//!     .with_namespace("/switchyard")
//!     .with_prefixes(prefixes);
//! let catalog = Catalog::load(builder).await?;
//! catalog.spawn_refresh(Duration::from_secs(60));
//!
//! let app = router(catalog, &auth, vec!["mcp.example.com".into()]);
//! serve_http(app, "0.0.0.0:3000", shutdown).await?;
//! ```

pub mod builder;
pub mod catalog;
pub mod error;
pub mod health;
pub mod routes;
pub mod server;
pub mod stdio;

// Re-exports: construction
pub use builder::{Prefixes, ServerBuilder};
pub use catalog::Catalog;

// Re-exports: server
pub use server::{ServerConfig, SwitchyardServer};

// Re-exports: transports
pub use routes::{router, serve_http};
pub use stdio::serve_stdio;

// Re-exports: errors and health
pub use error::{Error, McpErrorExt, Result};
pub use health::HealthResponse;
