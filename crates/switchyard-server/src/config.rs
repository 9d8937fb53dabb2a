//! Layered server configuration: TOML file, then CLI flags / environment.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use switchyard_auth::AuthConfig;
use url::Url;

const LOOPBACK_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "::1"];

/// Full server configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub server: ServerSection,
    pub store: StoreSection,
    pub prefixes: PrefixSection,
    pub compute: ComputeSection,
    pub auth: AuthConfig,
    pub catalog: CatalogSection,
}

/// `[server]`: MCP metadata, HTTP bind address and accepted `Host` values.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub name: String,
    pub version: String,
    pub instructions: Option<String>,
    pub bind: String,
    /// `Host` values accepted on `/mcp`; `"*"` accepts any host.
    pub allowed_hosts: Option<Vec<String>>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            name: "switchyard".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            instructions: None,
            bind: "0.0.0.0:3000".to_string(),
            allowed_hosts: None,
        }
    }
}

/// `[store]`: where capability entries come from.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    /// Root path listed recursively. Unset means no entries.
    pub namespace: Option<String>,
    /// Parameter store endpoint.
    pub endpoint: Option<String>,
    /// Local TOML/JSON entry file; takes precedence over `endpoint`.
    pub file: Option<PathBuf>,
}

/// `[prefixes]`: store-key prefix per capability class.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrefixSection {
    pub tools: Option<String>,
    pub resources: Option<String>,
    pub prompts: Option<String>,
}

/// `[compute]`: the remote function platform.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComputeSection {
    pub endpoint: Option<String>,
    pub unit_prefix: String,
}

/// `[catalog]`: background refresh.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogSection {
    /// Seconds between rebuilds; 0 disables refresh.
    pub refresh_secs: u64,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self { refresh_secs: 60 }
    }
}

impl Settings {
    /// Load from `path`, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Effective `Host` allow-list for `/mcp`. Empty accepts any host.
    ///
    /// The host of `auth.resource_url` is always accepted. Without an
    /// explicit list a loopback bind accepts loopback names only, and a
    /// public bind accepts the resource host plus loopback, or any host when
    /// no resource URL is configured.
    pub fn allowed_hosts(&self) -> Vec<String> {
        let resource_host = Url::parse(&self.auth.resource_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string));
        let loopback = || LOOPBACK_HOSTS.iter().map(|h| h.to_string());

        match &self.server.allowed_hosts {
            Some(hosts) if hosts.iter().any(|h| h == "*") => Vec::new(),
            Some(hosts) => hosts.iter().cloned().chain(resource_host).collect(),
            None if is_loopback_bind(&self.server.bind) => {
                loopback().chain(resource_host).collect()
            }
            None => match resource_host {
                Some(host) => loopback().chain([host]).collect(),
                None => Vec::new(),
            },
        }
    }
}

fn is_loopback_bind(bind: &str) -> bool {
    let host = bind.rsplit_once(':').map_or(bind, |(host, _port)| host);
    let host = host.trim_start_matches('[').trim_end_matches(']');
    host.eq_ignore_ascii_case("localhost")
        || host.parse::<IpAddr>().is_ok_and(|ip| ip.is_loopback())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use switchyard_auth::AuthMode;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.server.name, "switchyard");
        assert_eq!(settings.server.bind, "0.0.0.0:3000");
        assert_eq!(settings.catalog.refresh_secs, 60);
        assert_eq!(settings.auth.mode, AuthMode::Disabled);
        assert!(settings.store.namespace.is_none());
    }

    #[test]
    fn test_from_toml() {
        let settings = Settings::from_toml(
            r#"
            [server]
            name = "catalog"
            bind = "127.0.0.1:8080"

            [store]
            namespace = "/switchyard"
            endpoint = "http://localhost:4566"

            [prefixes]
            tools = "/switchyard/tools/"

            [compute]
            endpoint = "http://localhost:9001"
            unit_prefix = "switchyard-"

            [auth]
            mode = "token"
            tokens = ["s3cret"]
            forward_token = true

            [catalog]
            refresh_secs = 0
            "#,
        )
        .unwrap();

        assert_eq!(settings.server.name, "catalog");
        assert_eq!(settings.server.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(settings.store.namespace.as_deref(), Some("/switchyard"));
        assert_eq!(settings.prefixes.tools.as_deref(), Some("/switchyard/tools/"));
        assert!(settings.prefixes.prompts.is_none());
        assert_eq!(settings.compute.unit_prefix, "switchyard-");
        assert_eq!(settings.auth.mode, AuthMode::Token);
        assert_eq!(settings.auth.tokens, vec!["s3cret"]);
        assert!(settings.auth.forward_token);
        assert_eq!(settings.catalog.refresh_secs, 0);
    }

    #[test]
    fn test_allowed_hosts_public_bind_without_resource_accepts_any() {
        assert!(Settings::default().allowed_hosts().is_empty());
    }

    #[test]
    fn test_allowed_hosts_loopback_bind() {
        let mut settings = Settings::default();
        settings.server.bind = "127.0.0.1:3000".to_string();
        assert_eq!(settings.allowed_hosts(), vec!["localhost", "127.0.0.1", "::1"]);

        settings.server.bind = "[::1]:3000".to_string();
        assert_eq!(settings.allowed_hosts().len(), 3);
    }

    #[test]
    fn test_allowed_hosts_include_resource_host() {
        let mut settings = Settings::default();
        settings.auth.resource_url = "https://mcp.example.com/mcp".to_string();
        assert_eq!(
            settings.allowed_hosts(),
            vec!["localhost", "127.0.0.1", "::1", "mcp.example.com"]
        );
    }

    #[test]
    fn test_allowed_hosts_explicit_list() {
        let mut settings = Settings::from_toml(
            "[server]\nallowed_hosts = [\"gateway.internal:8080\"]\n",
        )
        .unwrap();
        assert_eq!(settings.allowed_hosts(), vec!["gateway.internal:8080"]);

        settings.auth.resource_url = "https://mcp.example.com".to_string();
        assert_eq!(
            settings.allowed_hosts(),
            vec!["gateway.internal:8080", "mcp.example.com"]
        );

        settings.server.allowed_hosts = Some(vec!["*".to_string()]);
        assert!(settings.allowed_hosts().is_empty());
    }

    #[test]
    fn test_unknown_keys_rejected() {
        assert!(Settings::from_toml("[server]\nport = 3000\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[store]\nnamespace = \"/app\"").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.store.namespace.as_deref(), Some("/app"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Settings::load(Some(Path::new("/nonexistent/switchyard.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
