//! Command-line arguments. Every flag can also be set through the environment.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use switchyard_auth::AuthMode;

use crate::config::Settings;

/// MCP transport to serve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Transport {
    /// Streamable HTTP on `server.bind`.
    Http,
    /// A single session over stdin/stdout.
    Stdio,
}

/// Switchyard - configuration-driven MCP server
#[derive(Parser, Debug)]
#[command(name = "switchyard", version, about, long_about = None)]
pub struct Args {
    /// Configuration file path (TOML)
    #[arg(short, long, env = "SWITCHYARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Transport to serve
    #[arg(long, value_enum, default_value_t = Transport::Http, env = "SWITCHYARD_TRANSPORT")]
    pub transport: Transport,

    /// MCP server name
    #[arg(long, env = "SWITCHYARD_SERVER_NAME")]
    pub server_name: Option<String>,

    /// MCP server version
    #[arg(long, env = "SWITCHYARD_SERVER_VERSION")]
    pub server_version: Option<String>,

    /// Instructions advertised to MCP clients
    #[arg(long, env = "SWITCHYARD_INSTRUCTIONS")]
    pub instructions: Option<String>,

    /// HTTP bind address
    #[arg(long, env = "SWITCHYARD_BIND")]
    pub bind: Option<String>,

    /// Host header values accepted on /mcp (comma separated, `*` for any)
    #[arg(long, env = "SWITCHYARD_ALLOWED_HOSTS", value_delimiter = ',')]
    pub allowed_hosts: Vec<String>,

    /// Root path of capability entries
    #[arg(long, env = "SWITCHYARD_NAMESPACE")]
    pub namespace: Option<String>,

    /// Parameter store endpoint
    #[arg(long, env = "SWITCHYARD_STORE_ENDPOINT")]
    pub store_endpoint: Option<String>,

    /// Local entry file (TOML or JSON)
    #[arg(long, env = "SWITCHYARD_STORE_FILE")]
    pub store_file: Option<PathBuf>,

    /// Key prefix of tool entries
    #[arg(long, env = "SWITCHYARD_TOOLS_PREFIX")]
    pub tools_prefix: Option<String>,

    /// Key prefix of resource entries
    #[arg(long, env = "SWITCHYARD_RESOURCES_PREFIX")]
    pub resources_prefix: Option<String>,

    /// Key prefix of prompt entries
    #[arg(long, env = "SWITCHYARD_PROMPTS_PREFIX")]
    pub prompts_prefix: Option<String>,

    /// Function invoke endpoint
    #[arg(long, env = "SWITCHYARD_COMPUTE_ENDPOINT")]
    pub compute_endpoint: Option<String>,

    /// Prefix prepended to tool names to form function names
    #[arg(long, env = "SWITCHYARD_UNIT_PREFIX")]
    pub unit_prefix: Option<String>,

    /// Auth mode: disabled, token or oauth
    #[arg(long, env = "SWITCHYARD_AUTH_MODE")]
    pub auth_mode: Option<AuthMode>,

    /// Accepted bearer tokens (comma separated)
    #[arg(long, env = "SWITCHYARD_AUTH_TOKENS", value_delimiter = ',')]
    pub auth_tokens: Vec<String>,

    /// Seconds between catalog refreshes (0 disables)
    #[arg(long, env = "SWITCHYARD_REFRESH_SECS")]
    pub refresh_secs: Option<u64>,
}

impl Args {
    /// Load the config file and overlay the flags that were given.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = Settings::load(self.config.as_deref())?;
        self.apply(&mut settings);
        Ok(settings)
    }

    fn apply(&self, settings: &mut Settings) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *target = value.clone();
            }
        }
        fn set_opt<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                target.clone_from(value);
            }
        }

        set(&mut settings.server.name, &self.server_name);
        set(&mut settings.server.version, &self.server_version);
        set_opt(&mut settings.server.instructions, &self.instructions);
        set(&mut settings.server.bind, &self.bind);
        if !self.allowed_hosts.is_empty() {
            settings.server.allowed_hosts = Some(self.allowed_hosts.clone());
        }

        set_opt(&mut settings.store.namespace, &self.namespace);
        set_opt(&mut settings.store.endpoint, &self.store_endpoint);
        set_opt(&mut settings.store.file, &self.store_file);

        set_opt(&mut settings.prefixes.tools, &self.tools_prefix);
        set_opt(&mut settings.prefixes.resources, &self.resources_prefix);
        set_opt(&mut settings.prefixes.prompts, &self.prompts_prefix);

        set_opt(&mut settings.compute.endpoint, &self.compute_endpoint);
        set(&mut settings.compute.unit_prefix, &self.unit_prefix);

        set(&mut settings.auth.mode, &self.auth_mode);
        if !self.auth_tokens.is_empty() {
            settings.auth.tokens.clone_from(&self.auth_tokens);
        }

        set(&mut settings.catalog.refresh_secs, &self.refresh_secs);
    }
}
