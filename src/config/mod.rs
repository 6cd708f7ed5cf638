//! Configuration management.
//!
//! Settings come from a TOML file layered under a `SERPER_MCP_`-prefixed
//! environment source. The two secrets, `SERPER_API_KEY` and `MCP_TOKEN`,
//! are read straight from the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server settings for the SSE transport
    #[serde(default)]
    pub server: ServerConfig,

    /// Serper API settings
    #[serde(default)]
    pub serper: SerperConfig,
}

/// Settings for the SSE server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on every route except `/_health`.
    /// Unset leaves the service open.
    #[serde(default)]
    pub token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            token: std::env::var("MCP_TOKEN").ok().filter(|t| !t.is_empty()),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3001
}

/// Settings for the Serper API client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerperConfig {
    /// API key; `SERPER_API_KEY` in the environment wins
    #[serde(default)]
    pub api_key: Option<String>,

    /// Upstream base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SerperConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("SERPER_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    crate::serper::SERPER_API_BASE.to_string()
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix("SERPER_MCP").separator("__"))
        .build()?;

    let mut config: Config = settings.try_deserialize()?;
    apply_env_secrets(&mut config);
    Ok(config)
}

/// Get the default configuration (from env vars or defaults)
pub fn get_config() -> Config {
    let mut config = Config::default();
    apply_env_secrets(&mut config);
    config
}

/// `SERPER_API_KEY` and `MCP_TOKEN` always override file values
fn apply_env_secrets(config: &mut Config) {
    if let Ok(key) = std::env::var("SERPER_API_KEY") {
        if !key.is_empty() {
            config.serper.api_key = Some(key);
        }
    }
    if let Ok(token) = std::env::var("MCP_TOKEN") {
        if !token.is_empty() {
            config.server.token = Some(token);
        }
    }
}

/// Locate a config file: explicit path, `./serper-mcp.toml`, then the
/// platform config directory.
pub fn find_config_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from("serper-mcp.toml");
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("serper-mcp").join("config.toml"))
        .filter(|path| path.exists())
}
