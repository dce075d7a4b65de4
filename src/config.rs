use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://dgtfn7jd9f.execute-api.us-east-1.amazonaws.com/dev/";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: Server,
    #[serde(default)]
    pub remote: Remote,
    #[serde(default)]
    pub tool: ToolPolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Server {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
}
fn default_name() -> String { "learn-mcp".to_string() }
fn default_version() -> String { "1.0.0".to_string() }

impl Default for Server {
    fn default() -> Self { Self { name: default_name(), version: default_version() } }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Remote {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Honor HTTP(S)_PROXY / NO_PROXY from the environment.
    #[serde(default = "default_system_proxy")]
    pub system_proxy: bool,
}
fn default_endpoint() -> String { DEFAULT_ENDPOINT.to_string() }
fn default_timeout_ms() -> u64 { 5000 }
fn default_system_proxy() -> bool { true }

impl Default for Remote {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_ms: default_timeout_ms(),
            system_proxy: default_system_proxy(),
        }
    }
}

impl Remote {
    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_ms) }
}

/// Policy knobs for the `learn_mcp` tool.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ToolPolicy {
    /// Reject calls whose `arguments` member is absent instead of treating them as `{}`.
    #[serde(default)]
    pub require_arguments: bool,
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)?;
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            Ok(serde_json::from_str(&raw)?)
        } else {
            Ok(toml::from_str(&raw)?)
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = reqwest::Url::parse(&self.remote.endpoint)
            .map_err(|e| anyhow::anyhow!("invalid remote endpoint {:?}: {e}", self.remote.endpoint))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("remote endpoint must be http or https: {}", self.remote.endpoint);
        }
        if self.remote.timeout_ms == 0 { anyhow::bail!("timeout_ms must be > 0"); }
        if self.server.name.trim().is_empty() { anyhow::bail!("server name must not be empty"); }
        Ok(())
    }
}
