//! TOML configuration.
//!
//! ```toml
//! [data]
//! root = "./site"                 # directory or http(s):// base URL
//! manifest = "data/manifest.json" # resolved against root
//! timeout_secs = 30
//!
//! [server]
//! bind = "127.0.0.1:8080"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    /// Directory or base URL that manifest and dataset paths resolve against.
    #[serde(default = "default_root")]
    pub root: String,
    #[serde(default = "default_manifest")]
    pub manifest: String,
    /// Request timeout for HTTP roots.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_root() -> String {
    ".".to_string()
}
fn default_manifest() -> String {
    "data/manifest.json".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            manifest: default_manifest(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl DataConfig {
    /// True when `root` names an HTTP(S) location rather than a directory.
    pub fn is_remote(&self) -> bool {
        self.root.starts_with("http://") || self.root.starts_with("https://")
    }
}

impl Config {
    /// Defaults used when no config file exists: data under the current directory.
    pub fn minimal() -> Self {
        Self {
            data: DataConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.data.manifest.trim().is_empty() {
        anyhow::bail!("data.manifest must not be empty");
    }
    if config.data.root.trim().is_empty() {
        anyhow::bail!("data.root must not be empty");
    }
    if config.data.timeout_secs == 0 {
        anyhow::bail!("data.timeout_secs must be > 0");
    }
    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}
