//! Node configuration.
//!
//! Read from a TOML file; every key has a default so the file is optional.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

const CONFIG_ENV: &str = "SWAPCHAIN_CONFIG";
const PORT_ENV: &str = "SWAPCHAIN_PORT";
const DEFAULT_PATH: &str = "config/node.toml";

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    pub server: ServerConfig,
    pub executor: ExecutorConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Behaviour of the simulated swap executor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub latency_ms: u64,
    /// Fail every swap with this message.
    pub fail_with: Option<String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            latency_ms: 2000,
            fail_with: None,
        }
    }
}

impl ExecutorConfig {
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

impl NodeConfig {
    /// Load from `$SWAPCHAIN_CONFIG`, or `config/node.toml` if present.
    ///
    /// An explicitly configured path must exist. `$SWAPCHAIN_PORT` overrides
    /// the port either way.
    pub fn load() -> Result<Self> {
        let mut config = match env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(PathBuf::from(path))?,
            Err(_) => {
                let path = PathBuf::from(DEFAULT_PATH);
                if path.exists() {
                    Self::from_file(path)?
                } else {
                    Self::default()
                }
            }
        };

        if let Ok(port) = env::var(PORT_ENV) {
            config.server.port = port
                .parse()
                .with_context(|| format!("Invalid {}: {}", PORT_ENV, port))?;
        }

        Ok(config)
    }

    fn from_file(path: PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Failed to parse configuration")
    }

    /// Address to listen on.
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.server.host, self.server.port))
    }
}
