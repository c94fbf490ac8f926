//! Daemon configuration loaded from TOML.

use anyhow::{Context, Result, bail};
use failover::BackendsConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file read when no path argument is given.
pub const DEFAULT_CONFIG_PATH: &str = "relayd.toml";

/// Top-level daemon configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Telegram front-end configuration.
    pub telegram: TelegramConfig,
    /// Chat backend configuration, consumed by the failover registry.
    pub backends: BackendsConfig,
    /// Status web server configuration.
    pub server: ServerConfig,
}

/// Telegram front-end configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token (supports `${ENV_VAR}` expansion).
    pub bot_token: String,
    /// Telegram user ids allowed to talk to the relay.
    pub allowed_ids: Vec<i64>,
}

/// Status web server configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port the status endpoint binds on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 8080 }
    }
}

impl RelayConfig {
    /// Parse a TOML string, expanding `${ENV_VAR}` patterns in all fields.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let expanded = crate::utils::expand_env_vars(toml_str);
        toml::from_str(&expanded).context("failed to parse configuration")
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Check the required fields.
    ///
    /// A missing bot token or an empty allow-list is fatal. Missing chat
    /// backends are not — the registry reports that on its own and the
    /// relay answers every message with a failure until one is configured.
    pub fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.is_empty() {
            bail!("telegram.bot_token is not set");
        }
        if self.telegram.allowed_ids.is_empty() {
            bail!("telegram.allowed_ids is empty, nobody could talk to the relay");
        }
        if self.backends.local_endpoint.is_empty() {
            tracing::warn!("backends.local_endpoint not set, only the fallback API is available");
        }
        Ok(())
    }

    /// Bind address for the status server.
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.server.port)
    }
}
