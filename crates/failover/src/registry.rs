//! Ordered provider registry built from configuration.

use crate::Provider;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Name of the primary (user-controlled) backend.
pub const LOCAL_NAME: &str = "LOCAL";
/// Name of the OpenAI fallback backend.
pub const OPENAI_NAME: &str = "OPENAI";
/// Fixed endpoint of the OpenAI fallback.
pub const OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
/// Fixed model of the OpenAI fallback.
pub const OPENAI_MODEL: &str = "gpt-4o-mini";
/// Fixed timeout of the OpenAI fallback, in seconds.
pub const OPENAI_TIMEOUT_SECS: u64 = 30;

/// Backend configuration consumed at registry construction.
///
/// Empty strings disable the corresponding backend; a backend whose
/// required configuration is absent is simply omitted from the registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendsConfig {
    /// Base URL of the primary backend. Empty disables it.
    pub local_endpoint: String,

    /// Model identifier for the primary backend. Empty falls back to
    /// "default".
    pub local_model: CompactString,

    /// Per-request timeout for the primary backend, in seconds.
    pub local_timeout_secs: u64,

    /// OpenAI API key for the fallback backend. Empty disables it.
    pub openai_api_key: String,
}

impl BackendsConfig {
    /// Effective timeout for the primary backend.
    fn local_timeout(&self) -> Duration {
        let secs = if self.local_timeout_secs == 0 {
            60
        } else {
            self.local_timeout_secs
        };
        Duration::from_secs(secs)
    }
}

/// The ordered list of configured backends.
///
/// Built once at startup; membership and order never change afterwards.
/// Only the status fields of the contained providers mutate.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: Vec<Provider>,
}

impl ProviderRegistry {
    /// Build the registry from configuration, in fixed priority order:
    /// the local backend first, then the OpenAI fallback.
    ///
    /// An empty result is degraded but not an error — callers check
    /// emptiness before use.
    pub fn from_config(config: &BackendsConfig) -> Self {
        let mut providers = Vec::new();

        if !config.local_endpoint.is_empty() {
            let model = if config.local_model.is_empty() {
                CompactString::from("default")
            } else {
                config.local_model.clone()
            };
            providers.push(Provider::new(
                LOCAL_NAME,
                config.local_endpoint.clone(),
                model,
                None,
                config.local_timeout(),
            ));
        }

        if !config.openai_api_key.is_empty() {
            providers.push(Provider::new(
                OPENAI_NAME,
                OPENAI_ENDPOINT,
                OPENAI_MODEL,
                Some(config.openai_api_key.clone()),
                Duration::from_secs(OPENAI_TIMEOUT_SECS),
            ));
        }

        Self::new(providers)
    }

    /// Create a registry from an explicit provider list.
    pub fn new(providers: Vec<Provider>) -> Self {
        if providers.is_empty() {
            tracing::error!("no chat providers configured, generation will fail");
        } else {
            let names: Vec<&str> = providers.iter().map(|p| p.name.as_str()).collect();
            tracing::info!(
                "initialized {} provider(s): {}",
                providers.len(),
                names.join(", ")
            );
        }
        Self { providers }
    }

    /// Whether the registry holds no providers.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Number of configured providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// The ordered provider sequence.
    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Provider> {
        self.providers.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Provider> {
        self.providers.get_mut(index)
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.providers.iter().position(|p| p.name == name)
    }
}
