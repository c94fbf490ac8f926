//! `FailoverManager` — bounded-retry rotation across the configured backends.

use crate::{
    BackendsConfig, GenerateOutcome, Provider, ProviderRegistry,
    probe::{attempt, probe_request},
};
use llm::{ChatRequest, Client, Message};
use std::sync::{Arc, RwLock};

/// Routes generation requests to the current backend and rotates away from
/// broken ones.
///
/// The state is a single index into the registry. Demotion is positional
/// rotation, not removal — a rotated-past provider becomes eligible again
/// once the index wraps around to it. After a fully failed call the index
/// stays wherever rotation left it, so subsequent calls skip the backend
/// that just failed instead of hammering it on every message.
///
/// All methods that read or mutate state acquire the `RwLock`; the lock is
/// never held across a network call — the target provider is cloned out and
/// its status written back afterwards. Concurrent calls may interleave
/// rotations, which is accepted: the health fields are advisory telemetry.
pub struct FailoverManager {
    inner: Arc<RwLock<Inner>>,
    /// Shared HTTP client for all attempts.
    client: Client,
}

struct Inner {
    registry: ProviderRegistry,
    /// Index of the current provider. Always `< registry.len()` when the
    /// registry is non-empty.
    current: usize,
}

impl FailoverManager {
    /// Create a manager over an already-built registry.
    pub fn new(registry: ProviderRegistry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                registry,
                current: 0,
            })),
            client: Client::new(),
        }
    }

    /// Build the registry from configuration and wrap it in a manager.
    pub fn from_config(config: &BackendsConfig) -> Self {
        Self::new(ProviderRegistry::from_config(config))
    }

    /// Number of configured providers.
    pub fn len(&self) -> usize {
        let inner = self.inner.read().expect("failover lock poisoned");
        inner.registry.len()
    }

    /// Whether no providers are configured.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the current provider.
    pub fn current_index(&self) -> usize {
        let inner = self.inner.read().expect("failover lock poisoned");
        inner.current
    }

    /// A clone of the current provider, or `None` for an empty registry.
    pub fn current_provider(&self) -> Option<Provider> {
        self.snapshot_current().map(|(_, provider)| provider)
    }

    /// Clones of all providers in priority order, for enumeration.
    pub fn providers(&self) -> Vec<Provider> {
        let inner = self.inner.read().expect("failover lock poisoned");
        inner.registry.providers().to_vec()
    }

    /// Advance the current index to the next provider, wrapping around.
    /// No-op when fewer than two providers exist.
    pub fn rotate(&self) {
        let mut inner = self.inner.write().expect("failover lock poisoned");
        let len = inner.registry.len();
        if len < 2 {
            return;
        }
        let old = inner.current;
        inner.current = (old + 1) % len;
        let from = inner.registry.get(old).map(|p| p.name.clone());
        let to = inner.registry.get(inner.current).map(|p| p.name.clone());
        if let (Some(from), Some(to)) = (from, to) {
            tracing::warn!("switched provider: {from} -> {to}");
        }
    }

    /// Generate a reply, falling back across providers on failure.
    ///
    /// Attempts at most one request per provider, in rotation order starting
    /// from the current index. Each failure marks the attempted provider
    /// unhealthy and rotates — unless it was the final attempt, so the index
    /// is left on the last provider tried rather than past it.
    pub async fn generate(&self, messages: &[Message], max_tokens: u32) -> GenerateOutcome {
        let total = self.len();
        if total == 0 {
            return GenerateOutcome::Failure {
                error: "no providers configured".to_owned(),
            };
        }

        let mut attempts = 0;
        while attempts < total {
            let Some((index, provider)) = self.snapshot_current() else {
                break;
            };

            let request =
                ChatRequest::new(provider.model.clone(), messages.to_vec()).max_tokens(max_tokens);
            match attempt(&self.client, &provider, &request).await {
                Ok((content, latency_ms)) => {
                    self.record_success(index, latency_ms);
                    tracing::debug!(
                        "generation served by {} in {latency_ms:.0}ms",
                        provider.name
                    );
                    return GenerateOutcome::Success {
                        provider: provider.name.clone(),
                        model: provider.model.clone(),
                        content,
                        latency_ms,
                    };
                }
                Err(e) => {
                    tracing::warn!("generation failed with {}: {}", provider.name, e.message);
                    self.record_failure(index, &e.message, e.latency_ms);
                    if attempts < total - 1 {
                        self.rotate();
                    }
                    attempts += 1;
                }
            }
        }

        GenerateOutcome::Failure {
            error: "all providers failed".to_owned(),
        }
    }

    /// Probe one provider with a minimal chat completion.
    ///
    /// Defaults to the current provider when `provider` is `None`; an
    /// unknown name or an empty registry yields `false`. Never errors —
    /// the outcome is the returned boolean plus the status fields written
    /// onto the targeted provider.
    pub async fn health_check(&self, provider: Option<&str>) -> bool {
        let target = match provider {
            Some(name) => self.snapshot_named(name),
            None => self.snapshot_current(),
        };
        let Some((index, provider)) = target else {
            return false;
        };

        let request = probe_request(&provider);
        match attempt(&self.client, &provider, &request).await {
            Ok((_, latency_ms)) => {
                self.record_success(index, latency_ms);
                true
            }
            Err(e) => {
                tracing::warn!("health check failed for {}: {}", provider.name, e.message);
                self.record_failure(index, &e.message, e.latency_ms);
                false
            }
        }
    }

    fn snapshot_current(&self) -> Option<(usize, Provider)> {
        let inner = self.inner.read().expect("failover lock poisoned");
        let index = inner.current;
        inner.registry.get(index).map(|p| (index, p.clone()))
    }

    fn snapshot_named(&self, name: &str) -> Option<(usize, Provider)> {
        let inner = self.inner.read().expect("failover lock poisoned");
        let index = inner.registry.position(name)?;
        inner.registry.get(index).map(|p| (index, p.clone()))
    }

    fn record_success(&self, index: usize, latency_ms: f64) {
        let mut inner = self.inner.write().expect("failover lock poisoned");
        if let Some(provider) = inner.registry.get_mut(index) {
            provider.record_success(latency_ms);
        }
    }

    fn record_failure(&self, index: usize, message: &str, latency_ms: Option<f64>) {
        let mut inner = self.inner.write().expect("failover lock poisoned");
        if let Some(provider) = inner.registry.get_mut(index) {
            provider.record_failure(message, latency_ms);
        }
    }
}

impl std::fmt::Debug for FailoverManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read().expect("failover lock poisoned");
        f.debug_struct("FailoverManager")
            .field("current", &inner.current)
            .field("count", &inner.registry.len())
            .finish()
    }
}

impl Clone for FailoverManager {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            client: self.client.clone(),
        }
    }
}
