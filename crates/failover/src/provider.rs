//! Provider descriptor and mutable status fields.

use compact_str::CompactString;
use llm::truncate;
use std::time::Duration;

/// Bound on the diagnostic string kept on a provider.
const MAX_LAST_ERROR: usize = 200;

/// A configured chat-completion backend.
///
/// Identity fields (`name`, `endpoint`, `model`, `api_key`, `timeout`) are
/// fixed at construction. Status fields (`healthy`, `last_error`,
/// `latency_ms`) are written in place by health probes and generation
/// attempts.
#[derive(Debug, Clone)]
pub struct Provider {
    /// Stable display name, unique within the registry.
    pub name: CompactString,

    /// Base URL of the chat-completion HTTP API.
    pub endpoint: String,

    /// Model identifier sent with every request.
    pub model: CompactString,

    /// Optional bearer credential. `None` means the endpoint requires no
    /// authorization header.
    pub api_key: Option<String>,

    /// Per-request timeout budget.
    pub timeout: Duration,

    /// Last-known health state. Optimistic until proven otherwise.
    pub healthy: bool,

    /// Short diagnostic from the most recent failure. Cleared when a call
    /// to this provider later succeeds.
    pub last_error: Option<String>,

    /// Last observed round-trip time in milliseconds. Zero means never
    /// measured.
    pub latency_ms: f64,
}

impl Provider {
    /// Create a provider with default (healthy, unmeasured) status.
    pub fn new(
        name: impl Into<CompactString>,
        endpoint: impl Into<String>,
        model: impl Into<CompactString>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            model: model.into(),
            api_key,
            timeout,
            healthy: true,
            last_error: None,
            latency_ms: 0.0,
        }
    }

    /// Record a successful round trip.
    pub(crate) fn record_success(&mut self, latency_ms: f64) {
        self.healthy = true;
        self.last_error = None;
        self.latency_ms = latency_ms;
    }

    /// Record a failed attempt. Latency is only updated when a response
    /// round trip completed before the failure.
    pub(crate) fn record_failure(&mut self, error: &str, latency_ms: Option<f64>) {
        self.healthy = false;
        self.last_error = Some(truncate(error, MAX_LAST_ERROR));
        if let Some(ms) = latency_ms {
            self.latency_ms = ms;
        }
    }
}
