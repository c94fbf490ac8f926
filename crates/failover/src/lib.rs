//! Provider failover core.
//!
//! Tracks a prioritized list of chat-completion backends, probes their
//! health, routes generation requests to the current backend, and rotates
//! away from broken backends so subsequent calls skip them without manual
//! intervention.
//!
//! The moving parts:
//! - [`ProviderRegistry`] — ordered backend list built once from config.
//! - [`FailoverManager`] — the rotation state machine behind a shared handle.
//! - [`GenerateOutcome`] — the typed success/failure result of a call.
//!
//! Health probing lives in the manager's `health_check`; it never returns an
//! error, only a boolean plus status fields written back onto the provider.

pub use manager::FailoverManager;
pub use outcome::{GenerateOutcome, NO_PROVIDER};
pub use provider::Provider;
pub use registry::{
    BackendsConfig, LOCAL_NAME, OPENAI_ENDPOINT, OPENAI_MODEL, OPENAI_NAME, OPENAI_TIMEOUT_SECS,
    ProviderRegistry,
};

mod manager;
mod outcome;
mod probe;
mod provider;
mod registry;
