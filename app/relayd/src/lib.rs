//! Telegram chat relay daemon.
//!
//! Thin glue around the failover core: loads configuration, polls Telegram
//! for messages, enforces the sender allow-list, routes plain messages
//! through [`failover::FailoverManager::generate`], and serves a read-only
//! status endpoint for monitoring.

pub use config::RelayConfig;
pub use state::AppState;

pub mod bot;
pub mod config;
pub mod state;
pub mod status;
pub mod utils;
