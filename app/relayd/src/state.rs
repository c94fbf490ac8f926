//! Shared daemon state: the failover manager plus uptime and counters.

use failover::FailoverManager;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// State shared by the Telegram front-end and the status endpoint.
///
/// Cheap to clone; all fields are handles to shared data.
#[derive(Clone)]
pub struct AppState {
    /// The provider failover manager.
    pub manager: FailoverManager,
    counters: Arc<Counters>,
}

struct Counters {
    started: Instant,
    messages: AtomicU64,
    errors: AtomicU64,
}

impl AppState {
    /// Create the state around a built manager, starting the uptime clock.
    pub fn new(manager: FailoverManager) -> Self {
        Self {
            manager,
            counters: Arc::new(Counters {
                started: Instant::now(),
                messages: AtomicU64::new(0),
                errors: AtomicU64::new(0),
            }),
        }
    }

    /// Count one handled chat message.
    pub fn record_message(&self) {
        self.counters.messages.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one failed generation.
    pub fn record_error(&self) {
        self.counters.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of chat messages handled since startup.
    pub fn messages(&self) -> u64 {
        self.counters.messages.load(Ordering::Relaxed)
    }

    /// Number of failed generations since startup.
    pub fn errors(&self) -> u64 {
        self.counters.errors.load(Ordering::Relaxed)
    }

    /// Human-readable uptime.
    pub fn uptime(&self) -> String {
        format_uptime(self.counters.started.elapsed())
    }
}

/// Render a duration as `XhYmZs`.
pub fn format_uptime(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{hours}h {minutes}m {seconds}s")
}
