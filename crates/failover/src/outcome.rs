//! Typed generation outcome.

use compact_str::CompactString;

/// Provider name reported on total failure.
pub const NO_PROVIDER: &str = "NONE";

/// Result of a `generate` call.
///
/// Exactly two variants: a completion served by a named provider, or total
/// failure after every configured backend was tried (or none existed).
#[derive(Debug, Clone)]
pub enum GenerateOutcome {
    /// A provider answered with content.
    Success {
        /// Name of the serving provider.
        provider: CompactString,
        /// Model that produced the completion.
        model: CompactString,
        /// Generated text. Never empty.
        content: String,
        /// Measured round trip in milliseconds.
        latency_ms: f64,
    },
    /// No provider could answer.
    Failure {
        /// Why the call failed. Never empty.
        error: String,
    },
}

impl GenerateOutcome {
    /// Whether the call produced a completion.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The serving provider's name, or "NONE" on failure.
    pub fn provider(&self) -> &str {
        match self {
            Self::Success { provider, .. } => provider,
            Self::Failure { .. } => NO_PROVIDER,
        }
    }

    /// The generated content, if any.
    pub fn content(&self) -> Option<&str> {
        match self {
            Self::Success { content, .. } => Some(content),
            Self::Failure { .. } => None,
        }
    }
}
