//! The request body for OpenAI-compatible chat completion endpoints.

use crate::Message;
use compact_str::CompactString;
use serde::Serialize;

/// Default generation token cap.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
/// Default sampling temperature for chat generation.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// The JSON body sent to `{endpoint}/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// The model we are using
    pub model: CompactString,

    /// The messages to send to the API
    pub messages: Vec<Message>,

    /// The maximum number of tokens to generate
    pub max_tokens: u32,

    /// The temperature to use for the response
    pub temperature: f32,
}

impl ChatRequest {
    /// Create a request with the default token cap and temperature.
    pub fn new(model: impl Into<CompactString>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Override the token cap.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Override the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}
