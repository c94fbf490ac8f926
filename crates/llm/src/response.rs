//! Chat completion response types.

use crate::Role;
use serde::Deserialize;

/// A chat completion response from the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// A unique identifier for the chat completion
    #[serde(default)]
    pub id: String,

    /// The model used for the completion
    #[serde(default)]
    pub model: String,

    /// The list of completion choices
    pub choices: Vec<Choice>,

    /// Token usage statistics
    pub usage: Option<Usage>,
}

impl ChatResponse {
    /// Get the content of the top completion, if any.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
    }
}

/// A completion choice in a non-streaming response
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    /// The index of this choice in the list
    #[serde(default)]
    pub index: u32,

    /// The generated message
    pub message: ResponseMessage,

    /// The reason the model stopped generating
    pub finish_reason: Option<String>,
}

/// Message content in a completion response
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ResponseMessage {
    /// The role of the message author
    pub role: Option<Role>,

    /// The content of the message
    pub content: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,

    /// Number of tokens in the completion
    pub completion_tokens: u32,

    /// Total number of tokens used
    pub total_tokens: u32,
}
