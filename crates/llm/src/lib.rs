//! OpenAI-compatible chat completion types and transport.
//!
//! This crate provides the shared wire types used by the failover core and
//! the health probe: `Message`/`Role`, the `/chat/completions` request body,
//! response parsing, and `ChatClient` for issuing a single request with a
//! per-call timeout.

pub use client::{ChatClient, ChatError, truncate};
pub use message::{Message, Role};
pub use request::{ChatRequest, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
pub use response::{ChatResponse, Choice, ResponseMessage, Usage};
pub use reqwest::{self, Client};

mod client;
mod message;
mod request;
mod response;
