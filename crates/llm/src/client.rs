//! HTTP transport for OpenAI-compatible chat completion endpoints.
//!
//! `ChatClient` wraps a shared `reqwest::Client` with pre-built headers and
//! the resolved `/chat/completions` URL. Each `send()` carries its own
//! timeout so callers can apply per-backend budgets.

use crate::{ChatRequest, ChatResponse};
use anyhow::Result;
use reqwest::{
    Client, StatusCode,
    header::{self, HeaderMap, HeaderValue},
};
use std::time::Duration;
use thiserror::Error;

/// Bound on the response body captured into error diagnostics.
const MAX_ERROR_BODY: usize = 200;

/// A failed chat completion attempt.
///
/// The variants distinguish whether a response round trip completed, which
/// callers use to decide if latency was actually measured.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// Response body, truncated for display.
        body: String,
    },

    /// The request failed before a response arrived (timeout, connection
    /// refused, TLS failure).
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint returned 200 with a body that does not parse as a chat
    /// completion.
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl ChatError {
    /// Whether a response round trip completed before the failure.
    pub fn is_round_trip(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Malformed(_))
    }
}

/// HTTP client for a single chat completion endpoint.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    headers: HeaderMap,
    endpoint: String,
}

impl ChatClient {
    /// Create a client with Bearer token authentication.
    pub fn bearer(client: Client, key: &str, base: &str) -> Result<Self> {
        let mut headers = default_headers();
        headers.insert(header::AUTHORIZATION, format!("Bearer {key}").parse()?);
        Ok(Self {
            client,
            headers,
            endpoint: completions_url(base),
        })
    }

    /// Create a client without authentication (e.g. a local backend).
    pub fn no_auth(client: Client, base: &str) -> Self {
        Self {
            client,
            headers: default_headers(),
            endpoint: completions_url(base),
        }
    }

    /// Send a chat completion request with the given timeout budget.
    pub async fn send(
        &self,
        request: &ChatRequest,
        timeout: Duration,
    ) -> Result<ChatResponse, ChatError> {
        tracing::trace!(
            "request to {}: {}",
            self.endpoint,
            serde_json::to_string(request).unwrap_or_default()
        );
        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .timeout(timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ChatError::Status {
                status,
                body: truncate(&text, MAX_ERROR_BODY),
            });
        }

        tracing::trace!("response: {text}");
        Ok(serde_json::from_str(&text)?)
    }

    /// Get the resolved completions URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

fn completions_url(base: &str) -> String {
    format!("{}/chat/completions", base.trim_end_matches('/'))
}

/// Truncate a string to at most `max` bytes on a char boundary.
pub fn truncate(input: &str, max: usize) -> String {
    if input.len() <= max {
        return input.to_owned();
    }
    let mut end = max;
    while !input.is_char_boundary(end) {
        end -= 1;
    }
    input[..end].to_owned()
}
