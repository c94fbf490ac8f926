//! One-shot chat attempts against a single provider.
//!
//! Both the health probe and the generation loop go through [`attempt`]:
//! build a client for the provider, send one request, classify the failure.
//! Nothing here touches shared state — callers write the outcome back onto
//! the provider under their own lock.

use crate::Provider;
use llm::{ChatClient, ChatRequest, Client, Message};
use std::time::Instant;

/// Fixed probe message sent by health checks.
pub(crate) const PROBE_MESSAGE: &str = "Reply with OK.";
/// Token cap for probe requests.
pub(crate) const PROBE_MAX_TOKENS: u32 = 10;
/// Sampling temperature for probe requests.
pub(crate) const PROBE_TEMPERATURE: f32 = 0.1;

/// A failed attempt: a short diagnostic for `last_error`, plus the measured
/// latency when a response round trip completed before the failure.
pub(crate) struct AttemptError {
    pub message: String,
    pub latency_ms: Option<f64>,
}

/// Outcome of a single attempt: content plus measured latency, or a
/// classified failure.
pub(crate) type AttemptResult = Result<(String, f64), AttemptError>;

/// The minimal request used by health checks.
pub(crate) fn probe_request(provider: &Provider) -> ChatRequest {
    ChatRequest::new(provider.model.clone(), vec![Message::user(PROBE_MESSAGE)])
        .max_tokens(PROBE_MAX_TOKENS)
        .temperature(PROBE_TEMPERATURE)
}

/// Issue one chat completion request against `provider`.
///
/// Never panics and never propagates: every failure mode (malformed
/// credential, timeout, connection error, non-200 status, unparseable or
/// empty body) comes back as an [`AttemptError`].
pub(crate) async fn attempt(
    client: &Client,
    provider: &Provider,
    request: &ChatRequest,
) -> AttemptResult {
    // A credential that does not form a valid header fails locally,
    // before any network traffic.
    let chat = match &provider.api_key {
        Some(key) => match ChatClient::bearer(client.clone(), key, &provider.endpoint) {
            Ok(chat) => chat,
            Err(e) => {
                return Err(AttemptError {
                    message: format!("invalid credential: {e}"),
                    latency_ms: None,
                });
            }
        },
        None => ChatClient::no_auth(client.clone(), &provider.endpoint),
    };

    let started = Instant::now();
    match chat.send(request, provider.timeout).await {
        Ok(response) => {
            let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
            match response.content() {
                Some(content) if !content.is_empty() => Ok((content.to_owned(), latency_ms)),
                _ => Err(AttemptError {
                    message: "missing completion content".to_owned(),
                    latency_ms: Some(latency_ms),
                }),
            }
        }
        Err(e) => Err(AttemptError {
            message: e.to_string(),
            latency_ms: e
                .is_round_trip()
                .then(|| started.elapsed().as_secs_f64() * 1000.0),
        }),
    }
}
