//! Telegram Bot API adapter.
//!
//! Hand-rolled over reqwest + serde_json: receives messages by long polling
//! `getUpdates`, replies via `sendMessage`, and signals activity via
//! `sendChatAction`. No webhook support — the relay is designed to run
//! behind NAT without an inbound port.

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};
use std::time::Duration;

/// Telegram Bot API base URL.
pub const API_BASE: &str = "https://api.telegram.org";
/// Long-poll timeout passed to `getUpdates`, in seconds.
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

/// Build the URL for a Bot API method call.
pub fn method_url(base: &str, token: &str, method: &str) -> String {
    format!("{}/bot{token}/{method}", base.trim_end_matches('/'))
}

/// A text message received from Telegram.
#[derive(Debug, Clone)]
pub struct Incoming {
    /// Update identifier, monotonically increasing per bot.
    pub update_id: i64,
    /// Chat to reply into.
    pub chat_id: i64,
    /// Telegram user id of the sender.
    pub sender_id: i64,
    /// Message text.
    pub text: String,
    /// Unix timestamp when the message was sent.
    pub timestamp: u64,
}

/// One `getUpdates` round: the text messages plus the offset to ack them.
#[derive(Debug, Clone, Default)]
pub struct UpdateBatch {
    /// Parsed text messages, in arrival order.
    pub incoming: Vec<Incoming>,
    /// Offset to pass to the next poll. Advances past every received
    /// update, including non-text ones.
    pub next_offset: i64,
}

/// Parse one `getUpdates` entry into an [`Incoming`].
///
/// Returns `None` for updates without a text message (edits, photos,
/// joins, ...) — those are acknowledged via the batch offset and dropped.
pub fn incoming_from_update(update: &Value) -> Option<Incoming> {
    let message = update.get("message")?;
    let text = message.get("text")?.as_str()?;
    if text.is_empty() {
        return None;
    }
    Some(Incoming {
        update_id: update.get("update_id")?.as_i64()?,
        chat_id: message.get("chat")?.get("id")?.as_i64()?,
        sender_id: message.get("from")?.get("id")?.as_i64()?,
        text: text.to_owned(),
        timestamp: message.get("date").and_then(Value::as_u64).unwrap_or(0),
    })
}

/// Client for one bot token.
#[derive(Clone)]
pub struct TelegramClient {
    token: String,
    client: reqwest::Client,
    base: String,
    poll_timeout: Duration,
}

impl TelegramClient {
    /// Create a client with the default API base and poll timeout.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_config(
            token,
            reqwest::Client::new(),
            DEFAULT_POLL_TIMEOUT_SECS,
        )
    }

    /// Create a client with an explicit HTTP client and poll timeout.
    pub fn with_config(
        token: impl Into<String>,
        client: reqwest::Client,
        poll_timeout_secs: u64,
    ) -> Self {
        Self {
            token: token.into(),
            client,
            base: API_BASE.to_owned(),
            poll_timeout: Duration::from_secs(poll_timeout_secs),
        }
    }

    /// Override the API base URL. Used by tests.
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Long-poll for updates starting at `offset`.
    pub async fn get_updates(&self, offset: i64) -> Result<UpdateBatch> {
        let body = json!({
            "offset": offset,
            "timeout": self.poll_timeout.as_secs(),
            "allowed_updates": ["message"],
        });
        // The HTTP timeout must outlast the server-side long poll.
        let result = self
            .call("getUpdates", &body, self.poll_timeout + Duration::from_secs(10))
            .await?;

        let updates = result.as_array().context("getUpdates result is not an array")?;
        let mut batch = UpdateBatch {
            incoming: Vec::new(),
            next_offset: offset,
        };
        for update in updates {
            if let Some(id) = update.get("update_id").and_then(Value::as_i64) {
                batch.next_offset = batch.next_offset.max(id + 1);
            }
            if let Some(incoming) = incoming_from_update(update) {
                batch.incoming.push(incoming);
            }
        }
        Ok(batch)
    }

    /// Send a text reply. Markdown parsing is optional because Telegram
    /// rejects messages with unbalanced markup.
    pub async fn send_message(&self, chat_id: i64, text: &str, markdown: bool) -> Result<()> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if markdown {
            body["parse_mode"] = json!("Markdown");
        }
        self.call("sendMessage", &body, Duration::from_secs(30))
            .await?;
        Ok(())
    }

    /// Show a typing indicator in the chat. Best effort.
    pub async fn send_typing(&self, chat_id: i64) -> Result<()> {
        let body = json!({ "chat_id": chat_id, "action": "typing" });
        self.call("sendChatAction", &body, Duration::from_secs(10))
            .await?;
        Ok(())
    }

    /// Issue one Bot API call and unwrap the `{ok, result}` envelope.
    async fn call(&self, api_method: &str, body: &Value, timeout: Duration) -> Result<Value> {
        let url = method_url(&self.base, &self.token, api_method);
        let response: Value = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .with_context(|| format!("{api_method} request failed"))?
            .json()
            .await
            .with_context(|| format!("{api_method} returned a non-JSON body"))?;

        if response.get("ok").and_then(Value::as_bool) != Some(true) {
            let description = response
                .get("description")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            bail!("{api_method} rejected: {description}");
        }
        Ok(response.get("result").cloned().unwrap_or(Value::Null))
    }
}
