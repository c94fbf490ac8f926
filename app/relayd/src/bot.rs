//! Telegram front-end: authorization, commands, and chat dispatch.

use crate::AppState;
use anyhow::Result;
use failover::{GenerateOutcome, Provider};
use llm::{DEFAULT_MAX_TOKENS, Message, truncate};
use std::time::Duration;
use telegram::{Incoming, TelegramClient};

/// Reply sent to senders outside the allow-list.
pub const UNAUTHORIZED_REPLY: &str = "Unauthorized.";

/// Backoff after a failed poll round.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

const HELP_TEXT: &str = "\
Chat Relay
==========
Send me any message and I'll answer through the configured AI backends.

Commands:
/status - Relay status
/health - Backend health check
/model  - Active model info";

const OUTAGE_REPLY: &str = "\
Failed to generate a response. All chat backends are unavailable.
Use /health to check backend status.";

/// A recognized bot command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/start` or `/help`: usage text.
    Start,
    /// `/status`: uptime and counters.
    Status,
    /// `/health`: probe every backend.
    Health,
    /// `/model`: active backend details.
    Model,
}

/// Parse the leading command of a message, tolerating `/cmd@botname`.
pub fn parse_command(text: &str) -> Option<Command> {
    let first = text.split_whitespace().next()?;
    let name = first.split('@').next()?;
    match name {
        "/start" | "/help" => Some(Command::Start),
        "/status" => Some(Command::Status),
        "/health" => Some(Command::Health),
        "/model" => Some(Command::Model),
        _ => None,
    }
}

/// Whether a sender is on the allow-list.
pub fn is_authorized(sender_id: i64, allowed: &[i64]) -> bool {
    allowed.contains(&sender_id)
}

/// Annotate a reply with the serving backend when it differs from the
/// primary.
pub fn render_reply(content: &str, provider: &str, primary: Option<&str>) -> String {
    match primary {
        Some(primary) if primary == provider => content.to_owned(),
        _ => format!("{content}\n\n(via {provider})"),
    }
}

/// `/status` body.
pub fn status_text(state: &AppState) -> String {
    let current = state.manager.current_provider();
    let (name, model) = match &current {
        Some(p) => (p.name.as_str(), p.model.as_str()),
        None => ("N/A", "N/A"),
    };
    format!(
        "Relay Status\n\
         ============\n\
         State: Running\n\
         Uptime: {}\n\
         Messages: {}\n\
         Errors: {}\n\
         Active LLM: {name}\n\
         Model: {model}",
        state.uptime(),
        state.messages(),
        state.errors(),
    )
}

/// `/health` body, rendered from already-probed providers.
pub fn health_report(providers: &[Provider]) -> String {
    let mut lines = vec!["Backend Health Report\n=====================".to_owned()];
    for provider in providers {
        let status = if provider.healthy { "HEALTHY" } else { "UNHEALTHY" };
        let latency = if provider.latency_ms > 0.0 {
            format!("{:.0}ms", provider.latency_ms)
        } else {
            "N/A".to_owned()
        };
        lines.push(format!(
            "\n{}\n  Status: {status}\n  Model: {}\n  Latency: {latency}",
            provider.name, provider.model
        ));
        if !provider.healthy {
            if let Some(error) = &provider.last_error {
                lines.push(format!("  Error: {}", truncate(error, 80)));
            }
        }
    }
    lines.join("\n")
}

/// Bound a string for single-line display, marking the cut.
fn elide(input: &str, max: usize) -> String {
    if input.len() <= max {
        input.to_owned()
    } else {
        format!("{}...", truncate(input, max))
    }
}

/// `/model` body.
pub fn model_text(state: &AppState) -> String {
    let Some(current) = state.manager.current_provider() else {
        return "No chat backends configured.".to_owned();
    };
    let fallbacks: Vec<String> = state
        .manager
        .providers()
        .iter()
        .filter(|p| p.name != current.name)
        .map(|p| p.name.to_string())
        .collect();
    format!(
        "Active Model\n\
         ============\n\
         Source: {}\n\
         Model: {}\n\
         Endpoint: {}\n\
         Latency: {:.0}ms\n\
         Health: {}\n\
         Fallbacks: {}",
        current.name,
        current.model,
        elide(&current.endpoint, 50),
        current.latency_ms,
        if current.healthy { "OK" } else { "DOWN" },
        if fallbacks.is_empty() {
            "None".to_owned()
        } else {
            fallbacks.join(", ")
        },
    )
}

/// Handle one incoming Telegram message.
pub async fn handle_incoming(
    state: &AppState,
    tg: &TelegramClient,
    allowed: &[i64],
    incoming: &Incoming,
) -> Result<()> {
    if !is_authorized(incoming.sender_id, allowed) {
        tracing::warn!("rejected message from unauthorized user {}", incoming.sender_id);
        return tg
            .send_message(incoming.chat_id, UNAUTHORIZED_REPLY, false)
            .await;
    }

    match parse_command(&incoming.text) {
        Some(Command::Start) => tg.send_message(incoming.chat_id, HELP_TEXT, false).await,
        Some(Command::Status) => {
            tg.send_message(incoming.chat_id, &status_text(state), false)
                .await
        }
        Some(Command::Health) => {
            tg.send_message(incoming.chat_id, "Running health checks...", false)
                .await?;
            for provider in state.manager.providers() {
                state.manager.health_check(Some(provider.name.as_str())).await;
            }
            let report = health_report(&state.manager.providers());
            tg.send_message(incoming.chat_id, &report, false).await
        }
        Some(Command::Model) => {
            tg.send_message(incoming.chat_id, &model_text(state), false)
                .await
        }
        None => chat(state, tg, incoming).await,
    }
}

/// Route a plain message through the failover manager and reply.
async fn chat(state: &AppState, tg: &TelegramClient, incoming: &Incoming) -> Result<()> {
    state.record_message();

    if state.manager.is_empty() {
        return tg
            .send_message(
                incoming.chat_id,
                "No chat backends are configured. Check the relay configuration.",
                false,
            )
            .await;
    }

    // Best effort; a failed indicator must not block the reply.
    if let Err(e) = tg.send_typing(incoming.chat_id).await {
        tracing::debug!("typing indicator failed: {e}");
    }

    let messages = vec![Message::user(incoming.text.clone())];
    let primary = state.manager.providers().first().map(|p| p.name.clone());

    match state.manager.generate(&messages, DEFAULT_MAX_TOKENS).await {
        GenerateOutcome::Success {
            provider, content, ..
        } => {
            let reply = render_reply(&content, &provider, primary.as_deref());
            // Markdown first; Telegram rejects unbalanced markup, so fall
            // back to plain text.
            if tg.send_message(incoming.chat_id, &reply, true).await.is_err() {
                tg.send_message(incoming.chat_id, &reply, false).await?;
            }
            Ok(())
        }
        GenerateOutcome::Failure { error } => {
            state.record_error();
            tracing::warn!("generation failed for chat {}: {error}", incoming.chat_id);
            tg.send_message(incoming.chat_id, OUTAGE_REPLY, false).await
        }
    }
}

/// Poll Telegram forever, dispatching each update in arrival order.
///
/// Messages are handled sequentially within a batch; the relay targets a
/// single operator, so near-serial processing is the expected load.
pub async fn run_polling(state: AppState, tg: TelegramClient, allowed: Vec<i64>) -> Result<()> {
    let mut offset = 0i64;
    loop {
        match tg.get_updates(offset).await {
            Ok(batch) => {
                offset = batch.next_offset;
                for incoming in &batch.incoming {
                    if let Err(e) = handle_incoming(&state, &tg, &allowed, incoming).await {
                        tracing::warn!("failed to handle update {}: {e}", incoming.update_id);
                    }
                }
            }
            Err(e) => {
                tracing::warn!("getUpdates failed: {e}");
                tokio::time::sleep(POLL_RETRY_DELAY).await;
            }
        }
    }
}
