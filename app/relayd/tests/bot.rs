//! Command parsing, authorization, and report rendering.

use failover::{BackendsConfig, FailoverManager, Provider};
use relayd::AppState;
use relayd::bot::{
    Command, health_report, is_authorized, model_text, parse_command, render_reply, status_text,
};
use std::time::Duration;

fn state_with_local() -> AppState {
    let config = BackendsConfig {
        local_endpoint: "http://localhost:8000/v1".to_owned(),
        local_model: "qwen2.5".into(),
        ..Default::default()
    };
    AppState::new(FailoverManager::from_config(&config))
}

fn empty_state() -> AppState {
    AppState::new(FailoverManager::from_config(&BackendsConfig::default()))
}

#[test]
fn command_parsing() {
    assert_eq!(parse_command("/start"), Some(Command::Start));
    assert_eq!(parse_command("/help"), Some(Command::Start));
    assert_eq!(parse_command("/status"), Some(Command::Status));
    assert_eq!(parse_command("/health"), Some(Command::Health));
    assert_eq!(parse_command("/model"), Some(Command::Model));
    // Group chats append the bot name.
    assert_eq!(parse_command("/status@relay_bot"), Some(Command::Status));
    // Trailing arguments are ignored.
    assert_eq!(parse_command("/status now please"), Some(Command::Status));
    assert_eq!(parse_command("hello there"), None);
    assert_eq!(parse_command("/unknown"), None);
    assert_eq!(parse_command(""), None);
}

#[test]
fn allow_list() {
    assert!(is_authorized(42, &[41, 42, 43]));
    assert!(!is_authorized(44, &[41, 42, 43]));
    assert!(!is_authorized(42, &[]));
}

#[test]
fn reply_annotation() {
    // Primary serving: no annotation.
    assert_eq!(render_reply("hi", "LOCAL", Some("LOCAL")), "hi");
    // Fallback serving: annotated.
    assert_eq!(
        render_reply("hi", "OPENAI", Some("LOCAL")),
        "hi\n\n(via OPENAI)"
    );
    // No primary known: annotated.
    assert_eq!(render_reply("hi", "OPENAI", None), "hi\n\n(via OPENAI)");
}

#[test]
fn status_reports_active_provider() {
    let state = state_with_local();
    let text = status_text(&state);
    assert!(text.contains("Uptime: 0h 0m"), "unexpected status: {text}");
    assert!(text.contains("Messages: 0"));
    assert!(text.contains("Errors: 0"));
    assert!(text.contains("Active LLM: LOCAL"));
    assert!(text.contains("Model: qwen2.5"));

    state.record_message();
    state.record_message();
    state.record_error();
    let text = status_text(&state);
    assert!(text.contains("Messages: 2"));
    assert!(text.contains("Errors: 1"));
}

#[test]
fn status_without_providers() {
    let text = status_text(&empty_state());
    assert!(text.contains("Active LLM: N/A"));
    assert!(text.contains("Model: N/A"));
}

#[test]
fn health_report_rendering() {
    let healthy = {
        let mut p = Provider::new(
            "LOCAL",
            "http://localhost:8000/v1",
            "qwen2.5",
            None,
            Duration::from_secs(60),
        );
        p.latency_ms = 123.4;
        p
    };
    let unhealthy = {
        let mut p = Provider::new(
            "OPENAI",
            "https://api.openai.com/v1",
            "gpt-4o-mini",
            Some("sk-test".to_owned()),
            Duration::from_secs(30),
        );
        p.healthy = false;
        p.last_error = Some(format!("HTTP 500: {}", "x".repeat(200)));
        p
    };

    let report = health_report(&[healthy, unhealthy]);
    assert!(report.contains("LOCAL"));
    assert!(report.contains("Status: HEALTHY"));
    assert!(report.contains("Latency: 123ms"));
    assert!(report.contains("OPENAI"));
    assert!(report.contains("Status: UNHEALTHY"));
    // Diagnostic shown for unhealthy providers, bounded for chat display.
    let error_line = report
        .lines()
        .find(|l| l.contains("Error:"))
        .expect("error line");
    assert!(error_line.contains("HTTP 500"));
    assert!(error_line.len() < 120, "error line too long: {error_line}");
}

#[test]
fn health_report_unmeasured_latency() {
    let p = Provider::new(
        "LOCAL",
        "http://localhost:8000/v1",
        "default",
        None,
        Duration::from_secs(60),
    );
    let report = health_report(&[p]);
    assert!(report.contains("Latency: N/A"));
}

#[test]
fn model_info() {
    let config = BackendsConfig {
        local_endpoint: "http://localhost:8000/v1".to_owned(),
        local_model: "qwen2.5".into(),
        openai_api_key: "sk-test".to_owned(),
        ..Default::default()
    };
    let state = AppState::new(FailoverManager::from_config(&config));
    let text = model_text(&state);
    assert!(text.contains("Source: LOCAL"));
    assert!(text.contains("Model: qwen2.5"));
    assert!(text.contains("Endpoint: http://localhost:8000/v1"));
    assert!(text.contains("Health: OK"));
    assert!(text.contains("Fallbacks: OPENAI"));
}

#[test]
fn model_info_marks_truncated_endpoint() {
    let long = format!("http://internal.example.com/{}/v1", "x".repeat(60));
    let config = BackendsConfig {
        local_endpoint: long.clone(),
        ..Default::default()
    };
    let state = AppState::new(FailoverManager::from_config(&config));
    let text = model_text(&state);

    let endpoint_line = text
        .lines()
        .find(|l| l.starts_with("Endpoint:"))
        .expect("endpoint line");
    assert!(endpoint_line.ends_with("..."), "no cut marker: {endpoint_line}");
    assert!(endpoint_line.contains(&long[..50]));
    // A complete endpoint is shown as-is.
    let text = model_text(&state_with_local());
    assert!(text.contains("Endpoint: http://localhost:8000/v1\n"));
}

#[test]
fn model_info_without_fallbacks() {
    let state = state_with_local();
    assert!(model_text(&state).contains("Fallbacks: None"));
}

#[test]
fn model_info_without_providers() {
    assert!(model_text(&empty_state()).contains("No chat backends"));
}
