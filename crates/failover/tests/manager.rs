//! Failover state machine tests against mock chat-completion backends.

use failover::{FailoverManager, GenerateOutcome, Provider, ProviderRegistry};
use llm::Message;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An endpoint nothing listens on.
const UNREACHABLE: &str = "http://127.0.0.1:1";

fn provider(name: &str, endpoint: &str) -> Provider {
    Provider::new(
        name,
        endpoint,
        "test-model",
        None,
        Duration::from_secs(2),
    )
}

fn manager(providers: Vec<Provider>) -> FailoverManager {
    FailoverManager::new(ProviderRegistry::new(providers))
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2 }
    })
}

async fn mount_completion(server: &MockServer, content: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(content)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn hi() -> Vec<Message> {
    vec![Message::user("hi")]
}

#[tokio::test]
async fn empty_registry_fails_without_network() {
    let manager = manager(vec![]);
    let outcome = manager.generate(&hi(), 1024).await;

    assert!(!outcome.is_success());
    assert_eq!(outcome.provider(), "NONE");
    match outcome {
        GenerateOutcome::Failure { error } => assert!(!error.is_empty()),
        _ => unreachable!(),
    }
}

#[tokio::test]
async fn single_reachable_provider_succeeds_in_place() {
    let server = MockServer::start().await;
    mount_completion(&server, "hello", 1).await;

    let manager = manager(vec![provider("LOCAL", &server.uri())]);
    let outcome = manager.generate(&hi(), 1024).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.provider(), "LOCAL");
    assert_eq!(outcome.content(), Some("hello"));
    assert_eq!(manager.current_index(), 0);

    let local = &manager.providers()[0];
    assert!(local.healthy);
    assert!(local.latency_ms > 0.0);
}

#[tokio::test]
async fn failed_primary_rotates_to_fallback() {
    let fallback = MockServer::start().await;
    mount_completion(&fallback, "served by fallback", 1).await;

    let manager = manager(vec![
        provider("LOCAL", UNREACHABLE),
        provider("OPENAI", &fallback.uri()),
    ]);
    let outcome = manager.generate(&hi(), 1024).await;

    assert!(outcome.is_success());
    assert_eq!(outcome.provider(), "OPENAI");
    assert_eq!(outcome.content(), Some("served by fallback"));
    assert_eq!(manager.current_index(), 1);

    let providers = manager.providers();
    assert!(!providers[0].healthy);
    assert!(providers[0].last_error.is_some());
    assert!(providers[1].healthy);
    assert!(providers[1].latency_ms > 0.0);
}

#[tokio::test]
async fn healthy_current_provider_skips_the_rest() {
    let primary = MockServer::start().await;
    let fallback = MockServer::start().await;
    mount_completion(&primary, "primary wins", 1).await;
    mount_completion(&fallback, "never called", 0).await;

    let manager = manager(vec![
        provider("LOCAL", &primary.uri()),
        provider("OPENAI", &fallback.uri()),
    ]);
    let outcome = manager.generate(&hi(), 1024).await;

    assert_eq!(outcome.provider(), "LOCAL");
    assert_eq!(manager.current_index(), 0);
}

#[tokio::test]
async fn total_outage_reports_none_and_keeps_rotation() {
    let manager = manager(vec![
        provider("A", UNREACHABLE),
        provider("B", UNREACHABLE),
    ]);
    let outcome = manager.generate(&hi(), 1024).await;

    assert!(!outcome.is_success());
    assert_eq!(outcome.provider(), "NONE");
    // Sticky rotation: the index reflects the last attempt, not the entry
    // value.
    assert_eq!(manager.current_index(), 1);

    for p in manager.providers() {
        assert!(!p.healthy);
        assert!(p.last_error.is_some());
    }
}

#[tokio::test]
async fn each_provider_attempted_at_most_once_per_call() {
    let a = MockServer::start().await;
    let b = MockServer::start().await;
    // Both fail; expect exactly one request each.
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .expect(1)
        .mount(&a)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .expect(1)
        .mount(&b)
        .await;

    let manager = manager(vec![provider("A", &a.uri()), provider("B", &b.uri())]);
    let outcome = manager.generate(&hi(), 1024).await;

    assert_eq!(outcome.provider(), "NONE");
    assert!(manager.providers()[0]
        .last_error
        .as_deref()
        .unwrap()
        .contains("500"));
}

#[tokio::test]
async fn sticky_rotation_deprioritizes_failed_primary() {
    let b = MockServer::start().await;

    let manager = manager(vec![
        provider("A", UNREACHABLE),
        provider("B", &b.uri()),
    ]);

    // First call: A is down, B has no mock yet — both fail.
    let outcome = manager.generate(&hi(), 1024).await;
    assert_eq!(outcome.provider(), "NONE");
    assert_eq!(manager.current_index(), 1);

    // B comes back. The next call starts at B and never touches A.
    mount_completion(&b, "recovered", 1).await;
    let outcome = manager.generate(&hi(), 1024).await;
    assert_eq!(outcome.provider(), "B");
    assert_eq!(outcome.content(), Some("recovered"));
    assert_eq!(manager.current_index(), 1);

    let providers = manager.providers();
    assert!(!providers[0].healthy);
    assert!(providers[1].healthy);
    assert!(providers[1].last_error.is_none());
}

#[tokio::test]
async fn rotate_wraps_and_ignores_single_provider() {
    let two = manager(vec![provider("A", UNREACHABLE), provider("B", UNREACHABLE)]);
    assert_eq!(two.current_index(), 0);
    two.rotate();
    assert_eq!(two.current_index(), 1);
    two.rotate();
    assert_eq!(two.current_index(), 0);

    let one = manager(vec![provider("A", UNREACHABLE)]);
    one.rotate();
    assert_eq!(one.current_index(), 0);

    let none = manager(vec![]);
    none.rotate();
    assert_eq!(none.current_index(), 0);
}

#[tokio::test]
async fn generation_passes_token_cap_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(json!({ "max_tokens": 256 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("capped")))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager(vec![provider("LOCAL", &server.uri())]);
    let outcome = manager.generate(&hi(), 256).await;
    assert!(outcome.is_success());
}

#[tokio::test]
async fn empty_completion_content_is_a_failure() {
    let server = MockServer::start().await;
    mount_completion(&server, "", 1).await;

    let manager = manager(vec![provider("LOCAL", &server.uri())]);
    let outcome = manager.generate(&hi(), 1024).await;

    assert!(!outcome.is_success());
    let local = &manager.providers()[0];
    assert!(!local.healthy);
    assert!(local.last_error.as_deref().unwrap().contains("content"));
}
