//! Share protocol tests against recording doubles.
//!
//! Covers ordering, short-circuiting and per-request isolation of
//! `ShareService`, and the reply `CommandHandler` sends for each outcome.

mod common;

use common::{Call, CallLog, FakeIssuer, FakeNotifier, FakeStore, SECRETS_PATH, VAULT_ADDR};
use secretshare::share::{SecretIdGenerator, ShareError, ShareService, SECRET_ID_PREFIX};
use secretshare::slack::{CommandHandler, SlashCommand};
use std::collections::HashSet;
use std::sync::Arc;

const FROZEN_NANOS: u64 = 1_700_000_000_000_000_000;

struct Harness {
    log: Arc<CallLog>,
    store: Arc<FakeStore>,
    issuer: Arc<FakeIssuer>,
    service: Arc<ShareService>,
}

fn harness_with(store: FakeStore, issuer: FakeIssuer, log: Arc<CallLog>) -> Harness {
    let store = Arc::new(store);
    let issuer = Arc::new(issuer);
    let service = Arc::new(ShareService::with_generator(
        store.clone(),
        issuer.clone(),
        VAULT_ADDR,
        SECRETS_PATH,
        SecretIdGenerator::with_clock(|| FROZEN_NANOS),
    ));
    Harness {
        log,
        store,
        issuer,
        service,
    }
}

fn harness() -> Harness {
    let log = Arc::new(CallLog::default());
    harness_with(FakeStore::new(log.clone()), FakeIssuer::new(log.clone()), log)
}

fn slash(command: &str, text: &str) -> SlashCommand {
    SlashCommand {
        command: command.to_string(),
        text: text.to_string(),
        response_url: "https://hooks.slack.com/commands/T1/1/abc".to_string(),
        user_id: "U1".to_string(),
        user_name: "alex".to_string(),
        channel_id: "C1".to_string(),
        team_id: "T1".to_string(),
    }
}

#[test]
fn test_ten_thousand_ids_are_distinct() {
    let generator = SecretIdGenerator::new();
    let ids: HashSet<String> = (0..10_000)
        .map(|_| generator.generate().to_string())
        .collect();
    assert_eq!(ids.len(), 10_000);
    assert!(ids.iter().all(|id| id.starts_with(SECRET_ID_PREFIX)));
}

#[tokio::test]
async fn test_empty_input_has_no_side_effects() {
    let h = harness();

    let err = h.service.share("").await.unwrap_err();
    assert!(matches!(err, ShareError::EmptyInput));

    let err = h.service.share("   ").await.unwrap_err();
    assert!(matches!(err, ShareError::EmptyInput));

    assert!(h.log.calls().is_empty());
}

#[tokio::test]
async fn test_store_happens_before_issue_with_same_id() {
    let h = harness();

    let descriptor = h.service.share("hunter2").await.unwrap();
    let id = descriptor.identifier.to_string();

    assert_eq!(
        h.log.calls(),
        vec![
            Call::Store {
                id: id.clone(),
                plaintext: "hunter2".to_string()
            },
            Call::Issue { id },
        ]
    );
}

#[tokio::test]
async fn test_end_to_end_descriptor() {
    let h = harness();

    let descriptor = h.service.share("password123").await.unwrap();

    assert_eq!(descriptor.identifier.as_str(), "secret-1700000000000000000");
    assert_eq!(descriptor.token, "tok-1");
    assert_eq!(
        descriptor.retrieval_url,
        "http://127.0.0.1:8200/v1/secrets/data/shared/secret-1700000000000000000?token=tok-1"
    );
    assert_eq!(
        h.store.secret_for("secret-1700000000000000000").as_deref(),
        Some("password123")
    );
    assert_eq!(
        h.issuer.bound_id("tok-1").as_deref(),
        Some("secret-1700000000000000000")
    );
}

#[tokio::test]
async fn test_concurrent_shares_do_not_leak() {
    let h = harness();

    let (a, b) = tokio::join!(h.service.share("alpha-secret"), h.service.share("beta-secret"));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_ne!(a.identifier, b.identifier);
    assert_ne!(a.token, b.token);

    for (descriptor, secret) in [(&a, "alpha-secret"), (&b, "beta-secret")] {
        let id = descriptor.identifier.as_str();
        assert!(descriptor
            .retrieval_url
            .ends_with(&format!("/{}?token={}", id, descriptor.token)));
        assert_eq!(h.store.secret_for(id).as_deref(), Some(secret));
        assert_eq!(h.issuer.bound_id(&descriptor.token).as_deref(), Some(id));
    }
}

#[tokio::test]
async fn test_store_failure_skips_issuer() {
    let log = Arc::new(CallLog::default());
    let h = harness_with(
        FakeStore::failing(log.clone()),
        FakeIssuer::new(log.clone()),
        log,
    );

    let err = h.service.share("password123").await.unwrap_err();

    assert!(matches!(err, ShareError::StoreFailed(_)));
    assert_eq!(h.log.store_calls(), 1);
    assert_eq!(h.log.issue_calls(), 0);
}

#[tokio::test]
async fn test_issuer_failure_leaves_secret_written() {
    let log = Arc::new(CallLog::default());
    let h = harness_with(
        FakeStore::new(log.clone()),
        FakeIssuer::failing(log.clone()),
        log,
    );

    let err = h.service.share("password123").await.unwrap_err();

    assert!(matches!(err, ShareError::IssuerFailed(_)));
    assert_eq!(h.log.store_calls(), 1);
    assert_eq!(h.log.issue_calls(), 1);
    // Not rolled back
    assert_eq!(
        h.store.secret_for("secret-1700000000000000000").as_deref(),
        Some("password123")
    );
}

#[tokio::test]
async fn test_handler_replies_with_curl_command() {
    let h = harness();
    let notifier = Arc::new(FakeNotifier::default());
    let handler = CommandHandler::new("/share", h.service.clone(), notifier.clone());

    handler.handle_share(slash("/share", "password123")).await;

    let sent = notifier.messages();
    assert_eq!(sent.len(), 1);
    let (destination, message) = &sent[0];
    assert_eq!(destination, "https://hooks.slack.com/commands/T1/1/abc");
    assert!(message.starts_with("Your secret has been securely shared and is valid for 1 hour:"));
    assert!(message.contains("--header \"X-Vault-Token: tok-1\""));
    assert!(message.contains(
        "http://127.0.0.1:8200/v1/secrets/data/shared/secret-1700000000000000000?token=tok-1"
    ));
    assert!(!message.contains("password123"));
}

#[tokio::test]
async fn test_handler_usage_message_for_empty_text() {
    let h = harness();
    let notifier = Arc::new(FakeNotifier::default());
    let handler = CommandHandler::new("/share", h.service.clone(), notifier.clone());

    handler.handle_share(slash("/share", "")).await;

    assert_eq!(
        notifier.messages()[0].1,
        "Please provide a secret to share. Usage: `/share <secret>`"
    );
    assert!(h.log.calls().is_empty());
}

#[tokio::test]
async fn test_handler_generic_messages_on_failure() {
    let log = Arc::new(CallLog::default());
    let failing_store = harness_with(
        FakeStore::failing(log.clone()),
        FakeIssuer::new(log.clone()),
        log,
    );
    let notifier = Arc::new(FakeNotifier::default());
    let handler = CommandHandler::new("/share", failing_store.service.clone(), notifier.clone());
    handler.handle_share(slash("/share", "password123")).await;
    assert_eq!(
        notifier.messages()[0].1,
        "Failed to store the secret. Please try again."
    );

    let log = Arc::new(CallLog::default());
    let failing_issuer = harness_with(
        FakeStore::new(log.clone()),
        FakeIssuer::failing(log.clone()),
        log,
    );
    let notifier = Arc::new(FakeNotifier::default());
    let handler = CommandHandler::new("/share", failing_issuer.service.clone(), notifier.clone());
    handler.handle_share(slash("/share", "password123")).await;
    assert_eq!(
        notifier.messages()[0].1,
        "Failed to create a secure access token. Please try again."
    );
}

#[tokio::test]
async fn test_notify_failure_does_not_undo_share() {
    let h = harness();
    let notifier = Arc::new(FakeNotifier {
        fail: true,
        ..Default::default()
    });
    let handler = CommandHandler::new("/share", h.service.clone(), notifier.clone());

    handler.handle_share(slash("/share", "password123")).await;

    assert_eq!(notifier.messages().len(), 1);
    assert_eq!(h.log.store_calls(), 1);
    assert_eq!(h.log.issue_calls(), 1);
}

#[tokio::test]
async fn test_dispatch_ignores_other_commands() {
    let h = harness();
    let notifier = Arc::new(FakeNotifier::default());
    let handler = Arc::new(CommandHandler::new("/share", h.service.clone(), notifier.clone()));

    assert!(handler.dispatch(slash("/deploy", "now")).is_none());

    let task = handler.dispatch(slash("/share", "password123")).unwrap();
    task.await.unwrap();
    assert_eq!(notifier.messages().len(), 1);
    assert!(h.log.calls().len() == 2);
}
