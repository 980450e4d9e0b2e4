//! Cancellation and call-scope teardown tests.

use std::time::{Duration, Instant};

use serde_json::json;
use tokio_util::sync::CancellationToken;

use assistant_client::http::{RequestClient, RequestOptions};
use assistant_client::session::{self, ChatSession, Role};
use assistant_client::{CallScope, ClientError, ErrorKind};

mod common;

async fn slow_backend(delay: Duration) -> (std::net::SocketAddr, common::Log) {
    common::start_programmable_backend(move |_| async move {
        tokio::time::sleep(delay).await;
        (200, json!({ "response": "late", "type": "text" }).to_string())
    })
    .await
}

#[tokio::test]
async fn test_cancel_in_flight_request() {
    let (addr, log) = slow_backend(Duration::from_secs(3)).await;
    let client = RequestClient::new(&common::config(addr)).unwrap();
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let err = client
        .execute("/health", RequestOptions::get().cancel_on(token))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Cancelled), "unexpected error: {:?}", err);
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(common::calls(&log), 1);
}

#[tokio::test]
async fn test_cancel_during_backoff_stops_retries() {
    let (addr, log) = common::start_programmable_backend(|_| async { (500, "{}".into()) }).await;
    let mut config = common::config(addr);
    config.retries.base_delay_ms = 1_000;
    let client = RequestClient::new(&config).unwrap();
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let err = client
        .execute("/sync/status", RequestOptions::get().cancel_on(token))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Cancelled), "unexpected error: {:?}", err);
    assert!(started.elapsed() < Duration::from_millis(900));

    tokio::time::sleep(Duration::from_millis(1_200)).await;
    assert_eq!(common::calls(&log), 1);
}

#[tokio::test]
async fn test_already_cancelled_token_sends_nothing() {
    let (addr, log) = slow_backend(Duration::ZERO).await;
    let client = RequestClient::new(&common::config(addr)).unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let err = client
        .execute("/health", RequestOptions::get().cancel_on(token))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Cancelled));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(common::calls(&log), 0);
}

#[tokio::test]
async fn test_dropping_scope_cancels_bound_calls() {
    let (addr, _log) = slow_backend(Duration::from_secs(3)).await;
    let api = common::api(&common::config(addr));
    let scope = CallScope::new();
    let bound = scope.bind(&api);

    let call = tokio::spawn(async move { bound.send_chat_message("status of RO 3?").await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    drop(scope);

    let err = tokio::time::timeout(Duration::from_secs(1), call)
        .await
        .expect("call should settle promptly")
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, ClientError::Cancelled));
}

#[tokio::test]
async fn test_closed_scope_discards_late_result() {
    let (addr, _log) = slow_backend(Duration::from_secs(3)).await;
    let api = common::api(&common::config(addr));
    let scope = CallScope::new();
    let mut chat = ChatSession::new();

    let (result, ()) = tokio::join!(
        session::send_message(&mut chat, &api, &scope, "hello"),
        async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            scope.close();
        }
    );

    assert!(matches!(result, Err(ClientError::Cancelled)));
    // Only the submission was recorded; the outcome was dropped.
    assert_eq!(chat.messages().len(), 1);
    assert_eq!(chat.messages()[0].role, Role::User);
    assert!(chat.error().is_none());
}

#[tokio::test]
async fn test_live_scope_applies_reply() {
    let (addr, _log) = slow_backend(Duration::ZERO).await;
    let api = common::api(&common::config(addr));
    let scope = CallScope::new();
    let mut chat = ChatSession::new();

    let reply = session::send_message(&mut chat, &api, &scope, "hello").await.unwrap();

    assert_eq!(reply.response, "late");
    assert_eq!(chat.messages().len(), 2);
    assert_eq!(chat.messages()[1].role, Role::Assistant);
    assert!(!chat.is_pending());
}

#[tokio::test]
async fn test_failed_exchange_raises_user_message() {
    let addr = common::closed_port().await;
    let mut config = common::config(addr);
    config.retries.max_retries = 0;
    let api = common::api(&config);
    let scope = CallScope::new();
    let mut chat = ChatSession::new();

    let err = session::send_message(&mut chat, &api, &scope, "hello").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(chat.error(), Some(err.user_message().as_str()));
    assert!(!chat.is_pending());
}

#[tokio::test]
async fn test_closed_scope_discards_late_sync() {
    let (addr, _log) = slow_backend(Duration::from_secs(3)).await;
    let api = common::api(&common::config(addr));
    let scope = CallScope::new();
    let mut chat = ChatSession::new();

    let (result, ()) = tokio::join!(session::sync(&mut chat, &api, &scope, false), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        scope.close();
    });

    assert!(matches!(result, Err(ClientError::Cancelled)));
    assert!(chat.sync_status().is_none());
    assert!(chat.error().is_none());
}
