//! End-to-end tests of the typed API against the in-process mock backend.

use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use assistant_client::api::{NewTask, SearchCriteria, TaskPriority, TaskStatus, TaskUpdate};
use assistant_client::http::RequestOptions;
use assistant_client::session::{self, ChatSession};
use assistant_client::{AutoSync, CallScope, ClientError, ErrorKind};

mod common;

#[tokio::test]
async fn test_blank_inputs_never_reach_the_network() {
    let (addr, log) = common::start_programmable_backend(|_| async { (200, "{}".into()) }).await;
    let api = common::api(&common::config(addr));

    let err = api.send_chat_message("   ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(api.process_natural_language_query("\n", None).await.is_err());
    assert!(api.read_doc("").await.is_err());
    assert!(api.create_task(&NewTask::new(" ")).await.is_err());
    assert!(api
        .search_sheet_data(&SearchCriteria::terms([" "]))
        .await
        .is_err());
    assert!(api.get_etp_tank_capacity("25.10.2025", -1.0, None).await.is_err());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(common::calls(&log), 0);
}

#[tokio::test]
async fn test_query_response_is_passed_through() {
    let body = json!({
        "success": true,
        "answer": "45",
        "query_type": "field_by_date",
        "confidence": 0.9,
        "data_found": 1,
        "supporting_data": [{
            "tab_name": "DAILY EXPENSES",
            "row_index": 2,
            "data": { "Date": "12.12.2025", "Amount": "45" }
        }],
        "suggestions": []
    })
    .to_string();
    let (addr, log) = common::start_programmable_backend(move |_| {
        let body = body.clone();
        async move { (200, body) }
    })
    .await;
    let api = common::api(&common::config(addr));

    let response = api
        .process_natural_language_query("What is the amount on 12.12.2025?", None)
        .await
        .unwrap();

    assert_eq!(response.answer, "45");
    assert_eq!(response.confidence, 0.9);
    assert_eq!(response.supporting_data[0].tab_name, "DAILY EXPENSES");

    let request = &common::recorded(&log)[0];
    assert_eq!(request.target, "/api/query");
    let sent: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(sent["query"], "What is the amount on 12.12.2025?");
}

#[tokio::test]
async fn test_mock_answers_field_by_date() {
    let (addr, shutdown) = common::start_mock_server().await;
    let api = common::api(&common::config(addr));

    let response = api
        .process_natural_language_query("What is the amount on 12.12.2025?", None)
        .await
        .unwrap();

    assert!(response.success);
    assert_eq!(response.answer, "45");
    assert_eq!(response.confidence, 0.9);
    assert_eq!(response.query_type, "field_by_date");
    shutdown.cancel();
}

#[tokio::test]
async fn test_unmatched_query_is_not_an_error() {
    let (addr, shutdown) = common::start_mock_server().await;
    let api = common::api(&common::config(addr));

    let response = api
        .process_natural_language_query("zzzz qqqq", None)
        .await
        .unwrap();

    assert!(!response.success);
    assert!(response.error.is_some());
    assert!(!response.suggestions.is_empty());
    shutdown.cancel();
}

#[tokio::test]
async fn test_server_side_validation_error() {
    let (addr, shutdown) = common::start_mock_server().await;
    let api = common::api(&common::config(addr));

    let err = api
        .client()
        .execute("/api/query", RequestOptions::post().json(&json!({ "query": "  " })).unwrap())
        .await
        .unwrap()
        .json::<serde_json::Value>()
        .unwrap_err();

    match err {
        ClientError::Http { status, code, message, .. } => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(code.as_deref(), Some("VALIDATION_ERROR"));
            assert_eq!(message, "query is required");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    shutdown.cancel();
}

#[tokio::test]
async fn test_sync_status_is_stable_without_sync() {
    let (addr, shutdown) = common::start_mock_server().await;
    let api = common::api(&common::config(addr));

    let first = api.get_sync_status().await.unwrap();
    let second = api.get_sync_status().await.unwrap();
    assert_eq!(first, second);
    assert!(!first.sheets.is_empty());

    let started = api.sync_all(true).await.unwrap();
    assert!(started.force);
    let after = api.get_sync_status().await.unwrap();
    assert!(after.sheets.iter().all(|s| s.sync_status == "synced"));
    assert!(after.docs.iter().all(|d| d.last_synced.is_some()));
    shutdown.cancel();
}

#[tokio::test]
async fn test_task_lifecycle() {
    let (addr, shutdown) = common::start_mock_server().await;
    let api = common::api(&common::config(addr));

    let created = api
        .create_task(&NewTask {
            title: "  Check RO 3 membranes ".into(),
            due_date: Some("2099-01-01".into()),
            priority: TaskPriority::High,
            ..NewTask::default()
        })
        .await
        .unwrap();
    assert_eq!(created.title, "Check RO 3 membranes");
    assert_eq!(created.status, TaskStatus::Pending);
    assert_eq!(created.user_id, "tester");

    let listed = api.list_tasks(None, Some(TaskPriority::High)).await.unwrap();
    assert_eq!(listed.total, 1);

    let done = api
        .update_task(
            created.id,
            &TaskUpdate {
                status: Some(TaskStatus::Completed),
                ..TaskUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(done.status, TaskStatus::Completed);
    assert!(done.completed_at.is_some());

    api.delete_task(created.id).await.unwrap();

    let err = api.get_task(created.id).await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
    assert_eq!(err.to_string(), format!("Task {} not found", created.id));
    shutdown.cancel();
}

#[tokio::test]
async fn test_tasks_are_scoped_to_user() {
    let (addr, shutdown) = common::start_mock_server().await;
    let config = common::config(addr);
    let api = common::api(&config);
    let mut other_config = config.clone();
    other_config.api.user_id = "someone-else".into();
    let other = common::api(&other_config);

    let task = api.create_task(&NewTask::new("Log feed TDS")).await.unwrap();

    assert!(other.get_task(task.id).await.is_err());
    assert_eq!(other.list_tasks(None, None).await.unwrap().total, 0);
    shutdown.cancel();
}

#[tokio::test]
async fn test_etp_tank_capacity() {
    let (addr, shutdown) = common::start_mock_server().await;
    let api = common::api(&common::config(addr));

    let response = api.get_etp_tank_capacity("25.10.2025", 40.0, None).await.unwrap();

    assert!(response.success);
    assert_eq!(response.totals.total_capacity, 316.0);
    assert_eq!(response.totals.total_storage, 187.5);
    assert_eq!(response.totals.total_balance, 128.5);
    shutdown.cancel();
}

#[tokio::test]
async fn test_sheet_browsing() {
    let (addr, shutdown) = common::start_mock_server().await;
    let api = common::api(&common::config(addr));

    let summary = api.get_tabs_summary().await.unwrap();
    assert!(summary.tab_names.iter().any(|t| t == "DAILY EXPENSES"));

    let data = api.get_sheet_data(Some("RO DETAILS"), 5).await.unwrap();
    assert!(data.success);
    assert!(data.data.iter().all(|t| t.tab_name == "RO DETAILS"));

    let found = api
        .search_sheet_data(&SearchCriteria::terms(["12.12.2025"]))
        .await
        .unwrap();
    assert!(found.results_count >= 1);

    let exported = api
        .export_query_results("amount on 12.12.2025", &json!([{ "Amount": "45" }]), "45")
        .await
        .unwrap();
    assert!(exported.success);
    assert_eq!(exported.rows_exported, 1);
    shutdown.cancel();
}

#[tokio::test]
async fn test_docs_roundtrip() {
    let (addr, shutdown) = common::start_mock_server().await;
    let api = common::api(&common::config(addr));

    let docs = api.list_docs().await.unwrap();
    let handbook = docs.iter().find(|d| d.name == "Operations Handbook").unwrap();

    let content = api.read_doc(&handbook.id).await.unwrap();
    assert!(content.starts_with("Daily checks"));

    let summary = api.summarize_doc(&handbook.id).await.unwrap();
    assert!(summary.starts_with("Operations Handbook:"));

    let created = api.create_doc("Shift Notes").await.unwrap();
    assert_eq!(created.name, "Shift Notes");
    assert_eq!(api.list_docs().await.unwrap().len(), docs.len() + 1);

    let err = api.read_doc("doc-missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Client);
    shutdown.cancel();
}

#[tokio::test]
async fn test_reminders_and_pdf() {
    let (addr, shutdown) = common::start_mock_server().await;
    let api = common::api(&common::config(addr));

    let reminder = api.set_reminder("Backwash filter", "2000-01-01 08:00").await.unwrap();
    assert_eq!(reminder.status, "active");
    assert_eq!(api.list_reminders().await.unwrap().len(), 1);

    let due = api.check_due_reminders().await.unwrap();
    assert_eq!(due.checked, 1);
    assert_eq!(due.due[0].id, reminder.id);
    assert_eq!(api.check_due_reminders().await.unwrap().checked, 0);

    api.delete_reminder(reminder.id).await.unwrap();
    let err = api.delete_reminder(reminder.id).await.unwrap_err();
    assert_eq!(err.to_string(), format!("Reminder {} not found", reminder.id));

    let pdf = api.summarize_pdf("https://example.com/manual.pdf").await.unwrap();
    assert_eq!(pdf.message, "PDF feature coming soon");
    shutdown.cancel();
}

#[tokio::test]
async fn test_health() {
    let (addr, shutdown) = common::start_mock_server().await;
    let api = common::api(&common::config(addr));

    let report = api.health().await.unwrap();
    assert!(report.is_healthy());
    assert!(report.checks.contains_key("database"));
    shutdown.cancel();
}

#[tokio::test]
async fn test_auto_sync_publishes_until_shutdown() {
    let (addr, server) = common::start_mock_server().await;
    let mut config = common::config(addr);
    config.sync.auto_sync_enabled = true;
    config.sync.interval_secs = 1;
    let api = common::api(&config);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let shutdown = CancellationToken::new();
    let task = tokio::spawn(AutoSync::new(api, config.sync.clone()).run(tx, shutdown.clone()));

    let status = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("auto sync should publish a status")
        .unwrap();
    assert!(status.sheets.iter().all(|s| s.sync_status == "synced"));

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("auto sync should stop on shutdown")
        .unwrap();
    server.cancel();
}

#[tokio::test]
async fn test_auto_sync_disabled_returns_immediately() {
    let (addr, log) = common::start_programmable_backend(|_| async { (200, "{}".into()) }).await;
    let config = common::config(addr);
    let api = common::api(&config);

    let (tx, _rx) = mpsc::unbounded_channel();
    tokio::time::timeout(
        Duration::from_millis(200),
        AutoSync::new(api, config.sync.clone()).run(tx, CancellationToken::new()),
    )
    .await
    .expect("disabled auto sync should return");
    assert_eq!(common::calls(&log), 0);
}

#[tokio::test]
async fn test_auto_sync_zero_interval_is_clamped() {
    let (addr, server) = common::start_mock_server().await;
    let mut config = common::config(addr);
    config.sync.auto_sync_enabled = true;
    config.sync.interval_secs = 0;
    let api = common::api(&config);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let shutdown = CancellationToken::new();
    let task = tokio::spawn(AutoSync::new(api, config.sync.clone()).run(tx, shutdown.clone()));

    let status = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("auto sync should publish a status")
        .expect("auto sync task should still be running");
    assert!(!status.sheets.is_empty());

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(1), task)
        .await
        .expect("auto sync should stop on shutdown")
        .expect("auto sync should not panic");
    server.cancel();
}

#[tokio::test]
async fn test_session_sync_records_status() {
    let (addr, server) = common::start_mock_server().await;
    let api = common::api(&common::config(addr));
    let scope = CallScope::new();
    let mut chat = ChatSession::new();

    let status = session::sync(&mut chat, &api, &scope, true).await.unwrap();

    assert!(!chat.is_syncing());
    assert_eq!(chat.sync_status(), Some(&status));
    assert!(status.sheets.iter().all(|s| s.sync_status == "synced"));
    assert!(chat.error().is_none());
    server.cancel();
}

#[tokio::test]
async fn test_session_sync_failure_raises_banner() {
    let addr = common::closed_port().await;
    let mut config = common::config(addr);
    config.retries.max_retries = 0;
    let api = common::api(&config);
    let scope = CallScope::new();
    let mut chat = ChatSession::new();

    let err = session::sync(&mut chat, &api, &scope, false).await.unwrap_err();

    assert!(!chat.is_syncing());
    assert!(chat.sync_status().is_none());
    assert_eq!(chat.error(), Some(err.user_message().as_str()));
}
