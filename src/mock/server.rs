//! HTTP surface of the mock backend.
//!
//! # Responsibilities
//! - Route every assistant endpoint to the in-memory store
//! - Reject invalid input with the structured error body
//! - Propagate `x-request-id` and trace each request

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::api::{
    ChatExport, ChatRequest, ChatResponse, DocAction, DocExport, DocRequest, DocResponse,
    DueReminders, ExportFormat, ExportResponse, HealthReport, NewTask, PdfResponse,
    QueryExportRequest, QueryExportResponse, QueryRequest, QueryResponse, ReminderAction,
    ReminderRequest, ReminderResponse, SearchCriteria, SearchResponse, SheetDataResponse,
    SheetExport, SyncRequest, SyncResponse, SyncStatus, Task, TaskList, TaskPriority, TaskStatus,
    TaskUpdate, TabsSummary, TankCapacityRequest, TankCapacityResponse, UpcomingTasks,
};
use crate::mock::error::MockError;
use crate::mock::store::{MockStore, DEFAULT_SHEET_ID};
use crate::mock::{etp, query, sheets};

pub type MockState = Arc<MockStore>;

type MockResult<T> = Result<Json<T>, MockError>;

/// Build the router over `state`.
pub fn router(state: MockState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat))
        .route("/sync/all", post(sync_all))
        .route("/sync/sheets", post(sync_sheets))
        .route("/sync/docs", post(sync_docs))
        .route("/sync/status", get(sync_status))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/upcoming", get(upcoming_tasks))
        .route("/tasks/{id}", get(get_task).put(update_task).delete(delete_task))
        .route("/export/sheet", post(export_sheet))
        .route("/export/doc", post(export_doc))
        .route("/export/chat", post(export_chat))
        .route("/docs", post(docs))
        .route("/reminders", post(reminders))
        .route("/reminders/check", get(check_reminders))
        .route("/pdf", post(pdf))
        .route("/api/query", post(nl_query))
        .route("/api/sheet-data", get(sheet_data))
        .route("/api/search-data", post(search_data))
        .route("/api/tabs-summary", get(tabs_summary))
        .route("/api/export-query-results", post(export_query_results))
        .route("/api/etp-tank-capacity", post(etp_tank_capacity))
        .with_state(state)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Serve until `shutdown` fires.
pub async fn serve(
    listener: TcpListener,
    state: MockState,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Mock backend starting");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    tracing::info!("Mock backend stopped");
    Ok(())
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, MockError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(MockError::validation(field, format!("{} is required", field)));
    }
    Ok(value)
}

fn stamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

async fn health() -> Json<HealthReport> {
    let checks = BTreeMap::from([
        ("database".to_string(), Value::from("connected")),
        ("sync_service".to_string(), Value::from("available")),
    ]);
    Json(HealthReport {
        status: "healthy".to_string(),
        timestamp: Some(stamp()),
        checks,
    })
}

async fn chat(State(store): State<MockState>, Json(request): Json<ChatRequest>) -> MockResult<ChatResponse> {
    let message = required("message", &request.message)?;
    tracing::debug!(user_id = %request.user_id, "Chat message received");

    let answer = query::interpret(message, store.rows());
    let response = if answer.success {
        ChatResponse {
            response: answer.answer,
            kind: "query".to_string(),
        }
    } else {
        ChatResponse {
            response: "I can help with tasks, reminders, sheets and documents.".to_string(),
            kind: "text".to_string(),
        }
    };
    Ok(Json(response))
}

fn sync(store: &MockStore, sheets: bool, docs: bool, force: bool) -> Json<SyncResponse> {
    let synced = store.sync(sheets, docs, force);
    tracing::debug!(synced, force, "Mock sync finished");
    Json(SyncResponse {
        message: "Sync started in background".to_string(),
        force,
    })
}

async fn sync_all(State(store): State<MockState>, Json(request): Json<SyncRequest>) -> Json<SyncResponse> {
    sync(&store, true, true, request.force)
}

async fn sync_sheets(State(store): State<MockState>, Json(request): Json<SyncRequest>) -> Json<SyncResponse> {
    sync(&store, true, false, request.force)
}

async fn sync_docs(State(store): State<MockState>, Json(request): Json<SyncRequest>) -> Json<SyncResponse> {
    sync(&store, false, true, request.force)
}

async fn sync_status(State(store): State<MockState>) -> Json<SyncStatus> {
    Json(store.sync_status())
}

fn default_user() -> String {
    "default".to_string()
}

#[derive(Debug, Deserialize)]
struct UserQuery {
    #[serde(default = "default_user")]
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct TaskFilter {
    #[serde(default = "default_user")]
    user_id: String,
    status: Option<TaskStatus>,
    priority: Option<TaskPriority>,
}

#[derive(Debug, Deserialize)]
struct UpcomingQuery {
    #[serde(default = "default_user")]
    user_id: String,
    #[serde(default = "default_days")]
    days: u32,
}

fn default_days() -> u32 {
    7
}

async fn list_tasks(State(store): State<MockState>, Query(filter): Query<TaskFilter>) -> Json<TaskList> {
    let tasks = store.list_tasks(&filter.user_id, filter.status, filter.priority);
    Json(TaskList {
        total: tasks.len(),
        tasks,
    })
}

async fn create_task(
    State(store): State<MockState>,
    Query(user): Query<UserQuery>,
    Json(task): Json<NewTask>,
) -> MockResult<Task> {
    let task = store.create_task(&user.user_id, task)?;
    tracing::debug!(task_id = task.id, "Task created");
    Ok(Json(task))
}

async fn get_task(
    State(store): State<MockState>,
    Path(id): Path<u64>,
    Query(user): Query<UserQuery>,
) -> MockResult<Task> {
    Ok(Json(store.get_task(&user.user_id, id)?))
}

async fn update_task(
    State(store): State<MockState>,
    Path(id): Path<u64>,
    Query(user): Query<UserQuery>,
    Json(update): Json<TaskUpdate>,
) -> MockResult<Task> {
    Ok(Json(store.update_task(&user.user_id, id, update)?))
}

async fn delete_task(
    State(store): State<MockState>,
    Path(id): Path<u64>,
    Query(user): Query<UserQuery>,
) -> MockResult<Value> {
    store.delete_task(&user.user_id, id)?;
    Ok(Json(serde_json::json!({ "success": true })))
}

async fn upcoming_tasks(State(store): State<MockState>, Query(query): Query<UpcomingQuery>) -> Json<UpcomingTasks> {
    let tasks = store.upcoming_tasks(&query.user_id, query.days, Utc::now().naive_utc());
    Json(UpcomingTasks {
        tasks,
        days: query.days,
    })
}

fn sheet_url(sheet_id: &str) -> String {
    format!("https://docs.google.com/spreadsheets/d/{}/edit", sheet_id)
}

fn doc_url(doc_id: &str) -> String {
    format!("https://docs.google.com/document/d/{}/edit", doc_id)
}

async fn export_sheet(State(store): State<MockState>, Json(export): Json<SheetExport>) -> MockResult<ExportResponse> {
    required("sheet_name", &export.sheet_name)?;
    let sheet_id = export
        .sheet_id
        .unwrap_or_else(|| format!("sheet-export-{}", store.next_export_id()));
    Ok(Json(ExportResponse {
        success: true,
        sheet_url: Some(sheet_url(&sheet_id)),
        sheet_id: Some(sheet_id),
        tab_name: Some(export.tab_name),
        ..ExportResponse::default()
    }))
}

async fn export_doc(State(store): State<MockState>, Json(export): Json<DocExport>) -> MockResult<ExportResponse> {
    let content = required("content", &export.content)?;
    let name = required("doc_name", &export.doc_name)?;
    let doc_id = store.write_doc(export.doc_id.as_deref(), name, content, export.append)?;
    Ok(Json(ExportResponse {
        success: true,
        doc_url: Some(doc_url(&doc_id)),
        doc_id: Some(doc_id),
        ..ExportResponse::default()
    }))
}

async fn export_chat(State(store): State<MockState>, Json(export): Json<ChatExport>) -> MockResult<ExportResponse> {
    let conversation = required("conversation_id", &export.conversation_id)?;
    let name = export
        .name
        .unwrap_or_else(|| format!("Conversation {}", conversation));
    let response = match export.format {
        ExportFormat::Sheet => {
            let sheet_id = format!("sheet-export-{}", store.next_export_id());
            ExportResponse {
                success: true,
                sheet_url: Some(sheet_url(&sheet_id)),
                sheet_id: Some(sheet_id),
                tab_name: Some(name),
                ..ExportResponse::default()
            }
        }
        ExportFormat::Doc => {
            let doc_id = store.write_doc(None, &name, &format!("Conversation {}", conversation), false)?;
            ExportResponse {
                success: true,
                doc_url: Some(doc_url(&doc_id)),
                doc_id: Some(doc_id),
                ..ExportResponse::default()
            }
        }
    };
    Ok(Json(response))
}

async fn docs(State(store): State<MockState>, Json(request): Json<DocRequest>) -> MockResult<DocResponse> {
    let doc_id = || required("doc_id", request.doc_id.as_deref().unwrap_or_default());
    let response = match request.action {
        DocAction::List => DocResponse {
            docs: Some(store.list_docs()),
            ..DocResponse::default()
        },
        DocAction::Read => DocResponse {
            content: Some(store.doc(doc_id()?)?.content),
            ..DocResponse::default()
        },
        DocAction::Create => {
            let name = required("doc_name", request.doc_name.as_deref().unwrap_or_default())?;
            DocResponse {
                success: Some(true),
                doc: Some(store.create_doc(name)),
                ..DocResponse::default()
            }
        }
        DocAction::Summarize => {
            let doc = store.doc(doc_id()?)?;
            let summary = doc
                .content
                .split_terminator(['.', '\n'])
                .map(str::trim)
                .find(|s| !s.is_empty())
                .map(|s| format!("{}: {}.", doc.info.name, s))
                .unwrap_or_else(|| format!("{} is empty.", doc.info.name));
            DocResponse {
                summary: Some(summary),
                ..DocResponse::default()
            }
        }
    };
    Ok(Json(response))
}

async fn reminders(State(store): State<MockState>, Json(request): Json<ReminderRequest>) -> MockResult<ReminderResponse> {
    let response = match request.action {
        ReminderAction::Set => {
            let message = required("message", request.message.as_deref().unwrap_or_default())?;
            let datetime = required("datetime", request.datetime.as_deref().unwrap_or_default())?;
            ReminderResponse {
                success: Some(true),
                reminder: Some(store.set_reminder(message, datetime)),
                ..ReminderResponse::default()
            }
        }
        ReminderAction::List => ReminderResponse {
            reminders: Some(store.list_reminders()),
            ..ReminderResponse::default()
        },
        ReminderAction::Delete => {
            let id = request
                .reminder_id
                .ok_or_else(|| MockError::validation("reminder_id", "reminder_id is required"))?;
            store.delete_reminder(id)?;
            ReminderResponse {
                success: Some(true),
                ..ReminderResponse::default()
            }
        }
    };
    Ok(Json(response))
}

async fn check_reminders(State(store): State<MockState>) -> Json<DueReminders> {
    let due = store.take_due_reminders(Utc::now().naive_utc());
    Json(DueReminders {
        checked: due.len(),
        due,
    })
}

#[derive(Debug, Deserialize)]
struct PdfBody {
    action: Option<String>,
    #[serde(default)]
    pdf_url: String,
}

async fn pdf(Json(body): Json<PdfBody>) -> MockResult<PdfResponse> {
    let pdf_url = required("pdf_url", &body.pdf_url)?;
    Ok(Json(PdfResponse {
        message: "PDF feature coming soon".to_string(),
        action: body.action,
        pdf_url: pdf_url.to_string(),
    }))
}

async fn nl_query(State(store): State<MockState>, Json(request): Json<QueryRequest>) -> MockResult<QueryResponse> {
    let question = required("query", &request.query)?;
    let mut response = query::interpret(question, store.rows());
    response.sheet_id = Some(request.sheet_id.unwrap_or_else(|| DEFAULT_SHEET_ID.to_string()));
    tracing::debug!(
        query_type = %response.query_type,
        confidence = response.confidence,
        data_found = response.data_found,
        "Query interpreted"
    );
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct SheetDataQuery {
    tab_name: Option<String>,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    10
}

async fn sheet_data(State(store): State<MockState>, Query(query): Query<SheetDataQuery>) -> Json<SheetDataResponse> {
    Json(sheets::latest_rows(store.rows(), query.tab_name.as_deref(), query.limit))
}

async fn search_data(State(store): State<MockState>, Json(criteria): Json<SearchCriteria>) -> MockResult<SearchResponse> {
    if criteria.search_terms.iter().all(|t| t.trim().is_empty()) {
        return Err(MockError::validation("search_terms", "search_terms is required"));
    }
    Ok(Json(sheets::search(store.rows(), &criteria)))
}

async fn tabs_summary(State(store): State<MockState>) -> Json<TabsSummary> {
    Json(sheets::tabs_summary(store.rows()))
}

async fn export_query_results(
    State(store): State<MockState>,
    Json(request): Json<QueryExportRequest>,
) -> MockResult<QueryExportResponse> {
    required("query", &request.query)?;
    let tab_name = format!("Query Results {}", store.next_export_id());
    let rows_exported = sheets::exported_rows(&request.raw_data);
    Ok(Json(QueryExportResponse {
        success: true,
        sheet_url: Some(sheet_url(DEFAULT_SHEET_ID)),
        message: Some(format!("Exported {} rows to '{}'", rows_exported, tab_name)),
        tab_name: Some(tab_name),
        rows_exported,
        error: None,
    }))
}

async fn etp_tank_capacity(
    State(store): State<MockState>,
    Json(request): Json<TankCapacityRequest>,
) -> MockResult<TankCapacityResponse> {
    let date = required("date", &request.date)?;
    if !request.etp_inlet_tank_value.is_finite() || request.etp_inlet_tank_value < 0.0 {
        return Err(MockError::validation(
            "etp_inlet_tank_value",
            "etp_inlet_tank_value must be a non-negative number",
        ));
    }
    Ok(Json(etp::tank_capacity(date, request.etp_inlet_tank_value, store.rows())))
}
