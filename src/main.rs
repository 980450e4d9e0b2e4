//! Command-line client for the assistant backend.
//!
//! # Architecture Overview
//!
//! ```text
//!   argv ──▶ clap ──▶ ClientConfig (file / env / flags)
//!                          │
//!                          ▼
//!                    AssistantApi ──▶ RequestClient ──▶ backend
//!                          │           (timeout, retry, cancel)
//!                          ▼
//!                 JSON on stdout, user-facing error on stderr
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use assistant_client::api::{
    ChatExport, DocExport, ExportFormat, NewTask, SearchCriteria, SheetExport, TaskPriority,
    TaskStatus, TaskUpdate,
};
use assistant_client::config::validation::validate_config;
use assistant_client::config::{from_env, load_config, ConfigError};
use assistant_client::observability::logging::init_logging;
use assistant_client::session::{send_message, ChatSession};
use assistant_client::{AssistantApi, AutoSync, CallScope, ClientConfig, ClientError, ClientResult};

#[derive(Parser)]
#[command(name = "assistant-client")]
#[command(about = "Command-line client for the assistant backend", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config and ASSISTANT_API_URL)
    #[arg(short, long)]
    url: Option<String>,

    /// User the calls are made for
    #[arg(long)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a chat message
    Chat {
        message: String,
        #[arg(long)]
        sheet_id: Option<String>,
        #[arg(long)]
        doc_id: Option<String>,
    },
    /// Trigger a sync
    Sync {
        #[arg(value_enum, default_value_t = SyncTarget::All)]
        target: SyncTarget,
        #[arg(long)]
        force: bool,
    },
    /// Show last-sync metadata
    Status,
    /// Manage tasks
    Tasks {
        #[command(subcommand)]
        command: TaskCommand,
    },
    /// Ask a question about the synced sheets
    Query {
        question: String,
        #[arg(long)]
        sheet_id: Option<String>,
    },
    /// Latest row of each tab
    SheetData {
        #[arg(long)]
        tab: Option<String>,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Search sheet rows for any of the terms
    Search {
        #[arg(required = true)]
        terms: Vec<String>,
        #[arg(long)]
        tab: Vec<String>,
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Summarize the synced tabs
    Tabs,
    /// ETP tank capacity for a day
    Tank {
        date: String,
        /// ETP inlet tank storage in KL
        inlet: f64,
        #[arg(long)]
        sheet_id: Option<String>,
    },
    /// Google Docs operations
    Docs {
        #[command(subcommand)]
        command: DocCommand,
    },
    /// Export data to Sheets or Docs
    Export {
        #[command(subcommand)]
        command: ExportCommand,
    },
    /// Manage reminders
    Reminders {
        #[command(subcommand)]
        command: ReminderCommand,
    },
    /// Summarize a PDF
    Pdf { url: String },
    /// Backend health
    Health,
    /// Sync periodically and print each status until interrupted
    Watch {
        /// Seconds between rounds (defaults to sync.interval_secs)
        #[arg(long)]
        interval: Option<u64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SyncTarget {
    All,
    Sheets,
    Docs,
}

#[derive(Subcommand)]
enum TaskCommand {
    Add {
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// YYYY-MM-DD or "YYYY-MM-DD HH:MM"
        #[arg(long)]
        due: Option<String>,
        #[arg(long, value_parser = parse_wire::<TaskPriority>)]
        priority: Option<TaskPriority>,
    },
    List {
        #[arg(long, value_parser = parse_wire::<TaskStatus>)]
        status: Option<TaskStatus>,
        #[arg(long, value_parser = parse_wire::<TaskPriority>)]
        priority: Option<TaskPriority>,
    },
    Show {
        id: u64,
    },
    Update {
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = parse_wire::<TaskStatus>)]
        status: Option<TaskStatus>,
        #[arg(long, value_parser = parse_wire::<TaskPriority>)]
        priority: Option<TaskPriority>,
        #[arg(long)]
        due: Option<String>,
    },
    Done {
        id: u64,
    },
    Delete {
        id: u64,
    },
    Upcoming {
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
}

#[derive(Subcommand)]
enum DocCommand {
    List,
    Read { doc_id: String },
    Create { name: String },
    Summarize { doc_id: String },
}

#[derive(Subcommand)]
enum ExportCommand {
    Sheet {
        name: String,
        /// JSON rows, object or string
        data: String,
        #[arg(long, default_value = "Sheet1")]
        tab: String,
        #[arg(long)]
        sheet_id: Option<String>,
        #[arg(long)]
        append: bool,
    },
    Doc {
        name: String,
        content: String,
        #[arg(long)]
        doc_id: Option<String>,
        /// Overwrite instead of appending
        #[arg(long)]
        replace: bool,
    },
    Chat {
        conversation_id: String,
        #[arg(long, value_parser = parse_wire::<ExportFormat>, default_value = "sheet")]
        format: ExportFormat,
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Subcommand)]
enum ReminderCommand {
    Set {
        message: String,
        /// "YYYY-MM-DD HH:MM"
        datetime: String,
    },
    List,
    Delete {
        id: u64,
    },
    /// Mark due reminders as sent
    Check,
}

/// Parse a lowercase wire name into one of the API enums.
fn parse_wire<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(value.to_ascii_lowercase()))
        .map_err(|_| format!("unrecognised value '{}'", value))
}

fn load(cli: &Cli) -> Result<ClientConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => from_env()?,
    };
    if let Some(url) = &cli.url {
        config.api.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(user) = &cli.user {
        config.api.user_id = user.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn print_json<T: Serialize>(value: &T) -> ClientResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };
    init_logging(&config.observability);

    tracing::debug!(
        base_url = %config.api.base_url,
        timeout_ms = config.timeouts.request_ms,
        max_retries = config.retries.max_retries,
        "Configuration loaded"
    );

    let api = match AssistantApi::from_config(&config) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    match run(cli.command, &api, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, kind = ?e.kind(), "Command failed");
            eprintln!("Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, api: &AssistantApi, config: &ClientConfig) -> ClientResult<()> {
    match command {
        Commands::Chat {
            message,
            sheet_id,
            doc_id,
        } => {
            if sheet_id.is_some() || doc_id.is_some() {
                let reply = api
                    .send_chat_message_with_context(&message, sheet_id.as_deref(), doc_id.as_deref())
                    .await?;
                return print_json(&reply);
            }
            // Ctrl-C drops the scope, which aborts the in-flight call.
            let scope = CallScope::new();
            let mut session = ChatSession::new();
            let reply = tokio::select! {
                reply = send_message(&mut session, api, &scope, &message) => reply?,
                _ = tokio::signal::ctrl_c() => return Err(ClientError::Cancelled),
            };
            print_json(&reply)
        }
        Commands::Sync { target, force } => {
            let response = match target {
                SyncTarget::All => api.sync_all(force).await?,
                SyncTarget::Sheets => api.sync_sheets(force).await?,
                SyncTarget::Docs => api.sync_docs(force).await?,
            };
            print_json(&response)
        }
        Commands::Status => print_json(&api.get_sync_status().await?),
        Commands::Tasks { command } => run_tasks(command, api).await,
        Commands::Query { question, sheet_id } => {
            print_json(&api.process_natural_language_query(&question, sheet_id.as_deref()).await?)
        }
        Commands::SheetData { tab, limit } => {
            print_json(&api.get_sheet_data(tab.as_deref(), limit).await?)
        }
        Commands::Search { terms, tab, limit } => {
            let criteria = SearchCriteria {
                search_terms: terms,
                tab_names: tab,
                limit,
            };
            print_json(&api.search_sheet_data(&criteria).await?)
        }
        Commands::Tabs => print_json(&api.get_tabs_summary().await?),
        Commands::Tank {
            date,
            inlet,
            sheet_id,
        } => print_json(&api.get_etp_tank_capacity(&date, inlet, sheet_id.as_deref()).await?),
        Commands::Docs { command } => match command {
            DocCommand::List => print_json(&api.list_docs().await?),
            DocCommand::Read { doc_id } => print_json(&api.read_doc(&doc_id).await?),
            DocCommand::Create { name } => print_json(&api.create_doc(&name).await?),
            DocCommand::Summarize { doc_id } => print_json(&api.summarize_doc(&doc_id).await?),
        },
        Commands::Export { command } => run_export(command, api).await,
        Commands::Reminders { command } => match command {
            ReminderCommand::Set { message, datetime } => {
                print_json(&api.set_reminder(&message, &datetime).await?)
            }
            ReminderCommand::List => print_json(&api.list_reminders().await?),
            ReminderCommand::Delete { id } => {
                api.delete_reminder(id).await?;
                print_json(&serde_json::json!({ "success": true }))
            }
            ReminderCommand::Check => print_json(&api.check_due_reminders().await?),
        },
        Commands::Pdf { url } => print_json(&api.summarize_pdf(&url).await?),
        Commands::Health => print_json(&api.health().await?),
        Commands::Watch { interval } => watch(api, config, interval).await,
    }
}

async fn run_tasks(command: TaskCommand, api: &AssistantApi) -> ClientResult<()> {
    match command {
        TaskCommand::Add {
            title,
            description,
            due,
            priority,
        } => {
            let task = NewTask {
                title,
                description,
                due_date: due,
                priority: priority.unwrap_or_default(),
            };
            print_json(&api.create_task(&task).await?)
        }
        TaskCommand::List { status, priority } => {
            print_json(&api.list_tasks(status, priority).await?)
        }
        TaskCommand::Show { id } => print_json(&api.get_task(id).await?),
        TaskCommand::Update {
            id,
            title,
            description,
            status,
            priority,
            due,
        } => {
            let update = TaskUpdate {
                title,
                description,
                status,
                priority,
                due_date: due,
            };
            print_json(&api.update_task(id, &update).await?)
        }
        TaskCommand::Done { id } => {
            let update = TaskUpdate {
                status: Some(TaskStatus::Completed),
                ..TaskUpdate::default()
            };
            print_json(&api.update_task(id, &update).await?)
        }
        TaskCommand::Delete { id } => {
            api.delete_task(id).await?;
            print_json(&serde_json::json!({ "success": true }))
        }
        TaskCommand::Upcoming { days } => print_json(&api.get_upcoming_tasks(days).await?),
    }
}

async fn run_export(command: ExportCommand, api: &AssistantApi) -> ClientResult<()> {
    match command {
        ExportCommand::Sheet {
            name,
            data,
            tab,
            sheet_id,
            append,
        } => {
            // Plain text is exported as a single cell.
            let data = serde_json::from_str(&data).unwrap_or(serde_json::Value::String(data));
            let export = SheetExport {
                data,
                sheet_name: name,
                tab_name: tab,
                sheet_id,
                append,
            };
            print_json(&api.export_to_sheet(&export).await?)
        }
        ExportCommand::Doc {
            name,
            content,
            doc_id,
            replace,
        } => {
            let export = DocExport {
                content,
                doc_name: name,
                doc_id,
                append: !replace,
            };
            print_json(&api.export_to_doc(&export).await?)
        }
        ExportCommand::Chat {
            conversation_id,
            format,
            name,
        } => {
            let export = ChatExport {
                conversation_id,
                format,
                name,
            };
            print_json(&api.export_chat(&export).await?)
        }
    }
}

async fn watch(api: &AssistantApi, config: &ClientConfig, interval: Option<u64>) -> ClientResult<()> {
    let mut sync = config.sync.clone();
    sync.auto_sync_enabled = true;
    if let Some(secs) = interval.filter(|s| *s > 0) {
        sync.interval_secs = secs;
    }

    let shutdown = CancellationToken::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(AutoSync::new(api.clone(), sync).run(tx, shutdown.clone()));

    loop {
        tokio::select! {
            status = rx.recv() => match status {
                Some(status) => print_json(&status)?,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping auto sync");
                break;
            }
        }
    }

    shutdown.cancel();
    if let Err(e) = task.await {
        tracing::warn!(error = %e, "Auto sync task ended abnormally");
    }
    Ok(())
}
