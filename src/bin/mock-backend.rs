//! Standalone mock of the assistant backend, for local runs of the client.

use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use assistant_client::config::ObservabilityConfig;
use assistant_client::mock::{serve, MockStore};
use assistant_client::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "mock-backend")]
#[command(about = "In-memory mock of the assistant backend", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    bind: String,

    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit JSON logs
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&ObservabilityConfig {
        log_level: cli.log_level,
        json: cli.json,
    });

    let listener = TcpListener::bind(&cli.bind).await?;
    let shutdown = CancellationToken::new();

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl+C"),
        }
        trigger.cancel();
    });

    serve(listener, Arc::new(MockStore::new()), shutdown).await?;
    Ok(())
}
