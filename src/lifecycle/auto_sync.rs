//! Periodic background sync.
//!
//! # Responsibilities
//! - Trigger a full sync every `interval_secs`
//! - Fetch and publish the resulting sync status

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::{AssistantApi, SyncStatus};
use crate::config::SyncConfig;
use crate::error::ClientResult;

pub struct AutoSync {
    api: AssistantApi,
    config: SyncConfig,
}

impl AutoSync {
    pub fn new(api: AssistantApi, config: SyncConfig) -> Self {
        Self { api, config }
    }

    /// Run until `shutdown` fires or the receiving side goes away.
    ///
    /// A failed round is logged and the loop keeps going.
    pub async fn run(self, updates: mpsc::UnboundedSender<SyncStatus>, shutdown: CancellationToken) {
        if !self.config.auto_sync_enabled {
            tracing::info!("Auto sync disabled");
            return;
        }

        // interval_at panics on a zero period.
        let secs = self.config.interval_secs.max(1);
        if secs != self.config.interval_secs {
            tracing::warn!(interval = self.config.interval_secs, "Auto sync interval raised to 1s");
        }
        let period = Duration::from_secs(secs);
        tracing::info!(interval = secs, "Auto sync starting");

        // In-flight calls are aborted on shutdown too.
        let api = self.api.with_cancellation(shutdown.child_token());
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Auto sync received shutdown signal, exiting loop");
                    break;
                }
                _ = ticker.tick() => {
                    match sync_once(&api, self.config.force).await {
                        Ok(status) => {
                            tracing::debug!(
                                sheets = status.sheets.len(),
                                docs = status.docs.len(),
                                "Auto sync round finished"
                            );
                            if updates.send(status).is_err() {
                                tracing::info!("Auto sync receiver dropped, exiting loop");
                                break;
                            }
                        }
                        Err(e) if shutdown.is_cancelled() => {
                            tracing::debug!(error = %e, "Auto sync round aborted by shutdown");
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, kind = ?e.kind(), "Auto sync round failed");
                        }
                    }
                }
            }
        }
    }
}

async fn sync_once(api: &AssistantApi, force: bool) -> ClientResult<SyncStatus> {
    let started = api.sync_all(force).await?;
    tracing::debug!(message = %started.message, "Sync triggered");
    api.get_sync_status().await
}
