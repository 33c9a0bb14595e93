//! Implementation of the `payslip-intake run` command.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::commands::{build_ingestors, open_store};
use crate::cli::output::{list_table, output, truncate, CommandOutput};
use crate::domain::models::{Config, ServiceStatus};
use crate::infrastructure::DropZone;
use crate::services::{IngestionScheduler, SchedulerConfig};

#[derive(Args, Debug)]
pub struct RunArgs {}

#[derive(Debug, serde::Serialize)]
pub struct StatusOutput {
    #[serde(flatten)]
    pub status: ServiceStatus,
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["kind", "state", "processed", "rejected", "scans", "last error"]);
        for ingestor in &self.status.ingestors {
            table.add_row(vec![
                ingestor.kind.to_string(),
                ingestor.state.as_str().to_string(),
                ingestor.lifetime_processed.to_string(),
                ingestor.lifetime_rejected.to_string(),
                ingestor.scans_completed.to_string(),
                ingestor
                    .last_error
                    .as_deref()
                    .map(|e| truncate(e, 60))
                    .unwrap_or_else(|| "-".to_string()),
            ]);
        }
        format!("Scheduler {}\n{table}", self.status.overall.as_str())
    }
}

pub async fn execute(_args: RunArgs, config: &Config, json_mode: bool) -> Result<()> {
    DropZone::new(&config.intake.drop_dir)
        .ensure_layout()
        .await
        .context("Failed to create drop directory layout")?;

    let store = open_store(config).await?;
    let (roster, document) = build_ingestors(config, store)?;
    let scheduler = IngestionScheduler::new(roster, document, SchedulerConfig::from(&config.intake));

    scheduler.start().await;
    tracing::info!(drop_dir = %config.intake.drop_dir.display(), "watching drop directory, press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    tracing::info!("shutdown requested, waiting for in-flight scans");

    scheduler.stop().await;

    output(
        &StatusOutput {
            status: scheduler.status().await,
        },
        json_mode,
    );
    Ok(())
}
