//! Implementation of the `payslip-intake migrate` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use crate::adapters::InMemoryDirectoryStore;
use crate::cli::commands::open_store;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::domain::ports::DirectoryStore;
use crate::services::{MigrationReport, RosterAnalysis, RosterMigrator};

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Roster workbook to import
    pub file: PathBuf,

    /// Extract and validate rows without writing to the database
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct MigrateOutput {
    pub dry_run: bool,
    pub analysis: RosterAnalysis,
    pub report: MigrationReport,
    pub success_rate: f64,
}

impl CommandOutput for MigrateOutput {
    fn to_human(&self) -> String {
        let mapping = &self.analysis.mapping;
        let column = |idx: Option<usize>| {
            idx.and_then(|i| self.analysis.headers.get(i))
                .map_or_else(|| "-".to_string(), |h| format!("'{h}'"))
        };
        [
            format!(
                "{} {}",
                if self.dry_run { "Dry run of" } else { "Migrated" },
                self.report.file.display()
            ),
            format!("Sheet:             {}", self.analysis.sheet_name),
            format!("Employee ID:       {}", column(mapping.employee_id)),
            format!("National ID:       {}", column(mapping.secondary_id)),
            format!("Name:              {}", column(mapping.name)),
            format!("Rows extracted:    {}", self.report.extracted),
            format!("Rows skipped:      {}", self.report.skipped_rows),
            format!("Stored:            {}", self.report.succeeded),
            format!("Failed:            {}", self.report.failed),
            format!("Success rate:      {:.1}%", self.success_rate),
        ]
        .join("\n")
    }
}

pub async fn execute(args: MigrateArgs, config: &Config, json_mode: bool) -> Result<()> {
    let analysis = RosterMigrator::analyze(&args.file)
        .await
        .with_context(|| format!("Failed to analyze {}", args.file.display()))?;

    let store: Arc<dyn DirectoryStore> = if args.dry_run {
        Arc::new(InMemoryDirectoryStore::new())
    } else {
        open_store(config).await?
    };

    let report = RosterMigrator::new(store)
        .migrate(&args.file)
        .await
        .with_context(|| format!("Failed to migrate {}", args.file.display()))?;

    let success_rate = report.success_rate();
    output(
        &MigrateOutput {
            dry_run: args.dry_run,
            analysis,
            report,
            success_rate,
        },
        json_mode,
    );
    Ok(())
}
