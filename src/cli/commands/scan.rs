//! Implementation of the `payslip-intake scan` command.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use crate::cli::commands::{build_ingestors, open_store};
use crate::cli::output::{list_table, output, truncate, CommandOutput};
use crate::domain::models::{Config, ScanReport};
use crate::domain::ports::Ingestor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Roster,
    Document,
    All,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Which ingestor to run
    #[arg(short, long, value_enum, default_value_t = KindArg::All)]
    pub kind: KindArg,
}

#[derive(Debug, serde::Serialize)]
pub struct ScanOutput {
    pub reports: Vec<ScanReport>,
}

impl CommandOutput for ScanOutput {
    fn to_human(&self) -> String {
        let mut sections = Vec::new();
        for report in &self.reports {
            if report.is_empty() {
                sections.push(format!("No new {} files.", report.kind));
                continue;
            }

            let mut table = list_table(&["file", "outcome", "detail"]);
            for file in &report.files {
                table.add_row(vec![
                    file.name.clone(),
                    file.outcome.label().to_string(),
                    truncate(&file.outcome.detail(), 70),
                ]);
            }
            sections.push(format!(
                "{} scan: {} accepted, {} rejected, {} deferred, {} failed\n{table}",
                report.kind,
                report.accepted(),
                report.rejected(),
                report.deferred(),
                report.failed()
            ));
        }
        sections.join("\n\n")
    }
}

pub async fn execute(args: ScanArgs, config: &Config, json_mode: bool) -> Result<()> {
    let store = open_store(config).await?;
    let (roster, document) = build_ingestors(config, store)?;
    let roster: Arc<dyn Ingestor> = roster;
    let document: Arc<dyn Ingestor> = document;

    let selected = match args.kind {
        KindArg::Roster => vec![roster],
        KindArg::Document => vec![document],
        KindArg::All => vec![roster, document],
    };

    let mut reports = Vec::with_capacity(selected.len());
    for ingestor in selected {
        let report = ingestor
            .scan()
            .await
            .with_context(|| format!("{} scan failed", ingestor.kind()))?;
        reports.push(report);
    }

    output(&ScanOutput { reports }, json_mode);
    Ok(())
}
