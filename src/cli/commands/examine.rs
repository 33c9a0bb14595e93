//! Implementation of the `payslip-intake examine` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::output::{list_table, output, truncate, CommandOutput};
use crate::services::roster_migrator::{examine, ExaminationReport};

#[derive(Args, Debug)]
pub struct ExamineArgs {
    /// Workbook to inspect
    pub file: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct ExamineOutput {
    #[serde(flatten)]
    pub report: ExaminationReport,
}

impl CommandOutput for ExamineOutput {
    fn to_human(&self) -> String {
        let report = &self.report;
        let mut lines = vec![
            format!("Workbook: {}", report.file.display()),
            format!("Sheets:   {}", report.sheet_names.join(", ")),
            format!("Reading:  {}", report.sheet_name),
            format!("Rows:     {} (excluding header)", report.data_rows),
            format!("\nHeaders ({} columns):", report.headers.len()),
        ];
        for (idx, header) in report.headers.iter().enumerate() {
            lines.push(format!("  {:>2}. {header}", idx + 1));
        }

        if !report.sample_rows.is_empty() {
            let headers: Vec<&str> = report.headers.iter().map(String::as_str).collect();
            let mut table = list_table(&headers);
            for row in &report.sample_rows {
                table.add_row(row.iter().map(|v| truncate(v, 24)).collect::<Vec<_>>());
            }
            lines.push(format!("\nSample rows:\n{table}"));
        }

        if !report.column_types.is_empty() {
            lines.push("\nColumn types (first data row):".to_string());
            for (header, kind) in &report.column_types {
                lines.push(format!("  {header}: {kind}"));
            }
        }

        lines.push("\nEmployee-related columns:".to_string());
        if report.employee_columns.is_empty() {
            lines.push("  (none)".to_string());
        }
        for column in &report.employee_columns {
            lines.push(format!("  - {column}"));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: ExamineArgs, json_mode: bool) -> Result<()> {
    let report = examine(&args.file)
        .await
        .with_context(|| format!("Failed to examine {}", args.file.display()))?;
    output(&ExamineOutput { report }, json_mode);
    Ok(())
}
