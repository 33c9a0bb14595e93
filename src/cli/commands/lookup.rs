//! Implementation of the `payslip-intake lookup` command.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::commands::open_store;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, EmployeeRecord};
use crate::domain::ports::DirectoryStore;

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Employee id, or secondary id with --secondary
    pub id: String,

    /// Treat the argument as a secondary (national) id
    #[arg(short, long)]
    pub secondary: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct LookupOutput {
    #[serde(flatten)]
    pub record: EmployeeRecord,
}

impl CommandOutput for LookupOutput {
    fn to_human(&self) -> String {
        let identity = &self.record.identity;
        let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
        [
            "\nEmployee Details:".to_string(),
            "─────────────────────────────────────────".to_string(),
            format!("Employee ID:  {}", identity.employee_id),
            format!("National ID:  {}", identity.secondary_id),
            format!("Name:         {}", identity.display_name),
            format!("Department:   {}", optional(&identity.department)),
            format!("Position:     {}", optional(&identity.title)),
            format!("Created at:   {}", self.record.created_at.format("%Y-%m-%d %H:%M:%S UTC")),
            format!("Updated at:   {}", self.record.updated_at.format("%Y-%m-%d %H:%M:%S UTC")),
        ]
        .join("\n")
    }
}

pub async fn execute(args: LookupArgs, config: &Config, json_mode: bool) -> Result<()> {
    let store = open_store(config).await?;

    let record = if args.secondary {
        store.lookup_by_secondary_id(&args.id).await
    } else {
        store.lookup(&args.id).await
    }
    .context("Failed to query directory")?
    .ok_or_else(|| {
        anyhow::anyhow!(
            "Employee not found: {}{}",
            args.id,
            if args.secondary { " (secondary id)" } else { "" }
        )
    })?;

    output(&LookupOutput { record }, json_mode);
    Ok(())
}
