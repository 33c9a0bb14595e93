//! Implementation of the `payslip-intake init` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tokio::fs;

use crate::cli::commands::open_store;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, Destination};
use crate::domain::ports::DirectoryStore;
use crate::infrastructure::config::CONFIG_DIR;
use crate::infrastructure::DropZone;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file with defaults
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_path: PathBuf,
    pub config_written: bool,
    pub directories_created: Vec<String>,
    pub database_path: String,
    pub employees: u64,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.config_written {
            lines.push(format!("\nWrote default configuration to {}", self.config_path.display()));
        }
        if !self.directories_created.is_empty() {
            lines.push("\nCreated directories:".to_string());
            for dir in &self.directories_created {
                lines.push(format!("  - {dir}"));
            }
        }
        if self.success {
            lines.push(format!(
                "\nDatabase ready at {} ({} employees)",
                self.database_path, self.employees
            ));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: InitArgs, config_path: Option<&Path>, config: &Config, json_mode: bool) -> Result<()> {
    let config_path = config_path.map_or_else(|| Path::new(CONFIG_DIR).join("config.yaml"), Path::to_path_buf);

    if config_path.exists() && !args.force {
        let output_data = InitOutput {
            success: false,
            message: "Project already initialized. Use --force to rewrite the configuration.".to_string(),
            config_path,
            config_written: false,
            directories_created: vec![],
            database_path: config.database.path.clone(),
            employees: 0,
        };
        output(&output_data, json_mode);
        return Ok(());
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let yaml = serde_yaml::to_string(&Config::default()).context("Failed to serialize default configuration")?;
    fs::write(&config_path, yaml)
        .await
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let drop_zone = DropZone::new(&config.intake.drop_dir);
    let wanted = [
        drop_zone.root().to_path_buf(),
        drop_zone.destination_dir(Destination::Processed),
        drop_zone.destination_dir(Destination::Invalid),
    ];
    let directories_created = wanted
        .iter()
        .filter(|dir| !dir.exists())
        .map(|dir| dir.display().to_string())
        .collect();
    drop_zone
        .ensure_layout()
        .await
        .context("Failed to create drop directory layout")?;

    let store = open_store(config).await?;
    let employees = store.count().await.context("Failed to count employees")?;

    let output_data = InitOutput {
        success: true,
        message: if args.force {
            "Project reinitialized successfully.".to_string()
        } else {
            "Project initialized successfully.".to_string()
        },
        config_path,
        config_written: true,
        directories_created,
        database_path: config.database.path.clone(),
        employees,
    };

    output(&output_data, json_mode);
    Ok(())
}
