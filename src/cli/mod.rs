//! Command-line interface.

pub mod commands;
pub mod output;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;

use commands::examine::ExamineArgs;
use commands::init::InitArgs;
use commands::lookup::LookupArgs;
use commands::migrate::MigrateArgs;
use commands::run::RunArgs;
use commands::scan::ScanArgs;

#[derive(Parser)]
#[command(name = "payslip-intake")]
#[command(about = "Roster and payslip drop-directory ingestion", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file to load instead of .payslip-intake/config.yaml
    #[arg(short, long, global = true, env = "PAYSLIP_INTAKE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write default configuration, create the drop directory and database
    Init(InitArgs),
    /// Run both ingestion loops until Ctrl-C
    Run(RunArgs),
    /// Run a single scan pass and print what happened to each file
    Scan(ScanArgs),
    /// Look up an employee in the directory
    Lookup(LookupArgs),
    /// Describe the structure of a roster workbook
    Examine(ExamineArgs),
    /// Import a roster workbook using fuzzy column detection
    Migrate(MigrateArgs),
}

/// Load configuration from `path`, or from the project hierarchy when unset.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Print an error chain and exit with status 1.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({
            "success": false,
            "error": err.to_string(),
            "causes": causes,
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err}");
        for cause in err.chain().skip(1) {
            eprintln!("  caused by: {cause}");
        }
    }
    std::process::exit(1)
}
