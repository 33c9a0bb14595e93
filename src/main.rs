//! Payslip Intake CLI entry point.

use anyhow::Result;
use clap::Parser;

use payslip_intake::cli::{self, commands, Cli, Commands};
use payslip_intake::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        cli::handle_error(err, json);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli::load_config(cli.config.as_deref())?;
    let _logger = LoggerImpl::init(&config.logging)?;

    match cli.command {
        Commands::Init(args) => commands::init::execute(args, cli.config.as_deref(), &config, cli.json).await,
        Commands::Run(args) => commands::run::execute(args, &config, cli.json).await,
        Commands::Scan(args) => commands::scan::execute(args, &config, cli.json).await,
        Commands::Lookup(args) => commands::lookup::execute(args, &config, cli.json).await,
        Commands::Examine(args) => commands::examine::execute(args, cli.json).await,
        Commands::Migrate(args) => commands::migrate::execute(args, &config, cli.json).await,
    }
}
