//! driftx CLI
//!
//! Command-line interface for driftx

use clap::{Parser, Subcommand};
use driftx_core::logging_facility::{self, Profile};
use driftx_engine::RunConfig;
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "driftx")]
#[command(about = "driftx - Change detection for exported tenant configuration", long_about = None)]
struct Cli {
    /// Configuration file (default: ./driftx.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output profile: development or production
    #[arg(long, global = true)]
    log_profile: Option<Profile>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compare two export generations and write a change log
    Diff(commands::diff::DiffArgs),
    /// Validate an export directory without diffing
    Check(commands::check::CheckArgs),
    /// Render a persisted change log as Markdown
    Summary(commands::summary::SummaryArgs),
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = RunConfig::from_environment(cli.config.as_deref())?;
    let profile = match cli.log_profile {
        Some(profile) => profile,
        None => config.log_profile()?.unwrap_or_default(),
    };
    logging_facility::init(profile);

    match cli.command {
        Commands::Diff(args) => commands::diff::execute(args, &config),
        Commands::Check(args) => commands::check::execute(args, &config),
        Commands::Summary(args) => commands::summary::execute(args, &config),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
