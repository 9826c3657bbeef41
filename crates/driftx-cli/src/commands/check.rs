//! Check command

use clap::Args;
use driftx_engine::{apply_engine_command, EngineCommand, EngineCommandResult, RunConfig};
use driftx_store::DirectoryProvider;
use std::path::PathBuf;

/// Exit code when the store loads but some files were skipped.
const EXIT_WARNINGS: i32 = 2;

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Snapshot root to validate (default: `[paths] exports`)
    #[arg(long)]
    pub root: Option<PathBuf>,
}

pub fn execute(args: CheckArgs, config: &RunConfig) -> Result<(), Box<dyn std::error::Error>> {
    let root = args
        .root
        .or_else(|| config.paths.exports.clone())
        .ok_or("Must specify --root or set [paths] exports")?;
    let provider = DirectoryProvider::new(&root);

    let result = apply_engine_command(EngineCommand::CheckGeneration {
        provider: &provider,
    })?;
    let EngineCommandResult::Check(report) = result else {
        return Err("unexpected engine result".into());
    };

    for (category, count) in &report.counts {
        println!("{}: {}", category, count);
    }
    println!("total: {}", report.snapshot_count);

    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }

    if !report.is_clean() {
        eprintln!("{} file(s) skipped", report.warnings.len());
        std::process::exit(EXIT_WARNINGS);
    }
    Ok(())
}
