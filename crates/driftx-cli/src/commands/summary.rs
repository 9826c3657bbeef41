//! Summary command

use clap::Args;
use driftx_core::changelog::render_human_summary;
use driftx_engine::RunConfig;
use driftx_store::{read_change_log, LATEST_FILE_NAME};
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Change log file to render
    #[arg(long, conflicts_with = "output")]
    pub file: Option<PathBuf>,

    /// Change log directory; renders its `latest.json`
    #[arg(long)]
    pub output: Option<PathBuf>,
}

pub fn execute(args: SummaryArgs, config: &RunConfig) -> Result<(), Box<dyn std::error::Error>> {
    let path = match args.file {
        Some(file) => file,
        None => args
            .output
            .unwrap_or_else(|| config.paths.change_logs.clone())
            .join(LATEST_FILE_NAME),
    };

    let log = read_change_log(&path)?;
    print!("{}", render_human_summary(&log));
    Ok(())
}
