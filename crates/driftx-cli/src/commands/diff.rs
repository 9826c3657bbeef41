//! Diff command

use clap::Args;
use driftx_core::changelog::summary_line;
use driftx_core::diff::PathPattern;
use driftx_core::snapshot::{Category, SnapshotProvider};
use driftx_engine::commands::changelog::ChangeLogOptions;
use driftx_engine::{apply_engine_command, EngineCommand, EngineCommandResult, RunConfig};
use driftx_store::{DirectoryProvider, GitRevisionProvider};
use std::path::{Component, Path, PathBuf};

#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Snapshot root of the current export (default: `[paths] exports`)
    #[arg(long)]
    pub current: Option<PathBuf>,

    /// Snapshot root of the previous export
    #[arg(long, conflicts_with = "previous_rev")]
    pub previous: Option<PathBuf>,

    /// Read the previous export from this git revision instead
    #[arg(long)]
    pub previous_rev: Option<String>,

    /// Git repository holding the export history (default: the current root)
    #[arg(long, requires = "previous_rev")]
    pub repo: Option<PathBuf>,

    /// Directory receiving change logs (default: `[paths] change_logs`)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Extra exclusion pattern, appended to the configured ones
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Pin the category set (repeatable); replaces `[diff] categories`
    #[arg(long = "category", value_name = "NAME")]
    pub category: Vec<String>,

    #[arg(long)]
    pub dry_run: bool,

    /// Print the full change log as JSON instead of the summary line
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: DiffArgs, config: &RunConfig) -> Result<(), Box<dyn std::error::Error>> {
    let current_root = args
        .current
        .clone()
        .or_else(|| config.paths.exports.clone())
        .ok_or("Must specify --current or set [paths] exports")?;

    let mut exclusions = config.exclusion_set()?;
    for pattern in &args.exclude {
        exclusions.push(PathPattern::parse(pattern)?);
    }

    let pinned_categories = if args.category.is_empty() {
        config.pinned_categories()
    } else {
        Some(
            args.category
                .iter()
                .map(|name| Category::from_dir_name(name))
                .collect(),
        )
    };

    let previous: Option<Box<dyn SnapshotProvider>> = match (&args.previous, &args.previous_rev) {
        (Some(dir), _) => Some(Box::new(DirectoryProvider::new(dir))),
        (None, Some(rev)) => Some(Box::new(git_provider(
            &current_root,
            args.repo.as_deref(),
            rev,
        )?)),
        (None, None) => None,
    };
    let current = DirectoryProvider::new(&current_root);

    let options = ChangeLogOptions {
        exclusions,
        pinned_categories,
        output_dir: args
            .output
            .clone()
            .unwrap_or_else(|| config.paths.change_logs.clone()),
        dry_run: args.dry_run,
        timestamp: None,
    };

    let result = apply_engine_command(EngineCommand::GenerateChangeLog {
        previous: previous.as_deref(),
        current: &current,
        options,
    })?;
    let EngineCommandResult::ChangeLog(run) = result else {
        return Err("unexpected engine result".into());
    };

    for warning in &run.warnings {
        eprintln!("warning: {}", warning);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run.change_log)?);
    } else {
        println!("{}", summary_line(&run.change_log));
    }

    match &run.written {
        Some(written) => eprintln!("Change log written to {}", written.history_path.display()),
        None => eprintln!("Dry run: no change log written"),
    }

    Ok(())
}

/// Provider for the previous export at `rev`. The export root's location
/// relative to `repo` becomes the provider's subdirectory.
fn git_provider(
    current_root: &Path,
    repo: Option<&Path>,
    rev: &str,
) -> Result<GitRevisionProvider, Box<dyn std::error::Error>> {
    let repo = repo.unwrap_or(current_root);
    let repo_abs = std::fs::canonicalize(repo)?;
    let root_abs = std::fs::canonicalize(current_root)?;

    let relative = root_abs.strip_prefix(&repo_abs).map_err(|_| {
        format!(
            "{} is not inside repository {}",
            current_root.display(),
            repo.display()
        )
    })?;
    let subdir = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => part.to_str(),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/");

    Ok(GitRevisionProvider::new(repo_abs, rev).with_subdir(subdir))
}
