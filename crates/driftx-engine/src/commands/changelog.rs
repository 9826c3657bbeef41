//! Change log generation.
//!
//! ## Pipeline (in order):
//! 1. List the previous generation (if any) and the current one
//! 2. Category compatibility check (hard stop, no writes)
//! 3. Load, reconcile and diff (per-file problems become warnings)
//! 4. Stamp the change set with the run timestamp
//! 5. dry_run short-circuit (no writes)
//! 6. Persist history file and `latest.json`

use chrono::{DateTime, Utc};
use driftx_core::changelog::{aggregate_with_categories, ChangeLog};
use driftx_core::diff::ExclusionSet;
use driftx_core::errors::Result;
use driftx_core::snapshot::{Category, SnapshotProvider};
use driftx_core::warning::Warning;
use driftx_core::{log_op_end, log_op_error, log_op_start};
use driftx_core_types::RunId;
use driftx_store::{ChangeLogWriter, WrittenChangeLog};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Instant;

/// Options for one change log run.
#[derive(Debug, Clone)]
pub struct ChangeLogOptions {
    pub exclusions: ExclusionSet,
    /// Category set both generations must fall within; `None` requires the
    /// two generations to agree with each other.
    pub pinned_categories: Option<BTreeSet<Category>>,
    /// Directory receiving the history file and `latest.json`
    pub output_dir: PathBuf,
    /// If true, compute the change log but write nothing.
    pub dry_run: bool,
    /// Run timestamp; the current time when `None`
    pub timestamp: Option<DateTime<Utc>>,
}

impl Default for ChangeLogOptions {
    fn default() -> Self {
        Self {
            exclusions: ExclusionSet::default_volatile(),
            pinned_categories: None,
            output_dir: PathBuf::from("change_logs"),
            dry_run: false,
            timestamp: None,
        }
    }
}

/// Result of a change log run.
#[derive(Debug, Clone)]
pub struct ChangeLogRunResult {
    pub run_id: RunId,
    pub change_log: ChangeLog,
    /// Per-entry problems, previous generation first
    pub warnings: Vec<Warning>,
    /// Where the log was written; `None` on dry run
    pub written: Option<WrittenChangeLog>,
}

/// Compare `previous` against `current` and persist the change log.
///
/// Without a previous generation every current object is reported as added.
///
/// # Errors
///
/// Fatal errors only: a provider failure, `IncompatibleGenerations`, or
/// `Write`. Per-file problems are returned as warnings.
pub fn generate_change_log(
    previous: Option<&dyn SnapshotProvider>,
    current: &dyn SnapshotProvider,
    options: ChangeLogOptions,
) -> Result<ChangeLogRunResult> {
    let start = Instant::now();
    let run_id = RunId::new();
    log_op_start!("generate_change_log", run_id = %run_id, dry_run = options.dry_run);

    let result = run(previous, current, &options, run_id.clone());
    let duration_ms = start.elapsed().as_millis() as u64;

    match &result {
        Ok(run) => log_op_end!(
            "generate_change_log",
            duration_ms = duration_ms,
            run_id = %run_id,
            added = run.change_log.added.len(),
            removed = run.change_log.removed.len(),
            modified = run.change_log.modified.len(),
            warnings = run.warnings.len()
        ),
        Err(err) => log_op_error!(
            "generate_change_log",
            err.clone(),
            duration_ms = duration_ms,
            run_id = %run_id
        ),
    }
    result
}

fn run(
    previous: Option<&dyn SnapshotProvider>,
    current: &dyn SnapshotProvider,
    options: &ChangeLogOptions,
    run_id: RunId,
) -> Result<ChangeLogRunResult> {
    let previous = previous.map(|p| p.list_snapshots()).transpose()?;
    let current = current.list_snapshots()?;

    let change_set = aggregate_with_categories(
        previous.as_ref(),
        &current,
        &options.exclusions,
        options.pinned_categories.as_ref(),
    )?;

    let timestamp = options.timestamp.unwrap_or_else(Utc::now);
    let (change_log, warnings) = change_set.into_change_log(timestamp);

    let written = if options.dry_run {
        None
    } else {
        let writer = ChangeLogWriter::new(&options.output_dir);
        Some(writer.write(&change_log)?)
    };

    Ok(ChangeLogRunResult {
        run_id,
        change_log,
        warnings,
        written,
    })
}
