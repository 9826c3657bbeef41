//! Engine-level action commands.

use crate::commands::changelog::{generate_change_log, ChangeLogOptions, ChangeLogRunResult};
use crate::commands::check::{check_generation, CheckReport};
use driftx_core::errors::Result;
use driftx_core::snapshot::SnapshotProvider;

/// Engine-level commands that read snapshot stores or write change logs.
pub enum EngineCommand<'a> {
    /// Diff two generations and persist the change log.
    GenerateChangeLog {
        /// `None` on the first run: everything current is added.
        previous: Option<&'a dyn SnapshotProvider>,
        current: &'a dyn SnapshotProvider,
        options: ChangeLogOptions,
    },
    /// Validate one snapshot store without diffing.
    CheckGeneration { provider: &'a dyn SnapshotProvider },
}

/// Result of applying an engine command.
#[derive(Debug, Clone)]
pub enum EngineCommandResult {
    ChangeLog(ChangeLogRunResult),
    Check(CheckReport),
}

/// Apply an engine command.
///
/// # Errors
///
/// Whatever fatal error the underlying command reports.
pub fn apply_engine_command(cmd: EngineCommand<'_>) -> Result<EngineCommandResult> {
    match cmd {
        EngineCommand::GenerateChangeLog {
            previous,
            current,
            options,
        } => generate_change_log(previous, current, options).map(EngineCommandResult::ChangeLog),
        EngineCommand::CheckGeneration { provider } => {
            check_generation(provider).map(EngineCommandResult::Check)
        }
    }
}
