//! Error handling for driftx-store
//!
//! Wraps driftx-core ExError with store-specific helpers

use driftx_core::errors::{ExError, ExErrorKind};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an IO error that names the file involved
pub fn io_error_at(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    let kind = if err.kind() == std::io::ErrorKind::NotFound {
        ExErrorKind::NotFound
    } else {
        ExErrorKind::Io
    };
    ExError::new(kind)
        .with_op(operation.to_string())
        .with_path(path.display().to_string())
        .with_message(err.to_string())
}

/// Create a missing snapshot root error
pub fn root_not_found(path: &Path) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op("list_snapshots")
        .with_path(path.display().to_string())
        .with_message("snapshot root does not exist or is not a directory")
}

/// Create a git invocation error
pub fn git_error(command: &str, detail: &str) -> ExError {
    ExError::new(ExErrorKind::ExternalService)
        .with_op("git")
        .with_message(format!("`git {}` failed: {}", command, detail))
}

/// Wrap a failure to persist a change log file
pub fn write_error(path: &Path, source: ExError) -> ExError {
    ExError::new(ExErrorKind::Write)
        .with_op("write_change_log")
        .with_path(path.display().to_string())
        .with_message("could not persist change log")
        .with_source(source)
}
