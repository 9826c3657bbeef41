//! driftx Store - snapshot sources and change log persistence
//!
//! Provides:
//! - A snapshot provider over an export directory on disk
//! - A snapshot provider over an export directory at a git revision
//! - Atomic (temp + rename) writes
//! - The change log writer (timestamped history file plus `latest.json`)
//!   and reader

pub mod atomic;
pub mod changelog_writer;
pub mod directory;
pub mod errors;
pub mod git;

// Re-export key types
pub use changelog_writer::{read_change_log, ChangeLogWriter, WrittenChangeLog, LATEST_FILE_NAME};
pub use directory::DirectoryProvider;
pub use errors::Result;
pub use git::GitRevisionProvider;
