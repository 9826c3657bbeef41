//! Change log persistence.
//!
//! Every run writes its log twice: an append-only history file named after
//! the run's timestamp (`changelog_YYYYMMDD_HHMMSS.json`) and `latest.json`,
//! replaced on each run. Both writes go through [`atomic_write`].

use crate::atomic::atomic_write;
use crate::errors::{io_error_at, write_error, Result};
use driftx_core::changelog::ChangeLog;
use driftx_core::errors::{ExError, ExErrorKind};
use driftx_core::{log_op_end, log_op_error, log_op_start};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// File name of the pointer record.
pub const LATEST_FILE_NAME: &str = "latest.json";

/// Where a change log was persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenChangeLog {
    pub history_path: PathBuf,
    pub latest_path: PathBuf,
}

/// Writes change logs into one directory.
#[derive(Debug, Clone)]
pub struct ChangeLogWriter {
    dir: PathBuf,
}

impl ChangeLogWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn latest_path(&self) -> PathBuf {
        self.dir.join(LATEST_FILE_NAME)
    }

    /// History file name for a log, without collision suffix.
    pub fn history_file_name(log: &ChangeLog) -> String {
        format!("changelog_{}.json", log.timestamp.format("%Y%m%d_%H%M%S"))
    }

    /// First history path not already taken: the plain name, then `_1`,
    /// `_2`, ... before the extension.
    fn next_history_path(&self, log: &ChangeLog) -> PathBuf {
        let stem = format!("changelog_{}", log.timestamp.format("%Y%m%d_%H%M%S"));
        let plain = self.dir.join(format!("{}.json", stem));
        if !plain.exists() {
            return plain;
        }
        (1u32..)
            .map(|n| self.dir.join(format!("{}_{}.json", stem, n)))
            .find(|candidate| !candidate.exists())
            .unwrap_or(plain)
    }

    /// Persist `log` as pretty-printed UTF-8 JSON (no BOM).
    ///
    /// # Errors
    ///
    /// `Write` (fatal) if either file cannot be written; the cause is kept
    /// as the error's source.
    pub fn write(&self, log: &ChangeLog) -> Result<WrittenChangeLog> {
        let start = Instant::now();
        log_op_start!("write_change_log", path = %self.dir.display());

        let result = self.write_inner(log);
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(written) => log_op_end!(
                "write_change_log",
                duration_ms = duration_ms,
                path = %written.history_path.display()
            ),
            Err(err) => log_op_error!("write_change_log", err.clone(), duration_ms = duration_ms),
        }
        result
    }

    fn write_inner(&self, log: &ChangeLog) -> Result<WrittenChangeLog> {
        let mut content = serde_json::to_vec_pretty(log).map_err(ExError::from)?;
        content.push(b'\n');

        if !self.dir.as_os_str().is_empty() {
            fs::create_dir_all(&self.dir)
                .map_err(|e| write_error(&self.dir, io_error_at("create_dir", &self.dir, e)))?;
        }

        let history_path = self.next_history_path(log);
        atomic_write(&history_path, &content).map_err(|e| write_error(&history_path, e))?;

        let latest_path = self.latest_path();
        atomic_write(&latest_path, &content).map_err(|e| write_error(&latest_path, e))?;

        Ok(WrittenChangeLog {
            history_path,
            latest_path,
        })
    }
}

/// Load a persisted change log.
///
/// # Errors
///
/// `NotFound` if the file is missing, `Io` if it cannot be read,
/// `Serialization` if it is not a change log.
pub fn read_change_log(path: &Path) -> Result<ChangeLog> {
    let bytes = fs::read(path).map_err(|e| io_error_at("read_change_log", path, e))?;
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
    serde_json::from_slice(bytes).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("read_change_log")
            .with_path(path.display().to_string())
            .with_message(e.to_string())
    })
}
