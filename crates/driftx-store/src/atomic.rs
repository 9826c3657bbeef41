//! Atomic write primitives
//!
//! Uses temp→rename so readers never observe a partial file

use crate::errors::{io_error, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Temp file used while writing `target_path`: same directory, `.tmp` appended
pub fn temp_path_for(target_path: &Path) -> PathBuf {
    let mut name = target_path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".tmp");
    target_path.with_file_name(name)
}

/// Atomically write bytes to a file
///
/// Creates the parent directory if needed. On failure the temp file is
/// removed and the target is left untouched.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| io_error("create_dir", e))?;
        }
    }

    let temp_path = temp_path_for(target_path);

    let result = fs::write(&temp_path, content)
        .map_err(|e| io_error("write_temp", e))
        .and_then(|_| fs::rename(&temp_path, target_path).map_err(|e| io_error("rename_temp", e)));

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}
