//! Snapshot provider over an export directory on disk.
//!
//! Layout: one subdirectory per category under the root, each holding
//! `*.json` files (nested directories are walked). Hidden entries and other
//! extensions are ignored. Files directly under the root are listed too, so
//! identity resolution can report them.

use crate::errors::{io_error, root_not_found, Result};
use driftx_core::snapshot::{Category, Generation, Payload, SnapshotFile, SnapshotProvider};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Lists a generation from a directory tree.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
    reference: Option<String>,
}

impl DirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            reference: None,
        }
    }

    /// Attach an opaque reference to the listed generation.
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn categories(&self) -> Result<BTreeSet<Category>> {
        let mut categories = BTreeSet::new();
        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| io_error("list_categories", e.into()))?;
            if entry.file_type().is_dir() && !is_hidden(&entry) {
                categories.insert(Category::from_dir_name(&entry.file_name().to_string_lossy()));
            }
        }
        Ok(categories)
    }

    fn files(&self) -> Vec<SnapshotFile> {
        let walker = WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(
                        op = "list_snapshots",
                        path = ?err.path(),
                        "skipping unreadable directory entry: {}",
                        err
                    );
                    continue;
                }
            };
            if entry.file_type().is_dir() || !is_json(entry.path()) {
                continue;
            }

            let relative_path = relative_path(&self.root, entry.path());
            let payload = match fs::read(entry.path()) {
                Ok(bytes) => Payload::Bytes(bytes),
                Err(err) => Payload::Unreadable(err.to_string()),
            };
            files.push(SnapshotFile::new(relative_path, payload));
        }
        files
    }
}

impl SnapshotProvider for DirectoryProvider {
    fn list_snapshots(&self) -> Result<Generation> {
        if !self.root.is_dir() {
            return Err(root_not_found(&self.root));
        }
        Ok(Generation {
            reference: self.reference.clone(),
            categories: self.categories()?,
            files: self.files(),
        })
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// `/`-separated path of `path` below `root`.
fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
