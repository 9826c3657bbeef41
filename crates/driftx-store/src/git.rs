//! Snapshot provider over an export directory as it existed at a git
//! revision.
//!
//! The exporter commits each generation, so the previous generation is the
//! export directory at an earlier commit. Trees are listed with
//! `git ls-tree` and blobs read with `git cat-file`; the resolved commit id
//! becomes the generation reference.
//!
//! `<commit>:<path>` always resolves from the repository top level, so the
//! snapshot root is rebased onto it (`git rev-parse --show-prefix`) before
//! either call sees it.

use crate::errors::{git_error, Result};
use driftx_core::snapshot::{Category, Generation, Payload, SnapshotFile, SnapshotProvider};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Lists a generation from a git revision.
#[derive(Debug, Clone)]
pub struct GitRevisionProvider {
    repo: PathBuf,
    revision: String,
    subdir: Option<String>,
}

impl GitRevisionProvider {
    /// `repo` is any directory inside the work tree; `revision` anything
    /// `git rev-parse` accepts (`HEAD~1`, a tag, a commit id).
    pub fn new(repo: impl Into<PathBuf>, revision: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            revision: revision.into(),
            subdir: None,
        }
    }

    /// Snapshot root, relative to `repo`.
    pub fn with_subdir(mut self, subdir: impl Into<String>) -> Self {
        let subdir = subdir.into();
        let trimmed = subdir.trim_matches('/').to_string();
        self.subdir = if trimmed.is_empty() || trimmed == "." {
            None
        } else {
            Some(trimmed)
        };
        self
    }

    /// Resolve the revision to a full commit id.
    ///
    /// # Errors
    ///
    /// `ExternalService` if git is missing or the revision does not name a
    /// commit.
    pub fn resolve_commit(&self) -> Result<String> {
        let spec = format!("{}^{{commit}}", self.revision);
        let out = self.git(&["rev-parse", "--verify", "--quiet", &spec])?;
        let commit = String::from_utf8_lossy(&out).trim().to_string();
        if commit.is_empty() {
            return Err(git_error(
                "rev-parse",
                &format!("revision `{}` is not a commit", self.revision),
            ));
        }
        Ok(commit)
    }

    /// Snapshot root relative to the repository top level; empty for the
    /// top level itself.
    fn root_path(&self) -> Result<String> {
        let out = self.git(&["rev-parse", "--show-prefix"])?;
        let prefix = String::from_utf8_lossy(&out).trim().to_string();
        Ok(join_root(&prefix, self.subdir.as_deref()))
    }

    fn git(&self, args: &[&str]) -> Result<Vec<u8>> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo)
            .args(args)
            .output()
            .map_err(|e| git_error(&args.join(" "), &e.to_string()))?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
            let detail = match output.status.code() {
                Some(code) if stderr.is_empty() => format!("exit code {}", code),
                _ => stderr,
            };
            Err(git_error(&args.join(" "), &detail))
        }
    }

    fn list_names(&self, args: &[&str]) -> Result<Vec<String>> {
        let out = self.git(args)?;
        Ok(out
            .split(|b| *b == 0)
            .filter(|name| !name.is_empty())
            .map(|name| String::from_utf8_lossy(name).into_owned())
            .collect())
    }
}

impl SnapshotProvider for GitRevisionProvider {
    fn list_snapshots(&self) -> Result<Generation> {
        let commit = self.resolve_commit()?;
        let root = self.root_path()?;
        let tree = tree_spec(&commit, &root);

        let categories: BTreeSet<Category> = self
            .list_names(&["ls-tree", "--full-tree", "-d", "--name-only", "-z", &tree])?
            .into_iter()
            .filter(|name| !name.starts_with('.'))
            .map(|name| Category::from_dir_name(&name))
            .collect();

        let mut names =
            self.list_names(&["ls-tree", "--full-tree", "-r", "--name-only", "-z", &tree])?;
        names.retain(|name| is_visible_json(name));
        names.sort();

        let files = names
            .into_iter()
            .map(|name| {
                let blob = blob_spec(&commit, &root, &name);
                let payload = match self.git(&["cat-file", "blob", &blob]) {
                    Ok(bytes) => Payload::Bytes(bytes),
                    Err(err) => Payload::Unreadable(err.message().to_string()),
                };
                SnapshotFile::new(name, payload)
            })
            .collect();

        Ok(Generation {
            reference: Some(commit),
            categories,
            files,
        })
    }
}

fn join_root(prefix: &str, subdir: Option<&str>) -> String {
    [Some(prefix.trim_matches('/')), subdir]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn tree_spec(commit: &str, root: &str) -> String {
    format!("{}:{}", commit, root)
}

fn blob_spec(commit: &str, root: &str, name: &str) -> String {
    if root.is_empty() {
        format!("{}:{}", commit, name)
    } else {
        format!("{}:{}/{}", commit, root, name)
    }
}

fn is_visible_json(name: &str) -> bool {
    let hidden = name.split('/').any(|segment| segment.starts_with('.'));
    !hidden
        && Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
}
