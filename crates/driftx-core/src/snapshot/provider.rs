//! Snapshot provider abstraction.
//!
//! A provider lists one generation: the snapshot files it holds (relative
//! path plus contents) and the categories it was exported for. Providers do
//! the I/O; everything downstream of [`SnapshotProvider::list_snapshots`] is
//! pure.

use crate::errors::{ExError, ExErrorKind, Result};
use crate::snapshot::category::Category;
use crate::snapshot::identity::path_segments;
use crate::value::Node;
use std::collections::BTreeSet;

/// Contents of one snapshot file as delivered by a provider.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Raw file bytes, parsed during loading
    Bytes(Vec<u8>),
    /// An already parsed document
    Document(Node),
    /// The provider saw the file but could not read it
    Unreadable(String),
}

/// One file of a generation.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotFile {
    /// Path relative to the generation root, `/`-separated
    pub relative_path: String,
    pub payload: Payload,
}

impl SnapshotFile {
    pub fn new(relative_path: impl Into<String>, payload: Payload) -> Self {
        Self {
            relative_path: relative_path.into(),
            payload,
        }
    }
}

/// A complete export run as listed by a provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Generation {
    /// Opaque reference such as a git commit id
    pub reference: Option<String>,
    /// Categories this generation was exported for
    pub categories: BTreeSet<Category>,
    pub files: Vec<SnapshotFile>,
}

/// Source of one generation of snapshots.
pub trait SnapshotProvider {
    /// List the generation.
    ///
    /// # Errors
    ///
    /// Fatal provider failures only (missing root, version control
    /// failure). A single unreadable file is reported as
    /// [`Payload::Unreadable`] instead.
    fn list_snapshots(&self) -> Result<Generation>;
}

/// Provider over a generation held in memory.
///
/// Adding a file inside a category directory registers that category.
///
/// ```
/// use driftx_core::snapshot::InMemoryProvider;
/// use serde_json::json;
///
/// let provider = InMemoryProvider::new()
///     .with_reference("export-41")
///     .with_json("CompliancePolicies/a.json", &json!({"id": "a"}));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    generation: Generation,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.generation.reference = Some(reference.into());
        self
    }

    /// Register a category that may hold no files.
    pub fn with_category(mut self, category: Category) -> Self {
        self.generation.categories.insert(category);
        self
    }

    pub fn with_file(mut self, relative_path: impl Into<String>, payload: Payload) -> Self {
        let relative_path = relative_path.into();
        let segments = path_segments(&relative_path);
        if segments.len() >= 2 {
            self.generation
                .categories
                .insert(Category::from_dir_name(segments[0]));
        }
        self.generation
            .files
            .push(SnapshotFile::new(relative_path, payload));
        self
    }

    /// Add a file whose bytes are the compact serialization of `value`.
    pub fn with_json(self, relative_path: impl Into<String>, value: &serde_json::Value) -> Self {
        let bytes = value.to_string().into_bytes();
        self.with_file(relative_path, Payload::Bytes(bytes))
    }

    pub fn generation(&self) -> &Generation {
        &self.generation
    }
}

impl SnapshotProvider for InMemoryProvider {
    fn list_snapshots(&self) -> Result<Generation> {
        Ok(self.generation.clone())
    }
}

/// Check that two generations can be compared.
///
/// Without pinned categories both generations must have been exported for
/// the same category set. With pinned categories, each generation's set
/// must fall within the pinned set. A missing previous generation is always
/// compatible.
///
/// # Errors
///
/// `IncompatibleGenerations` naming the categories that differ.
pub fn check_compatible(
    previous: Option<&Generation>,
    current: &Generation,
    pinned: Option<&BTreeSet<Category>>,
) -> Result<()> {
    let Some(previous) = previous else {
        return Ok(());
    };

    match pinned {
        Some(pinned) => {
            for (side, generation) in [("previous", previous), ("current", current)] {
                let outside: Vec<String> = generation
                    .categories
                    .difference(pinned)
                    .map(Category::to_string)
                    .collect();
                if !outside.is_empty() {
                    return Err(incompatible(format!(
                        "{} generation holds categories outside the configured set: {}",
                        side,
                        outside.join(", ")
                    )));
                }
            }
            Ok(())
        }
        None if previous.categories == current.categories => Ok(()),
        None => {
            let differing: Vec<String> = previous
                .categories
                .symmetric_difference(&current.categories)
                .map(Category::to_string)
                .collect();
            Err(incompatible(format!(
                "generations were exported for different categories: {}",
                differing.join(", ")
            )))
        }
    }
}

fn incompatible(message: String) -> ExError {
    ExError::new(ExErrorKind::IncompatibleGenerations)
        .with_op("check_compatible")
        .with_message(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn generation(categories: &[Category]) -> Generation {
        Generation {
            categories: categories.iter().cloned().collect(),
            ..Generation::default()
        }
    }

    #[test]
    fn test_builder_registers_categories_from_paths() {
        let provider = InMemoryProvider::new()
            .with_json("CompliancePolicies/a.json", &json!({"id": "a"}))
            .with_json("stray.json", &json!({"id": "s"}))
            .with_category(Category::Script);
        let generation = provider.list_snapshots().unwrap();
        assert_eq!(generation.files.len(), 2);
        assert_eq!(
            generation.categories,
            [Category::CompliancePolicy, Category::Script].into_iter().collect()
        );
    }

    #[test]
    fn test_equal_category_sets_are_compatible() {
        let a = generation(&[Category::Application, Category::Script]);
        let b = generation(&[Category::Script, Category::Application]);
        assert!(check_compatible(Some(&a), &b, None).is_ok());
    }

    #[test]
    fn test_missing_previous_is_compatible() {
        assert!(check_compatible(None, &generation(&[Category::Role]), None).is_ok());
    }

    #[test]
    fn test_different_category_sets_are_rejected() {
        let a = generation(&[Category::Application]);
        let b = generation(&[Category::Application, Category::Role]);
        let err = check_compatible(Some(&a), &b, None).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::IncompatibleGenerations);
        assert!(err.message().contains("Roles"));
    }

    #[test]
    fn test_pinned_categories_accept_subsets() {
        let pinned: BTreeSet<Category> = [Category::Application, Category::Role].into();
        let a = generation(&[Category::Application]);
        let b = generation(&[Category::Application, Category::Role]);
        assert!(check_compatible(Some(&a), &b, Some(&pinned)).is_ok());

        let c = generation(&[Category::Script]);
        let err = check_compatible(Some(&a), &c, Some(&pinned)).unwrap_err();
        assert!(err.message().contains("current generation"));
    }
}
