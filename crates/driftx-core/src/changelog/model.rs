//! Change log output types.
//!
//! Entry arrays are kept sorted by identity, and field changes are keyed by
//! path in a `BTreeMap`, so serialization is deterministic.

use crate::diff::FieldChanges;
use crate::snapshot::{Category, Identity};
use crate::warning::Warning;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Added,
    Removed,
    Modified,
}

/// One object that differs between generations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEntry {
    pub object_type: Category,
    pub display_name: String,
    pub object_id: String,
    pub change_type: ChangeType,
    /// Field-level changes; only modified entries carry any
    #[serde(default, skip_serializing_if = "FieldChanges::is_empty")]
    pub changes: FieldChanges,
    /// Set instead of `changes` when the bodies could not be compared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_error: Option<String>,
}

impl ChangeEntry {
    pub fn added(identity: &Identity, display_name: impl Into<String>) -> Self {
        Self::summary(identity, display_name, ChangeType::Added)
    }

    pub fn removed(identity: &Identity, display_name: impl Into<String>) -> Self {
        Self::summary(identity, display_name, ChangeType::Removed)
    }

    pub fn modified(
        identity: &Identity,
        display_name: impl Into<String>,
        changes: FieldChanges,
    ) -> Self {
        Self {
            changes,
            ..Self::summary(identity, display_name, ChangeType::Modified)
        }
    }

    /// Modified entry recording that the differ failed for this identity.
    pub fn diff_failed(
        identity: &Identity,
        display_name: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            diff_error: Some(error.into()),
            ..Self::summary(identity, display_name, ChangeType::Modified)
        }
    }

    fn summary(identity: &Identity, display_name: impl Into<String>, change_type: ChangeType) -> Self {
        Self {
            object_type: identity.category.clone(),
            display_name: display_name.into(),
            object_id: identity.object_id.clone(),
            change_type,
            changes: FieldChanges::new(),
            diff_error: None,
        }
    }

    pub fn identity(&self) -> Identity {
        Identity::new(self.object_type.clone(), self.object_id.clone())
    }
}

/// Result of reconciling two generations, before it is stamped with a time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChangeSet {
    /// Reference of the previous generation, if it had one
    pub source_generation_ref: Option<String>,
    pub added: Vec<ChangeEntry>,
    pub removed: Vec<ChangeEntry>,
    pub modified: Vec<ChangeEntry>,
    pub warnings: Vec<Warning>,
}

impl ChangeSet {
    /// True when no object was added, removed or modified.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Stamp the change set, dropping its warnings.
    pub fn into_change_log(self, timestamp: DateTime<Utc>) -> (ChangeLog, Vec<Warning>) {
        let log = ChangeLog {
            timestamp,
            source_generation_ref: self.source_generation_ref,
            added: self.added,
            removed: self.removed,
            modified: self.modified,
        };
        (log, self.warnings)
    }
}

/// The persisted record of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeLog {
    #[serde(with = "utc_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub source_generation_ref: Option<String>,
    pub added: Vec<ChangeEntry>,
    pub removed: Vec<ChangeEntry>,
    pub modified: Vec<ChangeEntry>,
}

impl ChangeLog {
    pub fn total_changes(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }
}

/// ISO-8601 UTC with microseconds and a trailing `Z`.
mod utc_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|ts| ts.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Format a timestamp the way change logs carry it.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
