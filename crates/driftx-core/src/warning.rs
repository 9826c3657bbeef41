//! Non-fatal, per-entry problems reported beside a change log.

use crate::errors::{DriftError, ExErrorKind};
use driftx_core_types::schema::EVENT_WARNING;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    Parse,
    Identity,
    Diff,
    DuplicateIdentity,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::Parse => "parse",
            WarningKind::Identity => "identity",
            WarningKind::Diff => "diff",
            WarningKind::DuplicateIdentity => "duplicate_identity",
        }
    }

    /// Warning kind for a per-entry error kind; `None` for run-level kinds.
    pub fn for_error_kind(kind: ExErrorKind) -> Option<Self> {
        match kind {
            ExErrorKind::Identity => Some(WarningKind::Identity),
            ExErrorKind::DuplicateIdentity => Some(WarningKind::DuplicateIdentity),
            ExErrorKind::Diff => Some(WarningKind::Diff),
            kind if kind.is_per_entry() => Some(WarningKind::Parse),
            _ => None,
        }
    }
}

/// Which generation of a comparison a warning came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationSide {
    Previous,
    Current,
}

impl GenerationSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationSide::Previous => "previous",
            GenerationSide::Current => "current",
        }
    }
}

/// A snapshot that was skipped, or compared with trouble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    pub generation: GenerationSide,
    /// Snapshot path relative to its generation root
    pub path: String,
    pub message: String,
}

impl Warning {
    pub fn new(
        kind: WarningKind,
        generation: GenerationSide,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            generation,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Downgrade a per-entry failure to a warning about the file it names.
    ///
    /// Run-level failures such as an invalid pattern are not downgraded.
    pub fn from_error(generation: GenerationSide, err: &DriftError) -> Option<Self> {
        let kind = WarningKind::for_error_kind(err.kind())?;
        Some(Self::new(kind, generation, err.subject(), err.to_string()))
    }

    /// Emit this warning as a structured `warn` event.
    pub fn emit(&self, op: &str) {
        tracing::warn!(
            component = module_path!(),
            op = op,
            event = EVENT_WARNING,
            warning_kind = self.kind.as_str(),
            generation = self.generation.as_str(),
            path = %self.path,
            "{}",
            self.message
        );
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {}: {}",
            self.kind.as_str(),
            self.generation.as_str(),
            self.path,
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_error_classifies_by_kind() {
        let err = DriftError::InvalidJson {
            path: "Scripts/s.json".to_string(),
            reason: "EOF while parsing".to_string(),
        };
        let warning = Warning::from_error(GenerationSide::Current, &err).unwrap();
        assert_eq!(warning.kind, WarningKind::Parse);
        assert_eq!(warning.path, "Scripts/s.json");
        assert!(warning.message.contains("not valid JSON"));

        let err = DriftError::MissingId {
            path: "Scripts/t.json".to_string(),
        };
        assert_eq!(
            Warning::from_error(GenerationSide::Previous, &err)
                .unwrap()
                .kind,
            WarningKind::Identity
        );
    }

    #[test]
    fn test_run_level_errors_are_not_downgraded() {
        let err = DriftError::InvalidPattern {
            pattern: "a[".to_string(),
            reason: "unclosed bracket".to_string(),
        };
        assert!(Warning::from_error(GenerationSide::Current, &err).is_none());
        assert_eq!(WarningKind::for_error_kind(ExErrorKind::Write), None);
        assert_eq!(
            WarningKind::for_error_kind(ExErrorKind::Parse),
            Some(WarningKind::Parse)
        );
    }

    #[test]
    fn test_serializes_with_snake_case_tags() {
        let warning = Warning::new(
            WarningKind::DuplicateIdentity,
            GenerationSide::Previous,
            "Roles/b.json",
            "duplicate",
        );
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "duplicate_identity");
        assert_eq!(json["generation"], "previous");
    }

    #[test]
    fn test_display_is_single_line() {
        let warning = Warning::new(WarningKind::Diff, GenerationSide::Current, "Roles/a.json", "NaN");
        assert_eq!(warning.to_string(), "[diff] current Roles/a.json: NaN");
    }
}
