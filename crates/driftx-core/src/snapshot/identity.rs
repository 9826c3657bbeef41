//! Object identity resolution.
//!
//! An identity is `(category, objectId)`: the category comes from the first
//! segment of the snapshot's path relative to the generation root, the
//! object id from the body's `id` field.

use crate::errors::DriftError;
use crate::snapshot::category::Category;
use crate::value::{Node, Number};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display name used when a body carries none.
pub const UNKNOWN_DISPLAY_NAME: &str = "Unknown";

/// Unique key of a configuration object within one generation.
///
/// Ordered by category, then object id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub category: Category,
    pub object_id: String,
}

impl Identity {
    pub fn new(category: Category, object_id: impl Into<String>) -> Self {
        Self {
            category,
            object_id: object_id.into(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.object_id)
    }
}

/// Non-empty path segments, accepting both separators.
pub(crate) fn path_segments(relative_path: &str) -> Vec<&str> {
    relative_path
        .split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

/// The category a snapshot belongs to, from its relative path.
///
/// # Errors
///
/// `DriftError::MissingCategory` when the file sits directly under the
/// generation root.
pub fn category_of(relative_path: &str) -> Result<Category, DriftError> {
    let segments = path_segments(relative_path);
    if segments.len() < 2 {
        return Err(DriftError::MissingCategory {
            path: relative_path.to_string(),
        });
    }
    Ok(Category::from_dir_name(segments[0]))
}

/// Resolve the identity of a parsed snapshot.
///
/// # Errors
///
/// - `MissingCategory` if the path has no category segment
/// - `MissingId` if `id` is absent, empty, or neither a string nor a number
pub fn resolve_identity(relative_path: &str, body: &Node) -> Result<Identity, DriftError> {
    let category = category_of(relative_path)?;
    let missing = || DriftError::MissingId {
        path: relative_path.to_string(),
    };

    let object_id = match body.get("id") {
        Some(Node::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Node::Number(n @ Number::Int(_))) => n.to_string(),
        Some(Node::Number(n @ Number::Float(f))) if f.is_finite() => n.to_string(),
        _ => return Err(missing()),
    };

    Ok(Identity::new(category, object_id))
}

/// The body's `displayName`, or `"Unknown"`.
pub fn display_name_of(body: &Node) -> String {
    body.get("displayName")
        .and_then(Node::as_str)
        .unwrap_or(UNKNOWN_DISPLAY_NAME)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identity_from_path_and_id() {
        let body = Node::from(json!({"id": "abc-1", "displayName": "Baseline"}));
        let identity = resolve_identity("CompliancePolicies/baseline.json", &body).unwrap();
        assert_eq!(identity, Identity::new(Category::CompliancePolicy, "abc-1"));
        assert_eq!(identity.to_string(), "CompliancePolicies/abc-1");
    }

    #[test]
    fn test_windows_separators_and_nested_dirs() {
        let body = Node::from(json!({"id": "s1"}));
        let identity = resolve_identity(r"Scripts\platform\s1.json", &body).unwrap();
        assert_eq!(identity.category, Category::Script);
    }

    #[test]
    fn test_numeric_id_is_rendered_in_decimal() {
        let body = Node::from(json!({"id": 42}));
        let identity = resolve_identity("Roles/r.json", &body).unwrap();
        assert_eq!(identity.object_id, "42");
    }

    #[test]
    fn test_root_level_file_has_no_category() {
        let body = Node::from(json!({"id": "x"}));
        assert!(matches!(
            resolve_identity("stray.json", &body),
            Err(DriftError::MissingCategory { .. })
        ));
        assert!(matches!(
            resolve_identity("./stray.json", &body),
            Err(DriftError::MissingCategory { .. })
        ));
    }

    #[test]
    fn test_unusable_ids_are_rejected() {
        for body in [json!({}), json!({"id": ""}), json!({"id": null}), json!({"id": ["a"]})] {
            let result = resolve_identity("Applications/a.json", &Node::from(body));
            assert!(matches!(result, Err(DriftError::MissingId { .. })));
        }
    }

    #[test]
    fn test_display_name_defaults_to_unknown() {
        assert_eq!(display_name_of(&Node::from(json!({"id": "a"}))), "Unknown");
        assert_eq!(
            display_name_of(&Node::from(json!({"displayName": "Win32 App"}))),
            "Win32 App"
        );
    }
}
