//! Field-level change types.
//!
//! Collections use `BTreeMap` so serialization order follows path order.

use crate::diff::path::FieldPath;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// One side of a field change.
///
/// `Absent` means the path does not exist on that side. It is distinct from a
/// present JSON `null` and serializes by omitting the member.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Side {
    #[default]
    Absent,
    Present(Value),
}

impl Side {
    pub fn is_absent(&self) -> bool {
        matches!(self, Side::Absent)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Side::Absent => None,
            Side::Present(v) => Some(v),
        }
    }
}

impl From<Option<Value>> for Side {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Side::Absent, Side::Present)
    }
}

impl Serialize for Side {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Side::Absent => serializer.serialize_unit(),
            Side::Present(v) => v.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Side {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Side::Present)
    }
}

/// The `{old, new}` pair recorded for one path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldChange {
    #[serde(default, skip_serializing_if = "Side::is_absent")]
    pub old: Side,
    #[serde(default, skip_serializing_if = "Side::is_absent")]
    pub new: Side,
}

impl FieldChange {
    /// A value present on both sides with different contents.
    pub fn replaced(old: Value, new: Value) -> Self {
        Self {
            old: Side::Present(old),
            new: Side::Present(new),
        }
    }

    /// A value that exists only in the current generation.
    pub fn added(new: Value) -> Self {
        Self {
            old: Side::Absent,
            new: Side::Present(new),
        }
    }

    /// A value that exists only in the previous generation.
    pub fn removed(old: Value) -> Self {
        Self {
            old: Side::Present(old),
            new: Side::Absent,
        }
    }
}

/// Path-keyed changes for one object, ordered by path.
pub type FieldChanges = BTreeMap<FieldPath, FieldChange>;
