//! Tagged-union JSON value used throughout change detection.
//!
//! Snapshot bodies are converted from `serde_json::Value` into [`Node`] once,
//! at load time. Two properties make `Node` the comparison currency rather
//! than `Value`:
//!
//! - mapping keys are held in a `BTreeMap`, so serialization is canonical
//!   (keys sorted) regardless of how the exporter ordered them;
//! - numbers are normalized so that `1`, `1.0` and `1e0` compare equal.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// 2^127. Floats at or beyond this magnitude do not fit an `i128` and are
/// not folded into integers.
const INT_FOLD_LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

/// A JSON number normalized for value comparison.
///
/// Integral values that fit an `i128` are always stored as `Int`, whatever
/// their textual representation was, so equal numbers also share one
/// canonical text.
#[derive(Debug, Clone, Copy)]
pub enum Number {
    Int(i128),
    Float(f64),
}

impl Number {
    /// Normalize a float, folding integral values into `Int`.
    pub fn from_f64(f: f64) -> Self {
        if f.is_finite() && f.fract() == 0.0 && f.abs() < INT_FOLD_LIMIT {
            Number::Int(f as i128)
        } else {
            Number::Float(f)
        }
    }

    /// NaN and infinities cannot be compared or written back as JSON.
    pub fn is_finite(&self) -> bool {
        match self {
            Number::Int(_) => true,
            Number::Float(f) => f.is_finite(),
        }
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::Float(a), Number::Float(b)) => a == b,
            (Number::Int(i), Number::Float(f)) | (Number::Float(f), Number::Int(i)) => {
                (*i as f64) == *f
            }
        }
    }
}

impl std::fmt::Display for Number {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<&serde_json::Number> for Number {
    fn from(n: &serde_json::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Number::Int(i128::from(i))
        } else if let Some(u) = n.as_u64() {
            Number::Int(i128::from(u))
        } else {
            Number::from_f64(n.as_f64().unwrap_or(f64::NAN))
        }
    }
}

/// A JSON document as a tagged union.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Mapping(BTreeMap<String, Node>),
    Sequence(Vec<Node>),
}

impl Node {
    /// Build a number node from a float (used by fixtures and tests).
    pub fn float(f: f64) -> Self {
        Node::Number(Number::from_f64(f))
    }

    /// Look up a key if this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Node::Mapping(_))
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "bool",
            Node::Number(_) => "number",
            Node::String(_) => "string",
            Node::Mapping(_) => "mapping",
            Node::Sequence(_) => "sequence",
        }
    }

    /// Convert back to a `serde_json::Value`.
    ///
    /// Non-finite floats become `null`; callers that care reject them first.
    pub fn to_json(&self) -> Value {
        match self {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(Number::Int(i)) => {
                if let Ok(v) = i64::try_from(*i) {
                    Value::from(v)
                } else if let Ok(v) = u64::try_from(*i) {
                    Value::from(v)
                } else {
                    serde_json::Number::from_f64(*i as f64)
                        .map(Value::Number)
                        .unwrap_or(Value::Null)
                }
            }
            Node::Number(Number::Float(f)) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Node::String(s) => Value::String(s.clone()),
            Node::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Node::Sequence(items) => Value::Array(items.iter().map(Node::to_json).collect()),
        }
    }

    /// Canonical compact JSON text of this node.
    ///
    /// Mapping keys come out sorted and numbers normalized, so two nodes
    /// that compare equal produce the same key.
    pub fn canonical_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl From<&Value> for Node {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(*b),
            Value::Number(n) => Node::Number(Number::from(n)),
            Value::String(s) => Node::String(s.clone()),
            Value::Array(items) => Node::Sequence(items.iter().map(Node::from).collect()),
            Value::Object(map) => Node::Mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), Node::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::from(&value)
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(b) => serializer.serialize_bool(*b),
            Node::Number(Number::Int(i)) => {
                if let Ok(v) = i64::try_from(*i) {
                    serializer.serialize_i64(v)
                } else if let Ok(v) = u64::try_from(*i) {
                    serializer.serialize_u64(v)
                } else {
                    serializer.serialize_f64(*i as f64)
                }
            }
            Node::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            Node::String(s) => serializer.serialize_str(s),
            Node::Mapping(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    out.serialize_entry(k, v)?;
                }
                out.end()
            }
            Node::Sequence(items) => {
                let mut out = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    out.serialize_element(item)?;
                }
                out.end()
            }
        }
    }
}
