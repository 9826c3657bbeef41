//! Structural differ.
//!
//! The entry point is [`diff`], which compares two snapshot bodies and
//! returns the changed paths with their old and new values.

use crate::diff::exclusion::{ExclusionSet, Step};
use crate::diff::model::{FieldChange, FieldChanges, Side};
use crate::diff::path::{FieldPath, Segment};
use crate::errors::DriftError;
use crate::value::Node;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Compare two bodies field by field.
///
/// - mappings are compared over the union of their keys; a key present on
///   one side only is reported with the other side absent
/// - sequences are compared as multisets of canonicalized elements, so
///   reordering alone yields nothing
/// - values of different kinds are reported whole, without recursion
/// - excluded paths are skipped together with their descendants
///
/// # Errors
///
/// `DriftError::UnrepresentableNumber` if either body holds NaN or an infinity.
pub fn diff(
    old: &Node,
    new: &Node,
    exclusions: &ExclusionSet,
) -> Result<FieldChanges, DriftError> {
    ensure_representable(old, &mut Vec::new())?;
    ensure_representable(new, &mut Vec::new())?;

    let mut changes = FieldChanges::new();
    if old == new {
        return Ok(changes);
    }

    let mut path = Vec::new();
    walk(old, new, &mut path, exclusions, &mut changes);
    Ok(changes)
}

/// [`diff`] over `serde_json` values.
///
/// # Errors
///
/// Same as [`diff`].
pub fn diff_json(
    old: &Value,
    new: &Value,
    exclusions: &ExclusionSet,
) -> Result<FieldChanges, DriftError> {
    diff(&Node::from(old), &Node::from(new), exclusions)
}

fn ensure_representable(node: &Node, path: &mut Vec<Segment>) -> Result<(), DriftError> {
    match node {
        Node::Number(n) if !n.is_finite() => Err(DriftError::UnrepresentableNumber {
            path: FieldPath::from_segments(path.clone()).to_string(),
            value: n.to_string(),
        }),
        Node::Mapping(map) => {
            for (key, child) in map {
                path.push(Segment::Key(key.clone()));
                ensure_representable(child, path)?;
                path.pop();
            }
            Ok(())
        }
        Node::Sequence(items) => {
            for (i, child) in items.iter().enumerate() {
                path.push(Segment::Index(i));
                ensure_representable(child, path)?;
                path.pop();
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn walk(
    old: &Node,
    new: &Node,
    path: &mut Vec<Segment>,
    exclusions: &ExclusionSet,
    out: &mut FieldChanges,
) {
    if exclusions.excludes(path) {
        return;
    }

    match (old, new) {
        (Node::Mapping(a), Node::Mapping(b)) => {
            let keys: BTreeSet<&String> = a.keys().chain(b.keys()).collect();
            for key in keys {
                path.push(Segment::Key(key.clone()));
                match (a.get(key), b.get(key)) {
                    (Some(x), Some(y)) => walk(x, y, path, exclusions, out),
                    (Some(x), None) => {
                        if !exclusions.excludes(path) {
                            let old = prune_at(x, path, exclusions);
                            record(out, path, FieldChange::removed(old));
                        }
                    }
                    (None, Some(y)) => {
                        if !exclusions.excludes(path) {
                            let new = prune_at(y, path, exclusions);
                            record(out, path, FieldChange::added(new));
                        }
                    }
                    (None, None) => {}
                }
                path.pop();
            }
        }
        (Node::Sequence(a), Node::Sequence(b)) => diff_sequence(a, b, path, exclusions, out),
        _ if old == new => {}
        _ => {
            let change = FieldChange::replaced(
                prune_at(old, path, exclusions),
                prune_at(new, path, exclusions),
            );
            record(out, path, change);
        }
    }
}

/// Multiset comparison of two sequences.
///
/// Elements are pruned and canonicalized, sorted by canonical key, then
/// merged. Unmatched elements are reported at their index in their own
/// side's sorted order; a removal and an addition at the same index share
/// one entry.
fn diff_sequence(
    old: &[Node],
    new: &[Node],
    path: &mut Vec<Segment>,
    exclusions: &ExclusionSet,
    out: &mut FieldChanges,
) {
    let old_sorted = canonical_elements(old, path, exclusions);
    let new_sorted = canonical_elements(new, path, exclusions);

    let mut removed: BTreeMap<usize, &Node> = BTreeMap::new();
    let mut added: BTreeMap<usize, &Node> = BTreeMap::new();
    let (mut i, mut j) = (0, 0);

    while i < old_sorted.len() || j < new_sorted.len() {
        match (old_sorted.get(i), new_sorted.get(j)) {
            (Some((ka, _)), Some((kb, _))) if ka == kb => {
                i += 1;
                j += 1;
            }
            (Some((ka, a)), Some((kb, _))) if ka < kb => {
                removed.insert(i, a);
                i += 1;
            }
            (Some((_, a)), None) => {
                removed.insert(i, a);
                i += 1;
            }
            (_, Some((_, b))) => {
                added.insert(j, b);
                j += 1;
            }
            (None, None) => break,
        }
    }

    let indices: BTreeSet<usize> = removed.keys().chain(added.keys()).copied().collect();
    for index in indices {
        path.push(Segment::Index(index));
        if !exclusions.excludes(path) {
            let change = FieldChange {
                old: Side::from(removed.get(&index).map(|n| n.to_json())),
                new: Side::from(added.get(&index).map(|n| n.to_json())),
            };
            record(out, path, change);
        }
        path.pop();
    }
}

/// Canonical forms of a sequence's elements, sorted by canonical key.
///
/// Elements excluded as a whole (e.g. by `items[*]`) are dropped.
fn canonical_elements(
    items: &[Node],
    path: &[Segment],
    exclusions: &ExclusionSet,
) -> Vec<(String, Node)> {
    let mut steps: Vec<Step<'_>> = path.iter().map(Step::from).collect();
    steps.push(Step::Element);

    if exclusions.excludes_steps(&steps) {
        return Vec::new();
    }

    let mut elements: Vec<(String, Node)> = items
        .iter()
        .map(|item| {
            let node = prune(item, &mut steps, exclusions, true);
            (node.canonical_key(), node)
        })
        .collect();
    elements.sort_by(|a, b| a.0.cmp(&b.0));
    elements
}

/// Prune a value reported whole at `path`, keeping element order.
fn prune_at(node: &Node, path: &[Segment], exclusions: &ExclusionSet) -> Value {
    if exclusions.is_empty() {
        return node.to_json();
    }
    let mut steps: Vec<Step<'_>> = path.iter().map(Step::from).collect();
    prune(node, &mut steps, exclusions, false).to_json()
}

/// Drop excluded descendants of `node`, whose own location is `steps`.
///
/// With `canonical` set, nested sequences are sorted by canonical key and
/// their elements are addressed as [`Step::Element`]; otherwise elements keep
/// their position and real index.
fn prune<'a>(
    node: &'a Node,
    steps: &mut Vec<Step<'a>>,
    exclusions: &ExclusionSet,
    canonical: bool,
) -> Node {
    match node {
        Node::Mapping(map) => {
            let mut kept = BTreeMap::new();
            for (key, child) in map {
                steps.push(Step::Key(key));
                if !exclusions.excludes_steps(steps) {
                    kept.insert(key.clone(), prune(child, steps, exclusions, canonical));
                }
                steps.pop();
            }
            Node::Mapping(kept)
        }
        Node::Sequence(items) => {
            let mut kept = Vec::with_capacity(items.len());
            for (i, child) in items.iter().enumerate() {
                steps.push(if canonical {
                    Step::Element
                } else {
                    Step::Index(i)
                });
                if !exclusions.excludes_steps(steps) {
                    kept.push(prune(child, steps, exclusions, canonical));
                }
                steps.pop();
            }
            if canonical {
                kept.sort_by_cached_key(Node::canonical_key);
            }
            Node::Sequence(kept)
        }
        other => other.clone(),
    }
}

fn record(out: &mut FieldChanges, path: &[Segment], change: FieldChange) {
    out.insert(FieldPath::from_segments(path.to_vec()), change);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(old: Value, new: Value) -> FieldChanges {
        diff_json(&old, &new, &ExclusionSet::empty()).unwrap()
    }

    fn p(s: &str) -> FieldPath {
        s.parse().unwrap()
    }

    #[test]
    fn test_identical_bodies_yield_nothing() {
        let body = json!({"id": "a", "settings": {"x": [1, 2, {"y": null}]}});
        assert!(run(body.clone(), body).is_empty());
    }

    #[test]
    fn test_scalar_change_is_reported_at_its_path() {
        let changes = run(
            json!({"settings": {"minimumLength": 8}}),
            json!({"settings": {"minimumLength": 12}}),
        );
        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes[&p("root['settings']['minimumLength']")],
            FieldChange::replaced(json!(8), json!(12))
        );
    }

    #[test]
    fn test_one_sided_keys_use_absent_marker() {
        let changes = run(json!({"a": 1, "gone": null}), json!({"a": 1, "fresh": 2}));
        assert_eq!(changes[&p("root['gone']")], FieldChange::removed(Value::Null));
        assert_eq!(changes[&p("root['fresh']")], FieldChange::added(json!(2)));
    }

    #[test]
    fn test_kind_mismatch_reports_whole_values() {
        let changes = run(json!({"s": {"a": 1}}), json!({"s": "flat"}));
        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes[&p("root['s']")],
            FieldChange::replaced(json!({"a": 1}), json!("flat"))
        );
    }

    #[test]
    fn test_numbers_compare_numerically() {
        assert!(run(json!({"n": 1}), json!({"n": 1.0})).is_empty());
    }

    #[test]
    fn test_large_numbers_inside_sequences_compare_numerically() {
        let changes = run(
            json!({"n": 9223372036854775808u64, "s": [9223372036854775808u64], "x": 1}),
            json!({"n": 9223372036854775808.0, "s": [9223372036854775808.0], "x": 2}),
        );
        assert_eq!(changes.keys().collect::<Vec<_>>(), vec![&p("root['x']")]);
    }

    #[test]
    fn test_reordered_sequence_yields_nothing() {
        let changes = run(
            json!({"groups": [{"id": "g1", "mode": "include"}, {"id": "g2"}]}),
            json!({"groups": [{"id": "g2"}, {"mode": "include", "id": "g1"}]}),
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn test_sequence_element_changes_use_canonical_indices() {
        let changes = run(json!({"tags": ["a", "b", "c"]}), json!({"tags": ["c", "a", "d"]}));
        // old sorted: a b c, new sorted: a c d; b leaves at 1, d arrives at 2
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[&p("root['tags'][1]")], FieldChange::removed(json!("b")));
        assert_eq!(changes[&p("root['tags'][2]")], FieldChange::added(json!("d")));
    }

    #[test]
    fn test_removal_and_addition_at_same_index_merge() {
        let changes = run(json!({"tags": ["a"]}), json!({"tags": ["b"]}));
        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes[&p("root['tags'][0]")],
            FieldChange::replaced(json!("a"), json!("b"))
        );
    }

    #[test]
    fn test_duplicate_elements_count_as_multiset() {
        let changes = run(json!({"v": [1, 1, 2]}), json!({"v": [1, 2]}));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[&p("root['v'][1]")], FieldChange::removed(json!(1)));
    }

    #[test]
    fn test_excluded_path_and_descendants_are_skipped() {
        let exclusions = ExclusionSet::parse_all(["root['lastModifiedDateTime']", "meta"]).unwrap();
        let changes = diff_json(
            &json!({"lastModifiedDateTime": "2024-01-01", "meta": {"v": 1}, "x": 1}),
            &json!({"lastModifiedDateTime": "2024-02-01", "meta": {"v": 2}, "x": 1}),
            &exclusions,
        )
        .unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_exclusions_apply_inside_sequence_elements() {
        let exclusions = ExclusionSet::parse_all(["assignments[*].id"]).unwrap();
        let changes = diff_json(
            &json!({"assignments": [{"id": "1", "target": "all"}, {"id": "2", "target": "g"}]}),
            &json!({"assignments": [{"id": "9", "target": "g"}, {"id": "8", "target": "all"}]}),
            &exclusions,
        )
        .unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_element_fields_need_a_wildcard_index() {
        let old = json!({"items": [{"x": 1, "y": "a"}]});
        let new = json!({"items": [{"x": 2, "y": "a"}]});

        let wildcard = ExclusionSet::parse_all(["items[*].x"]).unwrap();
        assert!(diff_json(&old, &new, &wildcard).unwrap().is_empty());

        let literal = ExclusionSet::parse_all(["items[0].x"]).unwrap();
        let changes = diff_json(&old, &new, &literal).unwrap();
        assert_eq!(changes.len(), 1);
        assert!(changes.contains_key(&p("root['items'][0]")));
    }

    #[test]
    fn test_reported_whole_values_are_pruned() {
        let exclusions = ExclusionSet::parse_all(["**.lastModifiedDateTime"]).unwrap();
        let changes = diff_json(
            &json!({}),
            &json!({"extra": {"lastModifiedDateTime": "t", "keep": true}}),
            &exclusions,
        )
        .unwrap();
        assert_eq!(
            changes[&p("root['extra']")],
            FieldChange::added(json!({"keep": true}))
        );
    }

    #[test]
    fn test_nested_sequences_are_order_insensitive() {
        let changes = run(
            json!({"rules": [{"ids": [3, 1, 2]}, {"ids": []}]}),
            json!({"rules": [{"ids": []}, {"ids": [2, 3, 1]}]}),
        );
        assert!(changes.is_empty());
    }

    #[test]
    fn test_non_finite_numbers_are_rejected() {
        let old = Node::from(json!({"a": 1}));
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), Node::float(f64::NAN));
        let new = Node::Mapping(map);

        let err = diff(&old, &new, &ExclusionSet::empty()).unwrap_err();
        assert!(matches!(
            err,
            DriftError::UnrepresentableNumber { ref path, .. } if path == "root['a']"
        ));
    }
}
