//! Change set aggregation.
//!
//! Reconciles the identities of two generations into added, removed and
//! modified entries, running the differ on every identity present in both.

use crate::changelog::model::{ChangeEntry, ChangeSet};
use crate::diff::{diff, ExclusionSet};
use crate::errors::Result;
use crate::snapshot::{
    check_compatible, load_generation, Category, Generation, Identity, LoadedGeneration, Snapshot,
};
use crate::warning::{GenerationSide, Warning, WarningKind};
use crate::{log_op_end, log_op_start};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

/// Compare two listed generations.
///
/// Both generations must have been exported for the same category set. A
/// missing previous generation reports every current object as added.
///
/// Warnings come in a fixed order: previous generation load warnings,
/// current generation load warnings, then diff warnings.
///
/// # Errors
///
/// `IncompatibleGenerations` when the category sets differ. Per-file
/// problems never fail the call.
pub fn aggregate(
    previous: Option<&Generation>,
    current: &Generation,
    exclusions: &ExclusionSet,
) -> Result<ChangeSet> {
    aggregate_with_categories(previous, current, exclusions, None)
}

/// [`aggregate`] with an explicit category set both generations must fall
/// within, instead of requiring equal sets.
///
/// # Errors
///
/// `IncompatibleGenerations` when a generation holds a category outside
/// `pinned` (or, without `pinned`, when the sets differ).
pub fn aggregate_with_categories(
    previous: Option<&Generation>,
    current: &Generation,
    exclusions: &ExclusionSet,
    pinned: Option<&BTreeSet<Category>>,
) -> Result<ChangeSet> {
    check_compatible(previous, current, pinned)?;

    let mut previous = previous.map(|g| load_generation(g, GenerationSide::Previous));
    let mut current = load_generation(current, GenerationSide::Current);

    if let Some(previous) = previous.as_mut() {
        withhold_unreadable_counterparts(previous, &current.failed_paths, &current.snapshots);
        withhold_unreadable_counterparts(&mut current, &previous.failed_paths, &previous.snapshots);
    }

    let empty = BTreeMap::new();
    let previous_snapshots = previous.as_ref().map_or(&empty, |g| &g.snapshots);
    let mut set = reconcile(previous_snapshots, &current.snapshots, exclusions);

    let mut warnings = Vec::new();
    if let Some(previous) = &previous {
        warnings.extend(previous.warnings.iter().cloned());
    }
    warnings.extend(current.warnings);
    warnings.append(&mut set.warnings);

    set.warnings = warnings;
    set.source_generation_ref = previous.and_then(|g| g.reference);
    Ok(set)
}

/// Drop snapshots whose file failed to load on the other side.
///
/// The object's state on that side is unknown, so it is neither added nor
/// removed.
fn withhold_unreadable_counterparts(
    loaded: &mut LoadedGeneration,
    failed_elsewhere: &BTreeSet<String>,
    other_snapshots: &BTreeMap<Identity, Snapshot>,
) {
    if failed_elsewhere.is_empty() {
        return;
    }
    loaded.snapshots.retain(|identity, snapshot| {
        other_snapshots.contains_key(identity) || !failed_elsewhere.contains(&snapshot.relative_path)
    });
}

/// Reconcile two identity-keyed snapshot maps.
///
/// Entries come out sorted by category, then object id. The returned set
/// carries only diff warnings and no source reference.
pub fn reconcile(
    previous: &BTreeMap<Identity, Snapshot>,
    current: &BTreeMap<Identity, Snapshot>,
    exclusions: &ExclusionSet,
) -> ChangeSet {
    let start = Instant::now();
    log_op_start!(
        "reconcile",
        previous = previous.len(),
        current = current.len()
    );

    let mut set = ChangeSet::default();

    for (identity, snapshot) in current {
        if !previous.contains_key(identity) {
            set.added
                .push(ChangeEntry::added(identity, &snapshot.display_name));
        }
    }

    for (identity, snapshot) in previous {
        let Some(new) = current.get(identity) else {
            set.removed
                .push(ChangeEntry::removed(identity, &snapshot.display_name));
            continue;
        };

        match diff(&snapshot.body, &new.body, exclusions) {
            Ok(changes) if changes.is_empty() => {}
            Ok(changes) => {
                set.modified
                    .push(ChangeEntry::modified(identity, &new.display_name, changes));
            }
            Err(err) => {
                let warning = Warning::new(
                    WarningKind::Diff,
                    GenerationSide::Current,
                    &new.relative_path,
                    format!("{}: {}", identity, err),
                );
                warning.emit("reconcile");
                set.warnings.push(warning);
                set.modified
                    .push(ChangeEntry::diff_failed(identity, &new.display_name, err.to_string()));
            }
        }
    }

    log_op_end!(
        "reconcile",
        duration_ms = start.elapsed().as_millis() as u64,
        added = set.added.len(),
        removed = set.removed.len(),
        modified = set.modified.len()
    );
    set
}
