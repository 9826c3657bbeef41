//! Generation validation without diffing.

use driftx_core::errors::Result;
use driftx_core::snapshot::{load_generation, Category, SnapshotProvider};
use driftx_core::warning::{GenerationSide, Warning};
use driftx_core::{log_op_end, log_op_error, log_op_start};
use std::collections::BTreeMap;
use std::time::Instant;

/// What a snapshot store holds, and what is wrong with it.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckReport {
    pub reference: Option<String>,
    /// Loadable snapshots per category; empty categories count zero
    pub counts: BTreeMap<Category, usize>,
    pub snapshot_count: usize,
    pub warnings: Vec<Warning>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Load every snapshot `provider` lists and report counts and warnings.
///
/// # Errors
///
/// Only provider failures; per-file problems are reported as warnings.
pub fn check_generation(provider: &dyn SnapshotProvider) -> Result<CheckReport> {
    let start = Instant::now();
    log_op_start!("check_generation");

    let generation = match provider.list_snapshots() {
        Ok(g) => g,
        Err(err) => {
            log_op_error!(
                "check_generation",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            return Err(err);
        }
    };

    let loaded = load_generation(&generation, GenerationSide::Current);
    let mut counts: BTreeMap<Category, usize> = loaded
        .categories
        .iter()
        .map(|category| (category.clone(), 0))
        .collect();
    for identity in loaded.snapshots.keys() {
        *counts.entry(identity.category.clone()).or_insert(0) += 1;
    }

    let report = CheckReport {
        reference: loaded.reference,
        counts,
        snapshot_count: loaded.snapshots.len(),
        warnings: loaded.warnings,
    };

    log_op_end!(
        "check_generation",
        duration_ms = start.elapsed().as_millis() as u64,
        snapshots = report.snapshot_count,
        warnings = report.warnings.len()
    );
    Ok(report)
}
