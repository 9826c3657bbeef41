//! driftx Core - change detection for exported tenant configuration
//!
//! This crate is the I/O-free heart of driftx. It provides:
//! - A tagged-union JSON value model ([`value::Node`])
//! - Field paths and exclusion patterns for volatile fields
//! - The structural differ (order-insensitive for sequences)
//! - Snapshot identity resolution and generation loading
//! - Change set aggregation and the change log model
//! - Error and logging facilities shared by the other crates
//!
//! Reading snapshots from disk or version control and persisting change logs
//! live in `driftx-store`; this crate only sees already-listed generations
//! through [`snapshot::SnapshotProvider`].

pub mod changelog;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod snapshot;
pub mod value;
pub mod warning;

// Re-export commonly used types
pub use changelog::{aggregate, ChangeEntry, ChangeLog, ChangeSet, ChangeType};
pub use diff::{diff, ExclusionSet, FieldChange, FieldChanges, FieldPath};
pub use errors::{DriftError, ExError, ExErrorKind, Result};
pub use snapshot::{Category, Generation, Identity, Snapshot, SnapshotProvider};
pub use value::Node;
pub use warning::{GenerationSide, Warning, WarningKind};
