//! Change sets and change logs.
//!
//! [`aggregate`] turns two listed generations into a [`ChangeSet`]; stamping
//! it with a time yields the [`ChangeLog`] that gets persisted. Timestamps
//! are injected by the caller, so aggregation itself is deterministic.

pub mod aggregate;
pub mod human_summary;
pub mod model;

pub use aggregate::{aggregate, aggregate_with_categories, reconcile};
pub use human_summary::{render_human_summary, summary_line};
pub use model::{format_timestamp, ChangeEntry, ChangeLog, ChangeSet, ChangeType};
