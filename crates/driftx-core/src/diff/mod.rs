//! Structural JSON differ.
//!
//! Compares the previous and current body of one configuration object and
//! produces the paths whose values differ, ordered by path.
//!
//! ## Entry point
//!
//! ```ignore
//! use driftx_core::diff::{diff, ExclusionSet};
//!
//! let exclusions = ExclusionSet::parse_all(["root['lastModifiedDateTime']"])?;
//! let changes = diff(&old_body, &new_body, &exclusions)?;
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: identical inputs produce byte-identical serialized output.
//! - **Order-insensitive sequences**: reordering elements never yields a change.
//! - **Exclusions**: an excluded path never appears, nor do its descendants,
//!   including fields inside sequence elements.
//! - **Absent is not null**: a key missing on one side is reported with that
//!   side omitted, never as `null`.

pub mod engine;
pub mod exclusion;
pub mod model;
pub mod path;

pub use engine::{diff, diff_json};
pub use exclusion::{ExclusionSet, PathPattern, DEFAULT_EXCLUSIONS};
pub use model::{FieldChange, FieldChanges, Side};
pub use path::{FieldPath, Segment};
