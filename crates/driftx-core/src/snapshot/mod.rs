//! Snapshots, generations and identity.
//!
//! ## Responsibilities
//!
//! - Name export categories and resolve `(category, objectId)` identities
//! - Define the provider abstraction a generation is listed through
//! - Parse and identify every file of a generation, downgrading per-file
//!   failures to warnings
//!
//! ## Non-Responsibilities
//!
//! - Reading directories or git history (handled by `driftx-store`)
//! - Comparing generations (see [`crate::changelog`])

pub mod category;
pub mod identity;
pub mod load;
pub mod provider;

pub use category::Category;
pub use identity::{category_of, display_name_of, resolve_identity, Identity};
pub use load::{load_generation, load_snapshot, parse_payload, LoadedGeneration, Snapshot};
pub use provider::{
    check_compatible, Generation, InMemoryProvider, Payload, SnapshotFile, SnapshotProvider,
};
