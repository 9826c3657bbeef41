//! Core types shared across driftx facilities
//!
//! This crate provides foundational types used by the error, logging and
//! orchestration layers:
//!
//! - **Correlation types**: RunId, identifying one change-log run
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::RunId;
