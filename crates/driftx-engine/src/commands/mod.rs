//! Command orchestration layer.
//!
//! Provides high-level command functions that coordinate snapshot providers,
//! the core aggregator and change log persistence.

pub mod changelog;
pub mod check;
pub mod engine_command;
