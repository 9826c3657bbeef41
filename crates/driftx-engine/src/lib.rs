//! driftx Engine - Orchestration layer
//!
//! Resolves run configuration and coordinates snapshot providers, change set
//! aggregation (in `driftx-core`) and change log persistence (in
//! `driftx-store`).

pub mod commands;
pub mod config;

pub use commands::engine_command::{apply_engine_command, EngineCommand, EngineCommandResult};
pub use config::RunConfig;
