//! Structured logging facility for driftx
//!
//! - Single initialization point via `init(profile)`
//! - Operation bracketing macros (`log_op_start!`, `log_op_end!`, `log_op_error!`)
//! - Test capture mode for deterministic assertions
//!
//! Output always goes to stderr; stdout belongs to command results.
//!
//! # Usage
//!
//! ```rust
//! use driftx_core::logging_facility::{init, Profile};
//!
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
