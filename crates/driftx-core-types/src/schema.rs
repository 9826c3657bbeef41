//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_RUN_ID: &str = "run_id";

// Snapshot identifiers
pub const FIELD_CATEGORY: &str = "category";
pub const FIELD_OBJECT_ID: &str = "object_id";
pub const FIELD_PATH: &str = "path";
pub const FIELD_GENERATION: &str = "generation";

// Result sizes
pub const FIELD_ADDED: &str = "added";
pub const FIELD_REMOVED: &str = "removed";
pub const FIELD_MODIFIED: &str = "modified";
pub const FIELD_WARNINGS: &str = "warnings";

// Error / warning fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";
pub const FIELD_WARNING_KIND: &str = "warning_kind";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
pub const EVENT_WARNING: &str = "warning";
