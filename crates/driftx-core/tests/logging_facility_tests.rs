#![allow(clippy::unwrap_used, clippy::expect_used)]

use driftx_core::changelog::aggregate;
use driftx_core::diff::ExclusionSet;
use driftx_core::errors::{ExError, ExErrorKind};
use driftx_core::logging_facility::test_capture::init_test_capture;
use driftx_core::snapshot::{InMemoryProvider, Payload, SnapshotProvider};
use driftx_core::{log_op_end, log_op_error, log_op_start};
use driftx_core_types::schema::{EVENT_END, EVENT_END_ERROR, EVENT_START, EVENT_WARNING};
use tracing::Level;

#[test]
fn test_log_op_start_macro() {
    let capture = init_test_capture();
    let op_name = "test_log_op_start_unique_1";

    log_op_start!(op_name, run_id = "r-1");

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_START));
    assert_eq!(events[0].field("run_id"), Some("r-1"));
}

#[test]
fn test_log_op_end_macro_carries_counts() {
    let capture = init_test_capture();
    let op_name = "test_log_op_end_unique_2";

    log_op_end!(op_name, duration_ms = 42, added = 3);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1, "Should have exactly one end event");
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END));
    assert_eq!(events[0].field("duration_ms"), Some("42"));
    assert_eq!(events[0].field("added"), Some("3"));
}

#[test]
fn test_log_op_error_macro_records_code() {
    let capture = init_test_capture();
    let op_name = "test_log_op_error_unique_3";

    let err = ExError::new(ExErrorKind::Write).with_message("disk full");
    log_op_error!(op_name, err, duration_ms = 7);

    let events = capture.events_for_op(op_name);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, Level::ERROR);
    assert_eq!(events[0].event.as_deref(), Some(EVENT_END_ERROR));
    assert_eq!(events[0].field("err_code"), Some("ERR_WRITE"));
}

#[test]
fn test_skipped_snapshot_emits_warning_event() {
    let capture = init_test_capture();
    let garbage_path = "Scripts/logging-garbage.json";

    let current = InMemoryProvider::new()
        .with_file(garbage_path, Payload::Bytes(b"][".to_vec()))
        .list_snapshots()
        .unwrap();
    let set = aggregate(None, &current, &ExclusionSet::empty()).unwrap();
    assert_eq!(set.warnings.len(), 1);

    let warnings: Vec<_> = capture
        .events()
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_WARNING) && e.field("path") == Some(garbage_path))
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].level, Level::WARN);
    assert_eq!(warnings[0].field("warning_kind"), Some("parse"));
    assert_eq!(warnings[0].field("generation"), Some("current"));
}

#[test]
fn test_load_generation_is_bracketed() {
    let capture = init_test_capture();
    let current = InMemoryProvider::new().list_snapshots().unwrap();
    aggregate(None, &current, &ExclusionSet::empty()).unwrap();

    capture.assert_event_exists("load_generation", EVENT_START);
    capture.assert_event_exists("load_generation", EVENT_END);
    capture.assert_event_exists("reconcile", EVENT_END);
}
