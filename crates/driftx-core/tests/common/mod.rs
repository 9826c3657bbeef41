#![allow(dead_code)]

use driftx_core::snapshot::{Generation, InMemoryProvider, Payload, SnapshotProvider};
use serde_json::{json, Value};

/// Build a generation from `(relative_path, body)` pairs.
pub fn generation(files: &[(&str, Value)]) -> Generation {
    provider(files).list_snapshots().unwrap()
}

pub fn provider(files: &[(&str, Value)]) -> InMemoryProvider {
    files
        .iter()
        .fold(InMemoryProvider::new(), |p, (path, body)| {
            p.with_json(*path, body)
        })
}

/// Generation with one extra file whose bytes are not valid JSON.
pub fn generation_with_garbage(files: &[(&str, Value)], garbage_path: &str) -> Generation {
    provider(files)
        .with_file(garbage_path, Payload::Bytes(b"{\"id\": \"broken\",".to_vec()))
        .list_snapshots()
        .unwrap()
}

/// A compliance policy body as the exporter writes it.
pub fn policy(id: &str, min_length: u32) -> Value {
    json!({
        "id": id,
        "displayName": format!("Policy {}", id),
        "lastModifiedDateTime": "2024-05-01T08:00:00Z",
        "passwordRequired": true,
        "passwordMinimumLength": min_length,
        "scheduledActionsForRule": [
            {"ruleName": "PasswordRequired", "gracePeriodHours": 0},
            {"ruleName": "DeviceLock", "gracePeriodHours": 24}
        ]
    })
}
