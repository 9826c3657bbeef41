//! Parsing and identity resolution for a listed generation.

use crate::errors::DriftError;
use crate::snapshot::category::Category;
use crate::snapshot::identity::{display_name_of, resolve_identity, Identity};
use crate::snapshot::provider::{Generation, Payload, SnapshotFile};
use crate::value::Node;
use crate::warning::{GenerationSide, Warning};
use crate::{log_op_end, log_op_start};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One configuration object at export time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub identity: Identity,
    pub display_name: String,
    pub relative_path: String,
    pub body: Node,
}

/// A generation after every file has been parsed and identified.
#[derive(Debug, Clone, Default)]
pub struct LoadedGeneration {
    pub reference: Option<String>,
    pub categories: BTreeSet<Category>,
    pub snapshots: BTreeMap<Identity, Snapshot>,
    /// Files that were skipped, in relative path order
    pub warnings: Vec<Warning>,
    /// Relative paths of files that could not be parsed or identified
    pub failed_paths: BTreeSet<String>,
}

/// Parse a payload into a document body.
///
/// A leading UTF-8 byte order mark is tolerated.
///
/// # Errors
///
/// `Unreadable`, `InvalidJson` or `NotAnObject`.
pub fn parse_payload(relative_path: &str, payload: &Payload) -> Result<Node, DriftError> {
    let node = match payload {
        Payload::Unreadable(reason) => {
            return Err(DriftError::Unreadable {
                path: relative_path.to_string(),
                reason: reason.clone(),
            })
        }
        Payload::Document(node) => node.clone(),
        Payload::Bytes(bytes) => {
            let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
            let value: serde_json::Value =
                serde_json::from_slice(bytes).map_err(|e| DriftError::InvalidJson {
                    path: relative_path.to_string(),
                    reason: e.to_string(),
                })?;
            Node::from(value)
        }
    };

    if !node.is_mapping() {
        return Err(DriftError::NotAnObject {
            path: relative_path.to_string(),
        });
    }
    Ok(node)
}

/// Parse one file and resolve its identity.
///
/// # Errors
///
/// Any parse or identity failure for this file.
pub fn load_snapshot(file: &SnapshotFile) -> Result<Snapshot, DriftError> {
    let body = parse_payload(&file.relative_path, &file.payload)?;
    let identity = resolve_identity(&file.relative_path, &body)?;
    Ok(Snapshot {
        identity,
        display_name: display_name_of(&body),
        relative_path: file.relative_path.clone(),
        body,
    })
}

/// Load every file of a generation.
///
/// Files are processed in relative path order. Files that fail to parse or
/// identify become warnings. When two files share an identity the one with
/// the smaller relative path is kept.
pub fn load_generation(generation: &Generation, side: GenerationSide) -> LoadedGeneration {
    let start = Instant::now();
    log_op_start!("load_generation", generation = side.as_str());

    let mut files: Vec<&SnapshotFile> = generation.files.iter().collect();
    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    let mut loaded = LoadedGeneration {
        reference: generation.reference.clone(),
        categories: generation.categories.clone(),
        ..LoadedGeneration::default()
    };

    for file in files {
        let result = load_snapshot(file).and_then(|snapshot| {
            match loaded.snapshots.get(&snapshot.identity) {
                Some(kept) => Err(DriftError::DuplicateIdentity {
                    path: snapshot.relative_path.clone(),
                    identity: snapshot.identity.to_string(),
                    kept: kept.relative_path.clone(),
                }),
                None => Ok(snapshot),
            }
        });

        match result {
            Ok(snapshot) => {
                loaded.snapshots.insert(snapshot.identity.clone(), snapshot);
            }
            Err(err) => {
                if !matches!(err, DriftError::DuplicateIdentity { .. }) {
                    loaded.failed_paths.insert(file.relative_path.clone());
                }
                // load_snapshot only fails per entry
                if let Some(warning) = Warning::from_error(side, &err) {
                    warning.emit("load_generation");
                    loaded.warnings.push(warning);
                }
            }
        }
    }

    log_op_end!(
        "load_generation",
        duration_ms = start.elapsed().as_millis() as u64,
        generation = side.as_str(),
        snapshots = loaded.snapshots.len(),
        warnings = loaded.warnings.len()
    );
    loaded
}
