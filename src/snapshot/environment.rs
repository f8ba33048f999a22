//! Snapshot environment fingerprint
//!
//! A snapshot records the engine and hash format it was produced under.
//! Replaying or restoring under a different environment is refused up front
//! instead of surfacing later as a spurious divergence.

use serde::{Deserialize, Serialize};

use crate::engine::DecisionEngine;
use crate::hashing::HASH_ALGORITHM;

use super::errors::{SnapshotError, SnapshotResult};
use super::Snapshot;

/// Current snapshot file format
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Environment a snapshot was produced in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentInfo {
    /// Engine name
    pub engine_name: String,
    /// Engine version
    pub engine_version: String,
    /// Digest algorithm of every stored hash
    pub hash_algorithm: String,
    /// Snapshot file format
    pub format_version: u32,
}

impl EnvironmentInfo {
    /// Environment of the running process for `engine`
    pub fn current<E: DecisionEngine + ?Sized>(engine: &E) -> Self {
        Self {
            engine_name: engine.name().to_string(),
            engine_version: engine.version().to_string(),
            hash_algorithm: HASH_ALGORITHM.to_string(),
            format_version: SNAPSHOT_FORMAT_VERSION,
        }
    }
}

/// Outcome of an environment comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentCheck {
    /// Whether the environments are compatible
    pub ok: bool,
    /// First incompatibility found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl EnvironmentCheck {
    fn pass() -> Self {
        Self {
            ok: true,
            reason: None,
        }
    }

    fn fail(field: &str, recorded: &str, current: &str) -> Self {
        Self {
            ok: false,
            reason: Some(format!(
                "{} differs: snapshot recorded '{}', current is '{}'",
                field, recorded, current
            )),
        }
    }
}

/// Compare a snapshot's recorded environment with `current`.
///
/// Fields are checked in order: format version, hash algorithm, engine
/// name, engine version. The first difference is reported.
pub fn validate_snapshot_environment(
    snapshot: &Snapshot,
    current: &EnvironmentInfo,
) -> EnvironmentCheck {
    let recorded = &snapshot.environment;

    if recorded.format_version != current.format_version {
        return EnvironmentCheck::fail(
            "format_version",
            &recorded.format_version.to_string(),
            &current.format_version.to_string(),
        );
    }
    let fields = [
        ("hash_algorithm", &recorded.hash_algorithm, &current.hash_algorithm),
        ("engine_name", &recorded.engine_name, &current.engine_name),
        ("engine_version", &recorded.engine_version, &current.engine_version),
    ];
    for (field, recorded, current) in fields {
        if recorded != current {
            return EnvironmentCheck::fail(field, recorded, current);
        }
    }
    EnvironmentCheck::pass()
}

/// Fail with `TRIB_SNAPSHOT_ENVIRONMENT_MISMATCH` on an incompatible environment.
pub fn ensure_environment(snapshot: &Snapshot, current: &EnvironmentInfo) -> SnapshotResult<()> {
    let check = validate_snapshot_environment(snapshot, current);
    if check.ok {
        return Ok(());
    }
    Err(
        SnapshotError::environment_mismatch(check.reason.unwrap_or_default())
            .with_details(format!("snapshot {}", snapshot.snapshot_id)),
    )
}
