//! Execution snapshots
//!
//! A snapshot is an immutable record of one engine execution: its input,
//! its output, and a tamper-evident chain of hashes over both.
//!
//! # Design Principles
//!
//! - Write-once: replay produces a new snapshot, never edits one
//! - Every stored hash is recomputable from stored content
//! - Seed present iff the run is deterministic
//! - Environment recorded and checked before reuse
//!
//! # Hash stages
//!
//! ```text
//! input_hash   = H(spec, options)
//! step_hashes  = [H(graph step), H(evaluations), H(explanation)]
//! output_hash  = H(result)
//! chain_hash   = fold(input_hash, step_hashes…, output_hash, H(tool registry))
//! ```

mod creator;
mod environment;
mod errors;
mod record;
mod store;

pub use creator::{create_snapshot, generate_snapshot_id, Execution};
pub use environment::{
    ensure_environment, validate_snapshot_environment, EnvironmentCheck, EnvironmentInfo,
    SNAPSHOT_FORMAT_VERSION,
};
pub use errors::{Severity, SnapshotError, SnapshotErrorCode, SnapshotResult};
pub use record::{ExecutionPointer, HashStages, Snapshot, SnapshotInput, SnapshotOrigin};
pub use store::SnapshotStore;

#[cfg(test)]
pub(crate) use creator::test_support;

#[cfg(test)]
mod tests {
    use super::test_support::seeded_execution;
    use super::*;

    #[test]
    fn test_environment_check_reports_first_difference() {
        let snapshot = create_snapshot(&seeded_execution("run-1", "s1")).unwrap();
        let mut current = snapshot.environment.clone();
        assert!(validate_snapshot_environment(&snapshot, &current).ok);

        current.engine_version = "9.9.9".to_string();
        current.engine_name = "other".to_string();
        let check = validate_snapshot_environment(&snapshot, &current);
        assert!(!check.ok);
        assert!(check.reason.unwrap().contains("engine_name"));

        let err = ensure_environment(&snapshot, &current).unwrap_err();
        assert_eq!(err.code(), SnapshotErrorCode::TribSnapshotEnvironmentMismatch);
    }

    #[test]
    fn test_format_version_checked_first() {
        let snapshot = create_snapshot(&seeded_execution("run-1", "s1")).unwrap();
        let mut current = snapshot.environment.clone();
        current.format_version = SNAPSHOT_FORMAT_VERSION + 1;
        current.engine_name = "other".to_string();

        let check = validate_snapshot_environment(&snapshot, &current);
        assert!(check.reason.unwrap().contains("format_version"));
    }

    #[test]
    fn test_snapshot_json_round_trip_keeps_integrity() {
        let snapshot = create_snapshot(&seeded_execution("run-1", "s1")).unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
        parsed.verify_integrity().unwrap();
    }
}
