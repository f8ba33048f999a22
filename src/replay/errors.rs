//! # Replay Errors

use thiserror::Error;

use crate::engine::{EngineError, EngineErrorCode};
use crate::snapshot::SnapshotError;

use super::compare::HashStage;

/// Replay errors
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("No snapshot recorded for run: {0}")]
    NotFound(String),

    #[error("Run {0} was not deterministic; replay cannot certify it")]
    NonDeterministic(String),

    #[error("Environment mismatch: {0}")]
    EnvironmentMismatch(String),

    #[error("Replay timed out after {0}ms")]
    Timeout(u64),

    #[error("Replay cancelled")]
    Cancelled,

    #[error("Cannot resume from step {from_step}; recorded pointer is at step {recorded}")]
    InvalidStep { from_step: u32, recorded: u32 },

    #[error("Divergence at {stage} stage: expected {expected}, got {actual}")]
    Divergence {
        stage: HashStage,
        expected: String,
        actual: String,
    },

    #[error("Determinism drift at trial {trial}: baseline {baseline}, got {actual}")]
    Drift {
        trial: u32,
        baseline: String,
        actual: String,
    },

    #[error("Engine error: {0}")]
    Engine(EngineError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),
}

impl ReplayError {
    /// Stable error code for CLI responses
    pub fn code(&self) -> &'static str {
        match self {
            ReplayError::NotFound(_) => "TRIB_REPLAY_NOT_FOUND",
            ReplayError::NonDeterministic(_) => "TRIB_REPLAY_NON_DETERMINISTIC",
            ReplayError::EnvironmentMismatch(_) => "TRIB_REPLAY_ENVIRONMENT_MISMATCH",
            ReplayError::Timeout(_) => "TRIB_REPLAY_TIMEOUT",
            ReplayError::Cancelled => "TRIB_REPLAY_CANCELLED",
            ReplayError::InvalidStep { .. } => "TRIB_REPLAY_INVALID_STEP",
            ReplayError::Divergence { .. } => "TRIB_REPLAY_DIVERGENCE",
            ReplayError::Drift { .. } => "TRIB_REPLAY_DRIFT",
            ReplayError::Engine(err) => err.code().code(),
            ReplayError::Snapshot(err) => err.code().code(),
        }
    }

    /// Map an engine failure, given the timeout that was in force.
    pub fn from_engine(err: EngineError, timeout_ms: Option<u64>) -> Self {
        match err.code() {
            EngineErrorCode::TribEngineCancelled => ReplayError::Cancelled,
            EngineErrorCode::TribEngineTimeout => ReplayError::Timeout(timeout_ms.unwrap_or(0)),
            _ => ReplayError::Engine(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(ReplayError::NotFound("r".into()).code(), "TRIB_REPLAY_NOT_FOUND");
        assert_eq!(ReplayError::Timeout(10).code(), "TRIB_REPLAY_TIMEOUT");
        assert_eq!(
            ReplayError::Snapshot(SnapshotError::run_not_found("r")).code(),
            "TRIB_SNAPSHOT_NOT_FOUND"
        );
    }

    #[test]
    fn test_engine_interrupts_map_to_distinct_kinds() {
        let cancelled = ReplayError::from_engine(EngineError::cancelled("graph"), Some(5));
        assert!(matches!(cancelled, ReplayError::Cancelled));

        let timeout = ReplayError::from_engine(EngineError::timeout("graph"), Some(5));
        assert!(matches!(timeout, ReplayError::Timeout(5)));

        let other = ReplayError::from_engine(EngineError::invalid_spec("no actions"), None);
        assert!(matches!(other, ReplayError::Engine(_)));
    }

    #[test]
    fn test_divergence_display_names_stage() {
        let err = ReplayError::Divergence {
            stage: HashStage::Step(1),
            expected: "sha256:aa".into(),
            actual: "sha256:bb".into(),
        };
        assert!(err.to_string().contains("step 1 (evaluations)"));
    }
}
