//! Ledger artifacts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How far one assumption is from flipping a decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlipDistance {
    /// Assumption identifier
    pub assumption_id: String,
    /// Magnitude of change needed to flip the decision
    pub distance: f64,
}

/// One execution record listed by the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Decision identifier
    pub decision_id: String,
    /// When the execution was recorded
    pub timestamp: DateTime<Utc>,
    /// Wall-clock duration, when the ledger recorded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_duration_ms: Option<u64>,
    /// Flip distances per assumption
    #[serde(default)]
    pub flip_distance_summary: Vec<FlipDistance>,
}
