//! Summary over a listing of artifacts

use std::collections::BTreeMap;

use serde::Serialize;

use super::artifact::{Artifact, FlipDistance};

/// Aggregate view of recent executions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSummary {
    /// Artifacts summarized
    pub count: usize,
    /// Mean duration over artifacts that recorded one
    pub mean_duration_ms: Option<f64>,
    /// Smallest flip distance seen per assumption, tightest first
    pub tightest_flips: Vec<FlipDistance>,
}

/// Summarize `artifacts`.
pub fn summarize(artifacts: &[Artifact]) -> LedgerSummary {
    let durations: Vec<u64> = artifacts
        .iter()
        .filter_map(|a| a.execution_duration_ms)
        .collect();
    let mean_duration_ms = if durations.is_empty() {
        None
    } else {
        Some(durations.iter().sum::<u64>() as f64 / durations.len() as f64)
    };

    let mut tightest: BTreeMap<&str, f64> = BTreeMap::new();
    for flip in artifacts.iter().flat_map(|a| &a.flip_distance_summary) {
        tightest
            .entry(flip.assumption_id.as_str())
            .and_modify(|d| *d = d.min(flip.distance))
            .or_insert(flip.distance);
    }
    let mut tightest_flips: Vec<FlipDistance> = tightest
        .into_iter()
        .map(|(id, distance)| FlipDistance {
            assumption_id: id.to_string(),
            distance,
        })
        .collect();
    tightest_flips.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.assumption_id.cmp(&b.assumption_id))
    });

    LedgerSummary {
        count: artifacts.len(),
        mean_duration_ms,
        tightest_flips,
    }
}
