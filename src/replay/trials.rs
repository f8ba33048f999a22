//! Repeated-trial determinism check
//!
//! Trial 1 sets the baseline; every later trial must reproduce it. The
//! check stops at the first drift.

use serde::Serialize;

use crate::hashing::Digest;
use crate::observability::{log_event_with_fields, Event};

use super::errors::ReplayError;

/// Outcome of a drift-free trial series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialReport {
    /// Trials executed
    pub trials: u32,
    /// Hash every trial produced
    pub baseline: Digest,
}

/// Run `trial` for trials `1..=n` and require identical hashes.
///
/// At least one trial always runs.
pub fn verify_determinism<F>(n: u32, mut trial: F) -> Result<TrialReport, ReplayError>
where
    F: FnMut(u32) -> Result<Digest, ReplayError>,
{
    let n = n.max(1);
    let baseline = trial(1)?;
    for index in 2..=n {
        let actual = trial(index)?;
        if actual != baseline {
            log_event_with_fields(
                Event::ReplayFail,
                &[
                    ("trial", &index.to_string()),
                    ("baseline", &baseline.to_string()),
                    ("actual", &actual.to_string()),
                ],
            );
            return Err(ReplayError::Drift {
                trial: index,
                baseline: baseline.to_string(),
                actual: actual.to_string(),
            });
        }
    }

    Ok(TrialReport { trials: n, baseline })
}
