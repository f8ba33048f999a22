//! Replay state machine
//!
//! ```text
//! LOADING → RECOMPUTING → COMPARING → PASS
//!                                  ↘ FAIL
//! ```
//!
//! Errors abort from whichever state they occur in; they are not states.

use std::fmt;

use serde::Serialize;

use crate::observability::{log_event_with_fields, Event};

/// Replay states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplayState {
    /// Loading and validating the original snapshot
    Loading,
    /// Re-running the engine
    Recomputing,
    /// Comparing hash stages
    Comparing,
    /// Every stage matched
    Pass,
    /// Some stage diverged
    Fail,
}

impl ReplayState {
    /// Returns the string form of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplayState::Loading => "LOADING",
            ReplayState::Recomputing => "RECOMPUTING",
            ReplayState::Comparing => "COMPARING",
            ReplayState::Pass => "PASS",
            ReplayState::Fail => "FAIL",
        }
    }

    /// Whether the state ends a replay
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReplayState::Pass | ReplayState::Fail)
    }

    /// Legal successor states
    pub fn can_transition_to(&self, next: ReplayState) -> bool {
        matches!(
            (self, next),
            (ReplayState::Loading, ReplayState::Recomputing)
                | (ReplayState::Recomputing, ReplayState::Comparing)
                | (ReplayState::Comparing, ReplayState::Pass)
                | (ReplayState::Comparing, ReplayState::Fail)
        )
    }
}

impl fmt::Display for ReplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tracks one replay's progress and logs every transition.
#[derive(Debug)]
pub(crate) struct StateTracker {
    run_id: String,
    state: ReplayState,
    history: Vec<ReplayState>,
}

impl StateTracker {
    /// Start in LOADING
    pub(crate) fn start(run_id: &str) -> Self {
        let tracker = Self {
            run_id: run_id.to_string(),
            state: ReplayState::Loading,
            history: vec![ReplayState::Loading],
        };
        tracker.log();
        tracker
    }

    /// Move to `next`. Transitions are driven by the replayer in a fixed
    /// order, so an illegal one is a programming error caught in debug builds.
    pub(crate) fn advance(&mut self, next: ReplayState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal replay transition {} -> {}",
            self.state,
            next
        );
        self.state = next;
        self.history.push(next);
        self.log();
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> ReplayState {
        self.state
    }

    pub(crate) fn into_history(self) -> Vec<ReplayState> {
        self.history
    }

    fn log(&self) {
        log_event_with_fields(
            Event::ReplayState,
            &[("run_id", &self.run_id), ("state", self.state.as_str())],
        );
    }
}
