//! Observable events
//!
//! Events are explicit and typed; the string form is what lands in the
//! `event` field of a log line.

use std::fmt;

/// Observable events in tribunal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded
    ConfigLoaded,

    // Transcripts
    /// Envelopes loaded from a directory
    EnvelopesLoaded,

    // Graph
    /// Dependency graph constructed
    GraphBuilt,
    /// Cycles present on a read-only path; execution continues
    GraphCycleWarning,
    /// Analytics refused because the graph is cyclic
    GraphCycleRejected,

    // Snapshots
    /// Snapshot created in memory
    SnapshotCreated,
    /// Snapshot persisted to the store
    SnapshotSaved,

    // Replay
    /// Replay state machine transition
    ReplayState,
    /// Replay reproduced every hash stage
    ReplayPass,
    /// Replay diverged at some hash stage
    ReplayFail,

    // Diff
    /// Structural diff computed
    DiffComplete,

    // Ledger
    /// Artifacts listed from the ledger
    LedgerListed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::EnvelopesLoaded => "ENVELOPES_LOADED",
            Event::GraphBuilt => "GRAPH_BUILT",
            Event::GraphCycleWarning => "GRAPH_CYCLE_WARNING",
            Event::GraphCycleRejected => "GRAPH_CYCLE_REJECTED",
            Event::SnapshotCreated => "SNAPSHOT_CREATED",
            Event::SnapshotSaved => "SNAPSHOT_SAVED",
            Event::ReplayState => "REPLAY_STATE",
            Event::ReplayPass => "REPLAY_PASS",
            Event::ReplayFail => "REPLAY_FAIL",
            Event::DiffComplete => "DIFF_COMPLETE",
            Event::LedgerListed => "LEDGER_LISTED",
        }
    }

    /// Returns true if this event should be logged above INFO
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Event::GraphCycleWarning | Event::GraphCycleRejected | Event::ReplayFail
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_are_upper_snake() {
        let events = [
            Event::ConfigLoaded,
            Event::EnvelopesLoaded,
            Event::GraphBuilt,
            Event::GraphCycleWarning,
            Event::GraphCycleRejected,
            Event::SnapshotCreated,
            Event::SnapshotSaved,
            Event::ReplayState,
            Event::ReplayPass,
            Event::ReplayFail,
            Event::DiffComplete,
            Event::LedgerListed,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_warning_events() {
        assert!(Event::GraphCycleWarning.is_warning());
        assert!(Event::ReplayFail.is_warning());
        assert!(!Event::ReplayPass.is_warning());
    }
}
