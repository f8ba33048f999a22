//! Structural diff of two runs
//!
//! Independent of hash equality: two runs with different seeds may hash
//! differently yet agree structurally, and the reverse never happens.

use serde::Serialize;

use crate::observability::{log_event_with_fields, Event, ObservationScope};
use crate::snapshot::{Snapshot, SnapshotResult, SnapshotStore};
use crate::transcript::{BranchNode, FlipCondition, LensEvaluation, Transition};

use super::section::{diff_keyed, diff_values, SectionDiff};

/// Differences in the explanation section.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExplanationDiff {
    /// Reasoning statements, by value
    pub reasoning: SectionDiff<String>,
    /// Flip conditions, by value
    pub flip_conditions: SectionDiff<FlipCondition>,
}

impl ExplanationDiff {
    /// True when both parts are identical
    pub fn is_empty(&self) -> bool {
        self.reasoning.is_empty() && self.flip_conditions.is_empty()
    }
}

/// Structural comparison of two snapshots' outputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunDiff {
    /// Run on the left
    pub run_a: String,
    /// Run on the right
    pub run_b: String,
    /// Whether the input hashes agree
    pub input_match: bool,
    /// Whether the output hashes agree
    pub output_match: bool,
    /// Evaluated actions, by value
    pub actions: SectionDiff<String>,
    /// Graph nodes, by id
    pub graph_nodes: SectionDiff<BranchNode>,
    /// Graph edges, by (from, to, label)
    pub graph_edges: SectionDiff<Transition>,
    /// Lens evaluations, by lens
    pub evaluations: SectionDiff<LensEvaluation>,
    /// Explanation
    pub explanation: ExplanationDiff,
}

impl RunDiff {
    /// True when no section differs
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
            && self.graph_nodes.is_empty()
            && self.graph_edges.is_empty()
            && self.evaluations.is_empty()
            && self.explanation.is_empty()
    }

    /// Total differences across sections
    pub fn change_count(&self) -> usize {
        self.actions.len()
            + self.graph_nodes.len()
            + self.graph_edges.len()
            + self.evaluations.len()
            + self.explanation.reasoning.len()
            + self.explanation.flip_conditions.len()
    }
}

/// Diff two snapshots. Pure.
pub fn diff_snapshots(a: &Snapshot, b: &Snapshot) -> RunDiff {
    let left = &a.result;
    let right = &b.result;

    RunDiff {
        run_a: a.run_id.clone(),
        run_b: b.run_id.clone(),
        input_match: a.hashes.input_hash == b.hashes.input_hash,
        output_match: a.hashes.output_hash == b.hashes.output_hash,
        actions: diff_values(&left.actions, &right.actions),
        graph_nodes: diff_keyed(&left.graph.nodes, &right.graph.nodes, |n| n.id.clone()),
        graph_edges: diff_values(&left.graph.edges, &right.graph.edges),
        evaluations: diff_keyed(&left.evaluations, &right.evaluations, |e| e.lens.clone()),
        explanation: ExplanationDiff {
            reasoning: diff_values(&left.explanation.reasoning, &right.explanation.reasoning),
            flip_conditions: diff_values(
                &left.explanation.flip_conditions,
                &right.explanation.flip_conditions,
            ),
        },
    }
}

/// Diff the original snapshots of two runs.
pub fn diff_runs(store: &SnapshotStore, run_a: &str, run_b: &str) -> SnapshotResult<RunDiff> {
    let scope = ObservationScope::with_fields("DIFF", &[("run_a", run_a), ("run_b", run_b)]);

    let loaded = store
        .load_snapshot(run_a)
        .and_then(|a| store.load_snapshot(run_b).map(|b| (a, b)));
    let (a, b) = match loaded {
        Ok(pair) => pair,
        Err(err) => {
            scope.fail(err.code().code());
            return Err(err);
        }
    };

    let diff = diff_snapshots(&a, &b);
    let changes = diff.change_count().to_string();
    log_event_with_fields(
        Event::DiffComplete,
        &[("run_a", run_a), ("run_b", run_b), ("changes", &changes)],
    );
    scope.complete();
    Ok(diff)
}
