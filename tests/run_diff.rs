//! Run Diff Tests
//!
//! Diff is structural and independent of hash equality:
//! - identical runs diff empty even under different run ids
//! - one extra action is exactly one addition, nowhere else
//! - different specs show up per section

use tempfile::TempDir;

use tribunal::diff::{diff_runs, diff_snapshots};
use tribunal::engine::{
    default_tool_registry, make_negotiation_example, make_ops_example, CancellationToken,
    ExecutionOptions, SeededEngine,
};
use tribunal::snapshot::{create_snapshot, Execution, Snapshot, SnapshotStore};
use tribunal::transcript::DecisionSpec;

fn snapshot(run_id: &str, spec: DecisionSpec, seed: &str) -> Snapshot {
    let execution = Execution::run(
        &SeededEngine::new(),
        run_id,
        spec,
        ExecutionOptions::with_seed(seed),
        default_tool_registry(),
        &CancellationToken::new(),
    )
    .unwrap();
    create_snapshot(&execution).unwrap()
}

/// Same spec and seed under two run ids: nothing differs.
#[test]
fn test_identical_runs_diff_empty() {
    let a = snapshot("a", make_ops_example(), "s1");
    let b = snapshot("b", make_ops_example(), "s1");

    let diff = diff_snapshots(&a, &b);
    assert!(diff.is_empty());
    assert!(diff.input_match && diff.output_match);
}

/// One extra action in B's result: one addition in actions, nothing else.
#[test]
fn test_one_extra_action() {
    let a = snapshot("a", make_negotiation_example(), "s1");
    let mut b = snapshot("b", make_negotiation_example(), "s1");
    b.result.actions.push("escalate to legal".to_string());

    let diff = diff_snapshots(&a, &b);
    assert_eq!(diff.actions.added, vec!["escalate to legal".to_string()]);
    assert!(diff.actions.removed.is_empty());
    assert!(diff.actions.changed.is_empty());
    assert!(diff.graph_nodes.is_empty());
    assert!(diff.graph_edges.is_empty());
    assert!(diff.evaluations.is_empty());
    assert!(diff.explanation.is_empty());
    assert!(diff.input_match);
    assert!(!diff.output_match);
}

/// A different seed keeps the graph but may move the evaluations.
#[test]
fn test_different_seed_keeps_graph() {
    let a = snapshot("a", make_negotiation_example(), "s1");
    let b = snapshot("b", make_negotiation_example(), "s2");

    let diff = diff_snapshots(&a, &b);
    assert!(!diff.input_match);
    assert!(diff.actions.is_empty());
    assert!(diff.graph_nodes.is_empty());
    assert!(diff.graph_edges.is_empty());
    assert!(diff.evaluations.added.is_empty());
    assert!(diff.evaluations.removed.is_empty());
}

/// Unrelated specs differ in actions and in graph nodes.
#[test]
fn test_different_specs() {
    let a = snapshot("a", make_negotiation_example(), "s1");
    let b = snapshot("b", make_ops_example(), "s1");

    let diff = diff_snapshots(&a, &b);
    assert!(!diff.is_empty());
    assert!(!diff.actions.added.is_empty());
    assert!(!diff.actions.removed.is_empty());
    assert!(!diff.graph_nodes.changed.is_empty());
    assert!(diff.change_count() >= diff.actions.len());
}

/// diff_runs reads the originals from the store.
#[test]
fn test_diff_runs_from_store() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(dir.path());
    store.save(&snapshot("a", make_ops_example(), "s1")).unwrap();
    store.save(&snapshot("b", make_negotiation_example(), "s1")).unwrap();

    let diff = diff_runs(&store, "a", "b").unwrap();
    assert_eq!(diff.run_a, "a");
    assert_eq!(diff.run_b, "b");
    assert!(!diff.is_empty());

    let reverse = diff_runs(&store, "b", "a").unwrap();
    assert_eq!(reverse.actions.added, diff.actions.removed);
    assert_eq!(reverse.actions.removed, diff.actions.added);
}

/// Missing run surfaces as NotFound.
#[test]
fn test_diff_runs_missing() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(dir.path());
    let err = diff_runs(&store, "a", "b").unwrap_err();
    assert!(err.is_not_found());
}
