//! CLI command implementations
//!
//! Commands are thin: load inputs, call the library, turn the outcome into
//! JSON. No command mutates an existing snapshot.

use std::path::Path;

use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::diff::diff_runs;
use crate::engine::{
    default_tool_registry, make_negotiation_example, make_ops_example, CancellationToken,
    ExecutionOptions, SeededEngine, ToolRegistry,
};
use crate::graph::{
    blast_radius, build_graph_from_envelopes, calculate_fragility, DependencyGraph, GraphError,
    GraphValidation,
};
use crate::ledger::{summarize, JsonlLedger, LedgerSource};
use crate::observability::{log_event_with_fields, Event};
use crate::replay::{verify_determinism, ReplayOptions, Replayer};
use crate::snapshot::{
    create_snapshot, ensure_environment, EnvironmentInfo, Execution, SnapshotStore,
};
use crate::transcript::{load_envelopes_from_dir, DecisionSpec};

use super::args::{Command, Fixture, GraphAction, LedgerAction, SnapshotAction};
use super::config::Config;
use super::errors::CliResult;
use super::io::read_json_file;

/// Run one command and return its response payload.
pub fn run_command(command: Command, config: &Config) -> CliResult<Value> {
    match command {
        Command::Graph { action } => graph(action, config),
        Command::Snapshot { action } => snapshot(action, config),
        Command::Replay {
            run_id,
            from_step,
            timeout_ms,
            registry,
            persist,
            strict,
        } => {
            let options = ReplayOptions {
                tool_registry_override: registry
                    .as_deref()
                    .map(read_json_file::<ToolRegistry>)
                    .transpose()?,
                from_step,
                timeout: timeout_ms
                    .map(std::time::Duration::from_millis)
                    .or_else(|| config.replay_timeout()),
                persist,
            };
            replay(&run_id, &options, strict, config)
        }
        Command::Verify { run_id, trials } => verify(&run_id, trials, config),
        Command::Diff { run_a, run_b } => {
            let store = SnapshotStore::new(&config.snapshot_dir);
            to_json(&diff_runs(&store, &run_a, &run_b)?)
        }
        Command::Ledger { action } => ledger(action, config),
    }
}

// ==================
// Graph
// ==================

fn load_graph(config: &Config) -> CliResult<DependencyGraph> {
    let envelopes = load_envelopes_from_dir(&config.envelope_dir)?;
    log_event_with_fields(
        Event::EnvelopesLoaded,
        &[
            ("dir", &config.envelope_dir.display().to_string()),
            ("count", &envelopes.len().to_string()),
        ],
    );
    Ok(build_graph_from_envelopes(envelopes))
}

fn graph(action: GraphAction, config: &Config) -> CliResult<Value> {
    let graph = load_graph(config)?;
    let validation = GraphValidation::of(&graph);

    match action {
        GraphAction::List => {
            validation.warn_if_cyclic("list");
            Ok(json!({
                "nodes": graph.summaries(),
                "node_count": graph.len(),
                "edge_count": graph.edge_count(),
                "cycle_count": validation.cycles().len(),
            }))
        }
        GraphAction::Inspect { hash } => {
            validation.warn_if_cyclic("inspect");
            let summary = graph
                .summary(&hash)
                .ok_or_else(|| GraphError::not_found(&hash))?;
            let transcript = graph.node(&hash).and_then(|node| node.transcript());
            Ok(json!({
                "node": summary,
                "transcript": transcript,
            }))
        }
        GraphAction::Cycles => {
            validation.warn_if_cyclic("cycles");
            Ok(json!({
                "acyclic": validation.is_acyclic(),
                "cycles": validation.cycles(),
            }))
        }
        GraphAction::BlastRadius { hash } => {
            let affected = blast_radius(&graph, &hash)?;
            Ok(json!({
                "hash": hash,
                "count": affected.len(),
                "blast_radius": affected,
            }))
        }
        GraphAction::Fragility { top } => {
            let mut ranking = calculate_fragility(&graph, &config.fragility)?;
            if let Some(top) = top {
                ranking.truncate(top);
            }
            Ok(json!({
                "weights": config.fragility,
                "ranking": ranking,
            }))
        }
    }
}

// ==================
// Snapshots
// ==================

fn snapshot(action: SnapshotAction, config: &Config) -> CliResult<Value> {
    let store = SnapshotStore::new(&config.snapshot_dir);

    match action {
        SnapshotAction::Create {
            run_id,
            spec,
            fixture,
            seed,
            registry,
        } => {
            let spec = match spec {
                Some(path) => read_json_file::<DecisionSpec>(&path)?,
                None => fixture_spec(fixture),
            };
            let registry = load_registry(registry.as_deref())?;
            let run_id = run_id.unwrap_or_else(|| Uuid::new_v4().to_string());

            let execution = Execution::run(
                &SeededEngine::new(),
                &run_id,
                spec,
                ExecutionOptions::with_seed_opt(seed.as_deref()),
                registry,
                &CancellationToken::new(),
            )?;
            let snapshot = create_snapshot(&execution)?;
            let path = store.save(&snapshot)?;

            Ok(json!({
                "run_id": snapshot.run_id,
                "snapshot_id": snapshot.snapshot_id,
                "deterministic": snapshot.deterministic,
                "chain_hash": snapshot.chain_hash(),
                "path": path,
            }))
        }
        SnapshotAction::List => Ok(json!({ "runs": store.list_snapshots()? })),
        SnapshotAction::Show {
            run_id,
            snapshot_id,
            check_env,
        } => {
            let snapshot = match snapshot_id {
                Some(id) => store.load_by_id(&run_id, &id)?,
                None => store.load_snapshot(&run_id)?,
            };
            if check_env {
                ensure_environment(&snapshot, &EnvironmentInfo::current(&SeededEngine::new()))?;
            }
            to_json(&snapshot)
        }
    }
}

fn fixture_spec(fixture: Fixture) -> DecisionSpec {
    match fixture {
        Fixture::Negotiation => make_negotiation_example(),
        Fixture::Ops => make_ops_example(),
    }
}

fn load_registry(path: Option<&Path>) -> CliResult<ToolRegistry> {
    match path {
        Some(path) => read_json_file(path),
        None => Ok(default_tool_registry()),
    }
}

// ==================
// Replay
// ==================

fn replay(run_id: &str, options: &ReplayOptions, strict: bool, config: &Config) -> CliResult<Value> {
    let store = SnapshotStore::new(&config.snapshot_dir);
    let engine = SeededEngine::new();

    let mut result = Replayer::new(&store, &engine).replay(run_id, options)?;
    if strict {
        result = result.certify()?;
    }
    to_json(&result)
}

fn verify(run_id: &str, trials: u32, config: &Config) -> CliResult<Value> {
    let store = SnapshotStore::new(&config.snapshot_dir);
    let engine = SeededEngine::new();
    let replayer = Replayer::new(&store, &engine);
    let options = ReplayOptions {
        timeout: config.replay_timeout(),
        ..ReplayOptions::default()
    };

    let report = verify_determinism(trials, |_| {
        let result = replayer.replay(run_id, &options)?.certify()?;
        Ok(result.replay_snapshot.chain_hash().clone())
    })?;

    Ok(json!({
        "run_id": run_id,
        "verdict": "PASS",
        "trials": report.trials,
        "chain_hash": report.baseline,
    }))
}

// ==================
// Ledger
// ==================

fn ledger(action: LedgerAction, config: &Config) -> CliResult<Value> {
    let ledger = JsonlLedger::new(config.require_ledger_path()?);

    match action {
        LedgerAction::Recent { n, summary } => {
            let artifacts = ledger.list_recent_artifacts(n)?;
            let summary = summary.then(|| summarize(&artifacts));
            Ok(json!({
                "artifacts": artifacts,
                "summary": summary,
            }))
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> CliResult<Value> {
    Ok(serde_json::to_value(value)?)
}
