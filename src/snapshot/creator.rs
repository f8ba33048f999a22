//! Snapshot creation
//!
//! Creation is pure: it computes hashes and assigns an id, nothing touches
//! the file system until the snapshot is handed to a `SnapshotStore`.
//!
//! Sequence:
//!
//! 1. Check the seed rule (seed present iff deterministic)
//! 2. Check the execution pointer bounds
//! 3. Compute input, step, output and registry hashes
//! 4. Fold them into the chain hash
//! 5. Assign a fresh snapshot id and creation time

use chrono::Utc;
use uuid::Uuid;

use crate::engine::{
    CancellationToken, DecisionEngine, EngineResult, ExecutionOptions, ToolRegistry,
};
use crate::observability::{log_event_with_fields, Event, Timer};
use crate::transcript::{DecisionResult, DecisionSpec};

use super::environment::EnvironmentInfo;
use super::errors::{SnapshotError, SnapshotResult};
use super::record::{
    check_seed_rule, ExecutionPointer, HashStages, Snapshot, SnapshotInput, SnapshotOrigin,
};

/// Generate a fresh snapshot id.
pub fn generate_snapshot_id() -> String {
    Uuid::new_v4().to_string()
}

/// One finished execution, ready to be snapshotted.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Run identifier
    pub run_id: String,
    /// Original or replay
    pub origin: SnapshotOrigin,
    /// Decision spec
    pub spec: DecisionSpec,
    /// Execution options
    pub options: ExecutionOptions,
    /// Engine output
    pub result: DecisionResult,
    /// Tool registry in effect
    pub tool_registry: ToolRegistry,
    /// Engine wall-clock duration
    pub duration_ms: u64,
    /// Whether the run can be reproduced
    pub deterministic: bool,
    /// Seed; present iff deterministic
    pub seed: Option<String>,
    /// Resumability marker
    pub execution_pointer: ExecutionPointer,
    /// Producing environment
    pub environment: EnvironmentInfo,
}

impl Execution {
    /// Run `engine` on `spec` and capture the execution.
    ///
    /// The run is deterministic exactly when `options` carry a seed.
    pub fn run<E: DecisionEngine + ?Sized>(
        engine: &E,
        run_id: &str,
        spec: DecisionSpec,
        options: ExecutionOptions,
        tool_registry: ToolRegistry,
        cancel: &CancellationToken,
    ) -> EngineResult<Self> {
        let timer = Timer::new();
        let run = engine.run_decision(&spec, &options, &tool_registry, cancel)?;
        let deterministic = options.is_deterministic();

        Ok(Self {
            run_id: run_id.to_string(),
            origin: SnapshotOrigin::Original,
            seed: deterministic.then_some(run.seed),
            spec,
            options,
            result: run.result,
            tool_registry,
            duration_ms: timer.elapsed_ms(),
            deterministic,
            execution_pointer: ExecutionPointer::completed(engine.total_steps()),
            environment: EnvironmentInfo::current(engine),
        })
    }
}

/// Build a snapshot from an execution.
pub fn create_snapshot(execution: &Execution) -> SnapshotResult<Snapshot> {
    check_seed_rule(execution.deterministic, execution.seed.as_deref())?;

    let pointer = execution.execution_pointer;
    if pointer.step > pointer.total_steps {
        return Err(SnapshotError::invalid(format!(
            "execution pointer {} beyond {} total steps",
            pointer.step, pointer.total_steps
        )));
    }
    if execution.run_id.is_empty() {
        return Err(SnapshotError::invalid("run id must not be empty"));
    }

    let input = SnapshotInput {
        spec: execution.spec.clone(),
        options: execution.options.clone(),
        tool_registry: execution.tool_registry.clone(),
    };
    let hashes = HashStages::compute(&input, &execution.result)?;

    let snapshot = Snapshot {
        snapshot_id: generate_snapshot_id(),
        run_id: execution.run_id.clone(),
        origin: execution.origin.clone(),
        input,
        result: execution.result.clone(),
        hashes,
        deterministic: execution.deterministic,
        seed: execution.seed.clone(),
        duration_ms: execution.duration_ms,
        created_at: Utc::now(),
        execution_pointer: pointer,
        environment: execution.environment.clone(),
    };

    let chain = snapshot.chain_hash().to_string();
    log_event_with_fields(
        Event::SnapshotCreated,
        &[
            ("run_id", &snapshot.run_id),
            ("snapshot_id", &snapshot.snapshot_id),
            ("chain_hash", &chain),
        ],
    );

    Ok(snapshot)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::engine::{default_tool_registry, make_negotiation_example, SeededEngine};

    /// Deterministic execution of the negotiation example.
    pub fn seeded_execution(run_id: &str, seed: &str) -> Execution {
        Execution::run(
            &SeededEngine::new(),
            run_id,
            make_negotiation_example(),
            ExecutionOptions::with_seed(seed),
            default_tool_registry(),
            &CancellationToken::new(),
        )
        .unwrap()
    }
}
