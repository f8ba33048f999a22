//! Replay of a recorded run
//!
//! Loading order matters: a missing run is NotFound, a tampered snapshot is
//! an integrity error, a foreign environment is EnvironmentMismatch, and
//! only then is the run checked for determinism. A non-deterministic run is
//! never reported as PASS or FAIL.
//!
//! With `from_step = k`, steps before `k` are taken from the recorded
//! result and the engine recomputes the rest.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::engine::{CancellationToken, DecisionEngine, ToolRegistry};
use crate::observability::{log_event_with_fields, Event, ObservationScope, Timer};
use crate::snapshot::{
    create_snapshot, validate_snapshot_environment, EnvironmentInfo, Execution,
    ExecutionPointer, Snapshot, SnapshotOrigin, SnapshotStore,
};

use super::compare::{first_divergence, Divergence};
use super::errors::ReplayError;
use super::state::{ReplayState, StateTracker};

/// Replay verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// Every hash stage reproduced
    Pass,
    /// Some hash stage diverged
    Fail,
}

/// Caller options for one replay.
#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    /// Registry to replay with instead of the recorded one
    pub tool_registry_override: Option<ToolRegistry>,
    /// Resume from this pipeline step
    pub from_step: Option<u32>,
    /// Deadline for the engine run
    pub timeout: Option<Duration>,
    /// Persist the replay snapshot to the store
    pub persist: bool,
}

/// Outcome of a completed replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayResult {
    /// Replayed run
    pub run_id: String,
    /// PASS or FAIL
    pub verdict: Verdict,
    /// First diverging stage on FAIL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divergence: Option<Divergence>,
    /// Snapshot id of the original
    pub original_snapshot_id: String,
    /// Snapshot of the replay execution
    pub replay_snapshot: Snapshot,
    /// Where the replay snapshot was written, if persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persisted_path: Option<PathBuf>,
    /// Step the replay resumed from
    pub from_step: u32,
    /// States visited
    pub states: Vec<ReplayState>,
}

impl ReplayResult {
    /// True on PASS
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    /// Turn FAIL into a `Divergence` error.
    pub fn certify(self) -> Result<ReplayResult, ReplayError> {
        match self.divergence {
            Some(divergence) => Err(ReplayError::Divergence {
                stage: divergence.stage,
                expected: divergence.expected,
                actual: divergence.actual,
            }),
            None => Ok(self),
        }
    }
}

/// Replays runs from a store with a given engine.
pub struct Replayer<'a, E: DecisionEngine + ?Sized> {
    store: &'a SnapshotStore,
    engine: &'a E,
}

impl<'a, E: DecisionEngine + ?Sized> Replayer<'a, E> {
    /// Create a replayer
    pub fn new(store: &'a SnapshotStore, engine: &'a E) -> Self {
        Self { store, engine }
    }

    /// Replay `run_id` with a deadline taken from `options`.
    pub fn replay(&self, run_id: &str, options: &ReplayOptions) -> Result<ReplayResult, ReplayError> {
        let cancel = CancellationToken::with_optional_timeout(options.timeout);
        self.replay_with_token(run_id, options, &cancel)
    }

    /// Replay `run_id` under a caller-held cancellation token.
    pub fn replay_with_token(
        &self,
        run_id: &str,
        options: &ReplayOptions,
        cancel: &CancellationToken,
    ) -> Result<ReplayResult, ReplayError> {
        let scope = ObservationScope::with_fields("REPLAY", &[("run_id", run_id)]);

        match self.run_states(run_id, options, cancel) {
            Ok(result) => {
                let verdict = if result.passed() { "PASS" } else { "FAIL" };
                scope.complete_with_fields(&[("verdict", verdict)]);
                Ok(result)
            }
            Err(err) => {
                scope.fail(err.code());
                Err(err)
            }
        }
    }

    fn run_states(
        &self,
        run_id: &str,
        options: &ReplayOptions,
        cancel: &CancellationToken,
    ) -> Result<ReplayResult, ReplayError> {
        let mut tracker = StateTracker::start(run_id);

        let original = self.load(run_id)?;
        let from_step = options.from_step.unwrap_or(0);
        if from_step > original.execution_pointer.step {
            return Err(ReplayError::InvalidStep {
                from_step,
                recorded: original.execution_pointer.step,
            });
        }

        tracker.advance(ReplayState::Recomputing);
        let replay_snapshot = self.recompute(&original, options, from_step, cancel)?;

        tracker.advance(ReplayState::Comparing);
        let divergence = first_divergence(&original.hashes, &replay_snapshot.hashes);

        let persisted_path = if options.persist {
            Some(self.store.save(&replay_snapshot)?)
        } else {
            None
        };

        let verdict = match divergence {
            None => {
                tracker.advance(ReplayState::Pass);
                log_event_with_fields(
                    Event::ReplayPass,
                    &[("run_id", run_id), ("chain_hash", &replay_snapshot.chain_hash().to_string())],
                );
                Verdict::Pass
            }
            Some(ref divergence) => {
                tracker.advance(ReplayState::Fail);
                let stage = divergence.stage.to_string();
                log_event_with_fields(
                    Event::ReplayFail,
                    &[
                        ("run_id", run_id),
                        ("stage", &stage),
                        ("expected", &divergence.expected),
                        ("actual", &divergence.actual),
                    ],
                );
                Verdict::Fail
            }
        };

        Ok(ReplayResult {
            run_id: run_id.to_string(),
            verdict,
            divergence,
            original_snapshot_id: original.snapshot_id,
            replay_snapshot,
            persisted_path,
            from_step,
            states: tracker.into_history(),
        })
    }

    fn load(&self, run_id: &str) -> Result<Snapshot, ReplayError> {
        let original = self.store.load_snapshot(run_id).map_err(|err| {
            if err.is_not_found() {
                ReplayError::NotFound(run_id.to_string())
            } else {
                ReplayError::Snapshot(err)
            }
        })?;

        original.verify_integrity()?;

        let check = validate_snapshot_environment(&original, &EnvironmentInfo::current(self.engine));
        if !check.ok {
            return Err(ReplayError::EnvironmentMismatch(
                check.reason.unwrap_or_default(),
            ));
        }

        if !original.deterministic || original.seed.is_none() {
            return Err(ReplayError::NonDeterministic(run_id.to_string()));
        }
        Ok(original)
    }

    fn recompute(
        &self,
        original: &Snapshot,
        options: &ReplayOptions,
        from_step: u32,
        cancel: &CancellationToken,
    ) -> Result<Snapshot, ReplayError> {
        let input = &original.input;
        let registry = options
            .tool_registry_override
            .clone()
            .unwrap_or_else(|| input.tool_registry.clone());
        let timeout_ms = options.timeout.map(|t| t.as_millis() as u64);

        let timer = Timer::new();
        let run = if from_step == 0 {
            self.engine
                .run_decision(&input.spec, &input.options, &registry, cancel)
        } else {
            self.engine.resume_decision(
                &input.spec,
                &input.options,
                &registry,
                &original.result,
                from_step,
                cancel,
            )
        }
        .map_err(|err| ReplayError::from_engine(err, timeout_ms))?;

        let execution = Execution {
            run_id: original.run_id.clone(),
            origin: SnapshotOrigin::Replay {
                of: original.snapshot_id.clone(),
            },
            spec: input.spec.clone(),
            options: input.options.clone(),
            result: run.result,
            tool_registry: registry,
            duration_ms: timer.elapsed_ms(),
            deterministic: true,
            seed: original.seed.clone(),
            execution_pointer: ExecutionPointer::completed(self.engine.total_steps()),
            environment: EnvironmentInfo::current(self.engine),
        };
        Ok(create_snapshot(&execution)?)
    }
}

/// Replay `run_id` from `store` with `engine`.
pub fn replay_run<E: DecisionEngine + ?Sized>(
    store: &SnapshotStore,
    engine: &E,
    run_id: &str,
    options: &ReplayOptions,
) -> Result<ReplayResult, ReplayError> {
    Replayer::new(store, engine).replay(run_id, options)
}
