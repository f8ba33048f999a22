//! Snapshot record
//!
//! The persisted form of one execution. Every stored hash can be recomputed
//! from the stored content, which is what `Snapshot::verify_integrity`
//! does.
//!
//! ```json
//! {
//!   "snapshot_id": "6f1c…",
//!   "run_id": "run-42",
//!   "origin": {"kind": "original"},
//!   "input": {"spec": {…}, "options": {…}, "tool_registry": {…}},
//!   "result": {…},
//!   "hashes": {"input_hash": "sha256:…", "step_hashes": […], "output_hash": "sha256:…",
//!              "registry_fingerprint": "sha256:…", "chain_hash": "sha256:…"},
//!   "deterministic": true,
//!   "seed": "s1",
//!   "duration_ms": 3,
//!   "created_at": "2026-10-16T09:30:00Z",
//!   "execution_pointer": {"step": 3, "total_steps": 3},
//!   "environment": {…}
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::{ExecutionOptions, ToolRegistry};
use crate::hashing::{chain_hash, hash_value, Digest, HashResult};
use crate::transcript::{DecisionResult, DecisionSpec};

use super::environment::EnvironmentInfo;
use super::errors::{SnapshotError, SnapshotResult};

/// Whether a snapshot records an original run or a replay of one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotOrigin {
    /// First execution of a run
    Original,
    /// Re-execution of the snapshot named by `of`
    Replay {
        /// Snapshot id of the original
        of: String,
    },
}

impl SnapshotOrigin {
    /// True for original runs
    pub fn is_original(&self) -> bool {
        matches!(self, SnapshotOrigin::Original)
    }
}

/// Everything the engine was given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotInput {
    /// Decision spec
    pub spec: DecisionSpec,
    /// Execution options (seed included)
    pub options: ExecutionOptions,
    /// Tool registry in effect
    pub tool_registry: ToolRegistry,
}

/// How far the recorded execution got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPointer {
    /// Steps completed
    pub step: u32,
    /// Steps in a full run
    pub total_steps: u32,
}

impl ExecutionPointer {
    /// Pointer of a run that finished every step
    pub fn completed(total_steps: u32) -> Self {
        Self {
            step: total_steps,
            total_steps,
        }
    }
}

/// Every hash stage of one execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashStages {
    /// Hash of (spec, options)
    pub input_hash: Digest,
    /// Hash of each pipeline step's output
    pub step_hashes: Vec<Digest>,
    /// Hash of the full result
    pub output_hash: Digest,
    /// Hash of the tool registry
    pub registry_fingerprint: Digest,
    /// Fold over input, steps, output and registry
    pub chain_hash: Digest,
}

impl HashStages {
    /// Compute every stage from execution content.
    pub fn compute(input: &SnapshotInput, result: &DecisionResult) -> HashResult<Self> {
        #[derive(Serialize)]
        struct HashedInput<'a> {
            spec: &'a DecisionSpec,
            options: &'a ExecutionOptions,
        }

        let input_hash = hash_value(&HashedInput {
            spec: &input.spec,
            options: &input.options,
        })?;
        let step_hashes = result.step_hashes()?;
        let output_hash = hash_value(result)?;
        let registry_fingerprint = input.tool_registry.fingerprint()?;

        let chain = chain_hash(
            std::iter::once(&input_hash)
                .chain(step_hashes.iter())
                .chain([&output_hash, &registry_fingerprint]),
        );

        Ok(Self {
            input_hash,
            step_hashes,
            output_hash,
            registry_fingerprint,
            chain_hash: chain,
        })
    }

    /// Name of the first stage that differs from `other`, in chain order.
    pub fn first_difference(&self, other: &HashStages) -> Option<&'static str> {
        if self.input_hash != other.input_hash {
            return Some("input");
        }
        if self.step_hashes != other.step_hashes {
            return Some("step");
        }
        if self.output_hash != other.output_hash {
            return Some("output");
        }
        if self.registry_fingerprint != other.registry_fingerprint {
            return Some("registry");
        }
        if self.chain_hash != other.chain_hash {
            return Some("chain");
        }
        None
    }
}

/// An immutable record of one execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Unique snapshot id
    pub snapshot_id: String,
    /// Run this snapshot belongs to
    pub run_id: String,
    /// Original or replay
    pub origin: SnapshotOrigin,
    /// Engine input
    pub input: SnapshotInput,
    /// Engine output
    pub result: DecisionResult,
    /// Hash stages over input and result
    pub hashes: HashStages,
    /// Whether the run can be reproduced
    pub deterministic: bool,
    /// Seed; present iff deterministic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
    /// Wall-clock duration of the engine run
    pub duration_ms: u64,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Resumability marker
    pub execution_pointer: ExecutionPointer,
    /// Producing environment
    pub environment: EnvironmentInfo,
}

impl Snapshot {
    /// Chain hash shortcut
    pub fn chain_hash(&self) -> &Digest {
        &self.hashes.chain_hash
    }

    /// Recompute every hash stage from stored content and compare.
    ///
    /// Also re-checks the seed rule and the execution pointer bounds.
    pub fn verify_integrity(&self) -> SnapshotResult<()> {
        check_seed_rule(self.deterministic, self.seed.as_deref())?;
        if self.execution_pointer.step > self.execution_pointer.total_steps {
            return Err(SnapshotError::integrity(&self.snapshot_id, "execution_pointer"));
        }

        let recomputed = HashStages::compute(&self.input, &self.result)?;
        match self.hashes.first_difference(&recomputed) {
            Some(stage) => Err(SnapshotError::integrity(&self.snapshot_id, stage)),
            None => Ok(()),
        }
    }
}

/// A seed must be present exactly when the run is deterministic.
pub(crate) fn check_seed_rule(deterministic: bool, seed: Option<&str>) -> SnapshotResult<()> {
    match (deterministic, seed) {
        (true, None) => Err(SnapshotError::invalid(
            "deterministic execution must record a seed",
        )),
        (false, Some(_)) => Err(SnapshotError::invalid(
            "non-deterministic execution must not record a seed",
        )),
        _ => Ok(()),
    }
}
