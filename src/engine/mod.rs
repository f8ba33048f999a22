//! Decision evaluation engine seam
//!
//! Replay re-invokes an engine through the `DecisionEngine` trait. The crate
//! ships `SeededEngine`, a deterministic evaluator used by the CLI and the
//! tests; real evaluators plug in behind the same trait.
//!
//! An engine run is a three-step pipeline (see `PIPELINE_STEPS`). Engines
//! must poll the cancellation token between steps.

mod cancellation;
mod errors;
mod fixtures;
mod registry;
mod seeded;

pub use cancellation::CancellationToken;
pub use errors::{EngineError, EngineErrorCode, EngineResult};
pub use fixtures::{make_negotiation_example, make_ops_example};
pub use registry::{default_tool_registry, ToolDescriptor, ToolRegistry};
pub use seeded::{SeededEngine, SEEDED_ENGINE_NAME, SEEDED_ENGINE_VERSION};

use serde::{Deserialize, Serialize};

use crate::transcript::{DecisionResult, DecisionSpec, PIPELINE_STEPS};

/// Lenses evaluated when options do not name any
pub const DEFAULT_LENSES: [&str; 3] = ["robustness", "regret", "adversarial"];

fn default_lenses() -> Vec<String> {
    DEFAULT_LENSES.iter().map(|l| l.to_string()).collect()
}

/// Options for one engine run. Part of the snapshot input hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOptions {
    /// Seed; a run without one is not deterministic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
    /// Lenses to evaluate, in order
    #[serde(default = "default_lenses")]
    pub lenses: Vec<String>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            seed: None,
            lenses: default_lenses(),
        }
    }
}

impl ExecutionOptions {
    /// Default options with a fixed seed
    pub fn with_seed(seed: &str) -> Self {
        Self::with_seed_opt(Some(seed))
    }

    /// Default options with an optional seed
    pub fn with_seed_opt(seed: Option<&str>) -> Self {
        Self {
            seed: seed.map(str::to_string),
            ..Self::default()
        }
    }

    /// Whether runs with these options can be reproduced
    pub fn is_deterministic(&self) -> bool {
        self.seed.is_some()
    }
}

/// What an engine run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineRun {
    /// The decision result
    pub result: DecisionResult,
    /// Seed actually used (drawn at random when options had none)
    pub seed: String,
    /// Pipeline steps executed by this call
    pub steps_executed: u32,
}

/// A decision evaluation engine.
pub trait DecisionEngine {
    /// Engine name, recorded in snapshot environments
    fn name(&self) -> &str;

    /// Engine version, recorded in snapshot environments
    fn version(&self) -> &str;

    /// Number of pipeline steps in a full run
    fn total_steps(&self) -> u32 {
        PIPELINE_STEPS.len() as u32
    }

    /// Evaluate a spec from scratch.
    fn run_decision(
        &self,
        spec: &DecisionSpec,
        options: &ExecutionOptions,
        registry: &ToolRegistry,
        cancel: &CancellationToken,
    ) -> EngineResult<EngineRun>;

    /// Evaluate from `from_step`, taking earlier steps from `prior`.
    ///
    /// Engines that cannot resume re-run from scratch.
    fn resume_decision(
        &self,
        spec: &DecisionSpec,
        options: &ExecutionOptions,
        registry: &ToolRegistry,
        _prior: &DecisionResult,
        _from_step: u32,
        cancel: &CancellationToken,
    ) -> EngineResult<EngineRun> {
        self.run_decision(spec, options, registry, cancel)
    }
}
