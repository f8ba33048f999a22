//! Seeded decision engine
//!
//! A deterministic evaluator whose every score is drawn from SHA-256 of the
//! seed and the spec digest. Same seed and spec, same result, byte for byte.
//! Without a seed the engine draws one at random and the run cannot be
//! certified later.

use rand::Rng;
use sha2::{Digest as _, Sha256};

use crate::hashing::hash_value;
use crate::transcript::{
    BranchNode, DecisionGraph, DecisionResult, DecisionSpec, Explanation, FlipCondition,
    FragileAssumption, LensEvaluation, Transition, PIPELINE_STEPS,
};

use super::cancellation::CancellationToken;
use super::errors::{EngineError, EngineResult};
use super::registry::ToolRegistry;
use super::{DecisionEngine, EngineRun, ExecutionOptions};

/// Engine name recorded in snapshot environments
pub const SEEDED_ENGINE_NAME: &str = "tribunal-seeded";

/// Engine version recorded in snapshot environments
pub const SEEDED_ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Utility gap within which an action still counts as robust
const ROBUST_MARGIN: f64 = 0.1;

/// Utility gap beyond which an action is dominated
const DOMINATED_MARGIN: f64 = 0.5;

/// Boundary distance below which an assumption is fragile
const FRAGILE_BOUNDARY: f64 = 0.5;

/// Deterministic stand-in for the decision evaluation engine.
#[derive(Debug, Clone, Default)]
pub struct SeededEngine;

impl SeededEngine {
    /// Create the engine
    pub fn new() -> Self {
        Self
    }

    fn random_seed() -> String {
        format!("{:016x}", rand::thread_rng().gen::<u64>())
    }

    fn run_steps(
        &self,
        spec: &DecisionSpec,
        options: &ExecutionOptions,
        prior: Option<&DecisionResult>,
        from_step: u32,
        cancel: &CancellationToken,
    ) -> EngineResult<EngineRun> {
        validate_spec(spec)?;

        let seed = options.seed.clone().unwrap_or_else(Self::random_seed);
        let material = format!("{}\u{1f}{}", seed, hash_value(spec)?.hex());
        let mut result = prior.cloned().unwrap_or_default();
        let mut executed = 0;

        for (index, step) in PIPELINE_STEPS.iter().enumerate() {
            if (index as u32) < from_step {
                continue;
            }
            cancel.check(step)?;
            match index {
                0 => {
                    result.actions = spec.actions.clone();
                    result.graph = branch_graph(spec);
                }
                1 => result.evaluations = evaluate_lenses(spec, &options.lenses, &material),
                _ => result.explanation = explain(&result),
            }
            executed += 1;
        }

        Ok(EngineRun {
            result,
            seed,
            steps_executed: executed,
        })
    }
}

impl DecisionEngine for SeededEngine {
    fn name(&self) -> &str {
        SEEDED_ENGINE_NAME
    }

    fn version(&self) -> &str {
        SEEDED_ENGINE_VERSION
    }

    fn run_decision(
        &self,
        spec: &DecisionSpec,
        options: &ExecutionOptions,
        _registry: &ToolRegistry,
        cancel: &CancellationToken,
    ) -> EngineResult<EngineRun> {
        self.run_steps(spec, options, None, 0, cancel)
    }

    fn resume_decision(
        &self,
        spec: &DecisionSpec,
        options: &ExecutionOptions,
        _registry: &ToolRegistry,
        prior: &DecisionResult,
        from_step: u32,
        cancel: &CancellationToken,
    ) -> EngineResult<EngineRun> {
        if from_step > self.total_steps() {
            return Err(EngineError::invalid_step(from_step, self.total_steps()));
        }
        self.run_steps(spec, options, Some(prior), from_step, cancel)
    }
}

fn validate_spec(spec: &DecisionSpec) -> EngineResult<()> {
    if spec.actions.is_empty() {
        return Err(EngineError::invalid_spec("spec has no actions"));
    }
    for (i, action) in spec.actions.iter().enumerate() {
        if spec.actions[..i].contains(action) {
            return Err(EngineError::invalid_spec(format!(
                "duplicate action '{}'",
                action
            )));
        }
    }
    for assumption in &spec.assumptions {
        if !(0.0..=1.0).contains(&assumption.confidence) {
            return Err(EngineError::invalid_spec(format!(
                "assumption '{}' confidence {} outside [0, 1]",
                assumption.id, assumption.confidence
            )));
        }
    }
    Ok(())
}

/// Uniform value in [0, 1) drawn from the hash of `material` and `parts`.
fn draw(material: &str, parts: &[&str]) -> f64 {
    let mut hasher = Sha256::new();
    hasher.update(material.as_bytes());
    for part in parts {
        hasher.update([0x1f]);
        hasher.update(part.as_bytes());
    }
    let bytes = hasher.finalize();

    let mut word = [0u8; 8];
    word.copy_from_slice(&bytes[..8]);
    let value = (u64::from_be_bytes(word) >> 11) as f64 / (1u64 << 53) as f64;
    round6(value)
}

fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

fn branch_graph(spec: &DecisionSpec) -> DecisionGraph {
    let mut graph = DecisionGraph {
        nodes: vec![BranchNode {
            id: "root".to_string(),
            label: spec.title.clone(),
            action: None,
        }],
        edges: Vec::new(),
    };

    for (i, action) in spec.actions.iter().enumerate() {
        let id = format!("action-{}", i);
        graph.nodes.push(BranchNode {
            id: id.clone(),
            label: action.clone(),
            action: Some(action.clone()),
        });
        graph.edges.push(Transition {
            from: "root".to_string(),
            to: id,
            label: Some("choose".to_string()),
        });
    }
    graph
}

fn evaluate_lenses(spec: &DecisionSpec, lenses: &[String], material: &str) -> Vec<LensEvaluation> {
    lenses
        .iter()
        .map(|lens| {
            let utilities: Vec<(&String, f64)> = spec
                .actions
                .iter()
                .map(|action| (action, draw(material, &[lens.as_str(), "action", action.as_str()])))
                .collect();
            let best = utilities
                .iter()
                .map(|(_, u)| *u)
                .fold(f64::NEG_INFINITY, f64::max);

            let robust_actions = utilities
                .iter()
                .filter(|(_, u)| best - u <= ROBUST_MARGIN)
                .map(|(a, _)| (*a).clone())
                .collect();
            let dominated_actions = utilities
                .iter()
                .filter(|(_, u)| best - u > DOMINATED_MARGIN)
                .map(|(a, _)| (*a).clone())
                .collect();

            let fragile_assumptions = spec
                .assumptions
                .iter()
                .filter_map(|assumption| {
                    let pivot = draw(material, &[lens.as_str(), "assumption", assumption.id.as_str()]);
                    let boundary = round6((assumption.confidence - pivot).abs());
                    (boundary < FRAGILE_BOUNDARY).then(|| FragileAssumption {
                        assumption_id: assumption.id.clone(),
                        boundary,
                    })
                })
                .collect();

            LensEvaluation {
                lens: lens.clone(),
                robust_actions,
                fragile_assumptions,
                dominated_actions,
            }
        })
        .collect()
}

fn explain(result: &DecisionResult) -> Explanation {
    let reasoning = result
        .evaluations
        .iter()
        .map(|evaluation| {
            let robust = if evaluation.robust_actions.is_empty() {
                "none".to_string()
            } else {
                evaluation.robust_actions.join(", ")
            };
            format!(
                "{}: robust [{}], {} dominated",
                evaluation.lens,
                robust,
                evaluation.dominated_actions.len()
            )
        })
        .collect();

    let flip_conditions = result
        .fragile_assumptions()
        .into_iter()
        .map(|fragile| FlipCondition {
            description: format!(
                "conclusion flips if confidence in '{}' shifts by {:.3}",
                fragile.assumption_id, fragile.boundary
            ),
            assumption_id: fragile.assumption_id,
        })
        .collect();

    Explanation {
        reasoning,
        flip_conditions,
    }
}
