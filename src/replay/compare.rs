//! Hash stage comparison
//!
//! Stages are compared in chain order: input, each pipeline step, output,
//! chain. The first mismatch is the reported divergence; later stages are
//! not inspected.

use std::fmt;

use serde::Serialize;

use crate::hashing::Digest;
use crate::snapshot::HashStages;
use crate::transcript::PIPELINE_STEPS;

/// A hash stage of an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HashStage {
    /// Hash of (spec, options)
    Input,
    /// Hash of one pipeline step's output, by index
    Step(u32),
    /// Hash of the full result
    Output,
    /// Chain hash (includes the tool registry fingerprint)
    Chain,
}

impl fmt::Display for HashStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashStage::Input => write!(f, "input"),
            HashStage::Step(index) => match PIPELINE_STEPS.get(*index as usize) {
                Some(name) => write!(f, "step {} ({})", index, name),
                None => write!(f, "step {}", index),
            },
            HashStage::Output => write!(f, "output"),
            HashStage::Chain => write!(f, "chain"),
        }
    }
}

/// The first hash stage that differed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Divergence {
    /// Stage that differed
    pub stage: HashStage,
    /// Hash recorded in the original snapshot
    pub expected: String,
    /// Hash produced by the replay
    pub actual: String,
}

impl Divergence {
    fn at(stage: HashStage, expected: &Digest, actual: &Digest) -> Self {
        Self {
            stage,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

const MISSING: &str = "<missing>";

/// Compare recorded stages with replayed ones.
pub fn first_divergence(expected: &HashStages, actual: &HashStages) -> Option<Divergence> {
    if expected.input_hash != actual.input_hash {
        return Some(Divergence::at(
            HashStage::Input,
            &expected.input_hash,
            &actual.input_hash,
        ));
    }

    let steps = expected.step_hashes.len().max(actual.step_hashes.len());
    for index in 0..steps {
        let recorded = expected.step_hashes.get(index);
        let replayed = actual.step_hashes.get(index);
        if recorded != replayed {
            let show = |d: Option<&Digest>| {
                d.map(Digest::to_string)
                    .unwrap_or_else(|| MISSING.to_string())
            };
            return Some(Divergence {
                stage: HashStage::Step(index as u32),
                expected: show(recorded),
                actual: show(replayed),
            });
        }
    }

    if expected.output_hash != actual.output_hash {
        return Some(Divergence::at(
            HashStage::Output,
            &expected.output_hash,
            &actual.output_hash,
        ));
    }
    if expected.chain_hash != actual.chain_hash {
        return Some(Divergence::at(
            HashStage::Chain,
            &expected.chain_hash,
            &actual.chain_hash,
        ));
    }
    None
}
