//! Decision data model
//!
//! All types serialize to JSON and hash through the canonical encoding, so
//! field order in files never matters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::hashing::{hash_value, Digest, HashResult};

/// An assumption the decision rests on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assumption {
    /// Stable identifier, referenced by fragile assumptions and flip conditions
    pub id: String,
    /// Confidence in the assumption, 0.0 to 1.0
    pub confidence: f64,
}

/// Input to one decision evaluation. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSpec {
    /// Short title
    pub title: String,
    /// Free-form context string
    pub context: String,
    /// Candidate actions, in submission order
    pub actions: Vec<String>,
    /// Assumptions, in submission order
    pub assumptions: Vec<Assumption>,
}

/// A branch state in the decision graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchNode {
    /// Node identifier, unique within one graph
    pub id: String,
    /// Human-readable label
    pub label: String,
    /// The action this branch takes, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// A transition between branch states.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Transition {
    /// Source node id
    pub from: String,
    /// Target node id
    pub to: String,
    /// Optional label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Decision graph: branch states and transitions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionGraph {
    /// Branch states
    pub nodes: Vec<BranchNode>,
    /// Transitions
    pub edges: Vec<Transition>,
}

/// An assumption whose change would move the conclusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragileAssumption {
    /// Assumption identifier
    pub assumption_id: String,
    /// Distance to the decision boundary, 0.0 (on it) to 1.0 (far away)
    pub boundary: f64,
}

/// The outcome of evaluating the decision through one lens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensEvaluation {
    /// Lens name, unique within one result
    pub lens: String,
    /// Actions that hold up under this lens
    pub robust_actions: Vec<String>,
    /// Assumptions close to flipping the conclusion
    pub fragile_assumptions: Vec<FragileAssumption>,
    /// Actions dominated by another action
    pub dominated_actions: Vec<String>,
}

/// A condition under which the recommendation flips.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlipCondition {
    /// Assumption that would have to change
    pub assumption_id: String,
    /// What the change looks like
    pub description: String,
}

/// Why the engine concluded what it did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    /// Reasoning statements
    pub reasoning: Vec<String>,
    /// Conditions that would flip the recommendation
    pub flip_conditions: Vec<FlipCondition>,
}

/// Pipeline steps of one evaluation, in execution order.
pub const PIPELINE_STEPS: [&str; 3] = ["graph", "evaluations", "explanation"];

/// Output of one evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    /// Actions that were evaluated
    pub actions: Vec<String>,
    /// Branch graph (step 0)
    pub graph: DecisionGraph,
    /// Per-lens evaluations (step 1)
    pub evaluations: Vec<LensEvaluation>,
    /// Explanation (step 2)
    pub explanation: Explanation,
}

impl DecisionResult {
    /// Digest of each pipeline step's output, in [`PIPELINE_STEPS`] order.
    ///
    /// The graph step covers the evaluated action list as well.
    pub fn step_hashes(&self) -> HashResult<Vec<Digest>> {
        #[derive(Serialize)]
        struct GraphStep<'a> {
            actions: &'a [String],
            graph: &'a DecisionGraph,
        }

        Ok(vec![
            hash_value(&GraphStep {
                actions: &self.actions,
                graph: &self.graph,
            })?,
            hash_value(&self.evaluations)?,
            hash_value(&self.explanation)?,
        ])
    }

    /// Distinct fragile assumptions across all lenses, keeping the smallest
    /// boundary seen for each, sorted by assumption id.
    pub fn fragile_assumptions(&self) -> Vec<FragileAssumption> {
        let mut tightest: BTreeMap<&str, f64> = BTreeMap::new();
        for evaluation in &self.evaluations {
            for fragile in &evaluation.fragile_assumptions {
                let entry = tightest
                    .entry(fragile.assumption_id.as_str())
                    .or_insert(fragile.boundary);
                if fragile.boundary < *entry {
                    *entry = fragile.boundary;
                }
            }
        }

        tightest
            .into_iter()
            .map(|(id, boundary)| FragileAssumption {
                assumption_id: id.to_string(),
                boundary,
            })
            .collect()
    }
}

/// A finalized evaluation run plus the transcripts it depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTranscript {
    /// The spec that was evaluated
    pub spec: DecisionSpec,
    /// The engine output
    pub result: DecisionResult,
    /// Hashes of transcripts whose conclusions were assumed as inputs
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl DecisionTranscript {
    /// Content hash over the canonical serialization.
    pub fn transcript_hash(&self) -> HashResult<Digest> {
        hash_value(self)
    }
}
