//! Graph analytics: blast radius and fragility ranking
//!
//! Both operations require an acyclic graph and refuse otherwise.
//!
//! Fragility score of a node:
//!
//! ```text
//! score = w_blast · |blast radius| + w_depth · depth + w_assumptions · signal
//! signal = Σ (1 − clamp(boundary, 0, 1))   over distinct fragile assumptions
//! ```
//!
//! `depth` is the length of the longest dependency chain below the node.
//! Unresolved (forward-referenced) nodes carry no assumption signal.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::builder::{DependencyGraph, NodeId};
use super::cycles::GraphValidation;
use super::errors::{GraphError, GraphResult};

/// Weights of the fragility score terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragilityWeights {
    /// Weight of the blast-radius size
    pub blast_radius: f64,
    /// Weight of the dependency depth
    pub depth: f64,
    /// Weight of the assumption signal
    pub assumptions: f64,
}

impl Default for FragilityWeights {
    fn default() -> Self {
        Self {
            blast_radius: 1.0,
            depth: 0.5,
            assumptions: 0.25,
        }
    }
}

impl FragilityWeights {
    /// Reject negative or non-finite weights.
    ///
    /// Non-negative weights keep the score monotone in blast-radius size.
    pub fn validate(&self) -> GraphResult<()> {
        let weights = [
            ("blast_radius", self.blast_radius),
            ("depth", self.depth),
            ("assumptions", self.assumptions),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(GraphError::invalid_weights(format!(
                    "fragility weight '{}' must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// One entry of the fragility ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedNode {
    /// 1-based position, most fragile first
    pub rank: usize,
    /// Transcript hash
    pub hash: String,
    /// Weighted score
    pub score: f64,
    /// Number of transitive dependents
    pub blast_radius: usize,
    /// Longest dependency chain below the node
    pub depth: usize,
    /// Sum of fragile-assumption closeness
    pub assumption_signal: f64,
    /// Whether the transcript was supplied
    pub resolved: bool,
}

/// All transitive dependents of `hash`, excluding itself, sorted.
pub fn blast_radius(graph: &DependencyGraph, hash: &str) -> GraphResult<Vec<String>> {
    let id = graph.node_id(hash).ok_or_else(|| GraphError::not_found(hash))?;
    GraphValidation::of(graph).require_acyclic("blast-radius")?;
    Ok(graph.hashes_of(&dependents_closure(graph, id)))
}

fn dependents_closure(graph: &DependencyGraph, id: NodeId) -> BTreeSet<NodeId> {
    let mut seen = BTreeSet::new();
    let mut queue: VecDeque<NodeId> = graph.node_at(id).dependents().iter().copied().collect();

    while let Some(next) = queue.pop_front() {
        if next == id || !seen.insert(next) {
            continue;
        }
        queue.extend(graph.node_at(next).dependents().iter().copied());
    }
    seen
}

/// Rank every node by fragility, most fragile first, ties by hash.
pub fn calculate_fragility(
    graph: &DependencyGraph,
    weights: &FragilityWeights,
) -> GraphResult<Vec<RankedNode>> {
    weights.validate()?;
    GraphValidation::of(graph).require_acyclic("fragility")?;

    let depths = dependency_depths(graph);
    let mut ranked: Vec<RankedNode> = graph
        .ids_by_hash()
        .map(|id| {
            let node = graph.node_at(id);
            let blast = dependents_closure(graph, id).len();
            let depth = depths[id.index()];
            let signal = assumption_signal(graph, id);
            RankedNode {
                rank: 0,
                hash: node.hash().to_string(),
                score: weights.blast_radius * blast as f64
                    + weights.depth * depth as f64
                    + weights.assumptions * signal,
                blast_radius: blast,
                depth,
                assumption_signal: signal,
                resolved: node.is_resolved(),
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.hash.cmp(&b.hash)));
    for (position, entry) in ranked.iter_mut().enumerate() {
        entry.rank = position + 1;
    }
    Ok(ranked)
}

/// Longest dependency chain below every node, indexed by arena position.
///
/// Kahn's order over dependencies: a node is settled once all of its
/// dependencies are. Nodes on a cycle are never settled and keep depth 0.
fn dependency_depths(graph: &DependencyGraph) -> Vec<usize> {
    let mut depths = vec![0usize; graph.len()];
    let mut remaining = vec![0usize; graph.len()];
    for id in graph.ids_by_hash() {
        remaining[id.index()] = graph.node_at(id).dependencies().len();
    }

    let mut ready: VecDeque<NodeId> = graph
        .ids_by_hash()
        .filter(|id| remaining[id.index()] == 0)
        .collect();
    while let Some(id) = ready.pop_front() {
        let depth = depths[id.index()];
        for dependent in graph.node_at(id).dependents() {
            let slot = dependent.index();
            depths[slot] = depths[slot].max(depth + 1);
            remaining[slot] -= 1;
            if remaining[slot] == 0 {
                ready.push_back(*dependent);
            }
        }
    }
    depths
}

fn assumption_signal(graph: &DependencyGraph, id: NodeId) -> f64 {
    graph
        .node_at(id)
        .transcript()
        .map(|transcript| {
            transcript
                .result
                .fragile_assumptions()
                .iter()
                .map(|fragile| 1.0 - fragile.boundary.clamp(0.0, 1.0))
                .sum()
        })
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::build_graph_from_envelopes;
    use crate::graph::builder::test_support::envelope;
    use crate::graph::errors::GraphErrorCode;
    use crate::transcript::{FragileAssumption, LensEvaluation};

    #[test]
    fn test_blast_radius_fan_in() {
        let graph = build_graph_from_envelopes(vec![
            envelope("X", &["Y"]),
            envelope("Z", &["Y"]),
            envelope("Y", &[]),
        ]);
        assert_eq!(blast_radius(&graph, "Y").unwrap(), vec!["X", "Z"]);
        assert!(blast_radius(&graph, "X").unwrap().is_empty());
    }

    #[test]
    fn test_blast_radius_is_transitive_without_duplicates() {
        let graph = build_graph_from_envelopes(vec![
            envelope("B", &["A"]),
            envelope("C", &["A", "B"]),
            envelope("D", &["C"]),
        ]);
        assert_eq!(blast_radius(&graph, "A").unwrap(), vec!["B", "C", "D"]);
    }

    #[test]
    fn test_blast_radius_unknown_hash() {
        let graph = build_graph_from_envelopes(vec![envelope("A", &[])]);
        let err = blast_radius(&graph, "missing").unwrap_err();
        assert_eq!(err.code(), GraphErrorCode::TribGraphNotFound);
    }

    #[test]
    fn test_blast_radius_refuses_cycle() {
        let graph = build_graph_from_envelopes(vec![envelope("A", &["B"]), envelope("B", &["A"])]);
        let err = blast_radius(&graph, "A").unwrap_err();
        assert_eq!(err.code(), GraphErrorCode::TribGraphCyclic);
        assert_eq!(err.operation(), Some("blast-radius"));
    }

    #[test]
    fn test_fragility_fan_in_ranks_shared_dependency_first() {
        let graph = build_graph_from_envelopes(vec![
            envelope("X", &["Y"]),
            envelope("Z", &["Y"]),
            envelope("Y", &[]),
        ]);
        let ranked = calculate_fragility(&graph, &FragilityWeights::default()).unwrap();

        let order: Vec<&str> = ranked.iter().map(|r| r.hash.as_str()).collect();
        assert_eq!(order, vec!["Y", "X", "Z"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[0].blast_radius, 2);
        assert_eq!(ranked[1].depth, 1);
        assert!((ranked[0].score - 2.0).abs() < 1e-9);
        assert!((ranked[1].score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_fragility_refuses_cycle() {
        let graph = build_graph_from_envelopes(vec![
            envelope("A", &["B"]),
            envelope("B", &["C"]),
            envelope("C", &["A"]),
        ]);
        let err = calculate_fragility(&graph, &FragilityWeights::default()).unwrap_err();
        assert_eq!(err.code(), GraphErrorCode::TribGraphCyclic);
        assert_eq!(err.operation(), Some("fragility"));
    }

    #[test]
    fn test_fragility_counts_assumption_signal() {
        let mut fragile = envelope("F", &[]);
        fragile.transcript.result.evaluations.push(LensEvaluation {
            lens: "regret".to_string(),
            robust_actions: vec![],
            fragile_assumptions: vec![
                FragileAssumption {
                    assumption_id: "demand".to_string(),
                    boundary: 0.2,
                },
                FragileAssumption {
                    assumption_id: "cost".to_string(),
                    boundary: 1.7,
                },
            ],
            dominated_actions: vec![],
        });
        let graph = build_graph_from_envelopes(vec![fragile, envelope("G", &[])]);

        let ranked = calculate_fragility(&graph, &FragilityWeights::default()).unwrap();
        assert_eq!(ranked[0].hash, "F");
        assert!((ranked[0].assumption_signal - 0.8).abs() < 1e-9);
        assert!((ranked[0].score - 0.2).abs() < 1e-9);
        assert_eq!(ranked[1].score, 0.0);
    }

    #[test]
    fn test_ties_broken_by_hash() {
        let graph = build_graph_from_envelopes(vec![envelope("b", &[]), envelope("a", &[])]);
        let ranked = calculate_fragility(&graph, &FragilityWeights::default()).unwrap();
        assert_eq!(ranked[0].hash, "a");
        assert_eq!(ranked[1].hash, "b");
    }

    fn chain(len: usize) -> DependencyGraph {
        build_graph_from_envelopes((0..len).map(|i| {
            let next = format!("n{:06}", i + 1);
            let deps: Vec<&str> = if i + 1 < len { vec![next.as_str()] } else { vec![] };
            envelope(&format!("n{:06}", i), &deps)
        }))
    }

    #[test]
    fn test_depths_of_deep_chain() {
        let len = 50_000;
        let graph = chain(len);
        let depths = dependency_depths(&graph);

        let head = graph.node_id("n000000").unwrap();
        let tail = graph.node_id(&format!("n{:06}", len - 1)).unwrap();
        assert_eq!(depths[head.index()], len - 1);
        assert_eq!(depths[tail.index()], 0);
    }

    #[test]
    fn test_fragility_on_long_chain() {
        let graph = chain(2_000);
        let ranked = calculate_fragility(&graph, &FragilityWeights::default()).unwrap();
        assert_eq!(ranked.len(), 2_000);
        assert_eq!(ranked[0].hash, "n001999");
        assert_eq!(ranked[0].blast_radius, 1_999);
        assert_eq!(ranked[1_999].depth, 1_999);
    }

    #[test]
    fn test_depth_takes_longest_path() {
        let graph = build_graph_from_envelopes(vec![
            envelope("A", &["B", "D"]),
            envelope("B", &["C"]),
            envelope("C", &["D"]),
            envelope("D", &[]),
        ]);
        let ranked = calculate_fragility(&graph, &FragilityWeights::default()).unwrap();
        let a = ranked.iter().find(|r| r.hash == "A").unwrap();
        assert_eq!(a.depth, 3);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let graph = build_graph_from_envelopes(vec![envelope("a", &[])]);
        let weights = FragilityWeights {
            depth: -1.0,
            ..FragilityWeights::default()
        };
        let err = calculate_fragility(&graph, &weights).unwrap_err();
        assert_eq!(err.code(), GraphErrorCode::TribGraphInvalidWeights);

        let weights = FragilityWeights {
            blast_radius: f64::NAN,
            ..FragilityWeights::default()
        };
        assert!(weights.validate().is_err());
    }
}
