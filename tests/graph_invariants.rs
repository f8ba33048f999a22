//! Dependency Graph Invariant Tests
//!
//! - Every input appears as a node; dependents is the inverse of dependencies
//! - Blast radius excludes the node and is closed under dependents
//! - detect_cycles is empty iff no node reaches itself
//! - Analytics refuse cyclic graphs; read-only views do not
//! - Digests ignore object key order

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tribunal::graph::{
    blast_radius, build_graph, build_graph_from_envelopes, calculate_fragility, detect_cycles,
    Cycle, DependencyGraph, FragilityWeights, GraphErrorCode, GraphValidation,
};
use tribunal::hashing::hash_value;
use tribunal::transcript::{
    DecisionResult, DecisionSpec, DecisionTranscript, FragileAssumption, LensEvaluation,
    TranscriptEnvelope,
};

// =============================================================================
// Test Utilities
// =============================================================================

fn transcript(title: &str, dependencies: &[&str]) -> DecisionTranscript {
    DecisionTranscript {
        spec: DecisionSpec {
            title: title.to_string(),
            context: "integration".to_string(),
            actions: vec!["proceed".to_string(), "hold".to_string()],
            assumptions: vec![],
        },
        result: DecisionResult::default(),
        dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
    }
}

fn envelope(hash: &str, dependencies: &[&str]) -> TranscriptEnvelope {
    TranscriptEnvelope::with_hash(hash, transcript(hash, dependencies))
}

fn dependencies_of(graph: &DependencyGraph, hash: &str) -> BTreeSet<String> {
    graph
        .node(hash)
        .map(|node| graph.hashes_of(node.dependencies()))
        .unwrap_or_default()
        .into_iter()
        .collect()
}

fn dependents_of(graph: &DependencyGraph, hash: &str) -> BTreeSet<String> {
    graph
        .node(hash)
        .map(|node| graph.hashes_of(node.dependents()))
        .unwrap_or_default()
        .into_iter()
        .collect()
}

/// Whether `hash` can reach itself along dependency edges.
fn reaches_itself(graph: &DependencyGraph, hash: &str) -> bool {
    let mut seen = BTreeSet::new();
    let mut stack: Vec<String> = dependencies_of(graph, hash).into_iter().collect();
    while let Some(next) = stack.pop() {
        if next == hash {
            return true;
        }
        if seen.insert(next.clone()) {
            stack.extend(dependencies_of(graph, &next));
        }
    }
    false
}

fn random_envelopes(rng: &mut StdRng, nodes: usize, edge_chance: f64) -> Vec<TranscriptEnvelope> {
    let names: Vec<String> = (0..nodes).map(|i| format!("n{:02}", i)).collect();
    names
        .iter()
        .map(|name| {
            let deps: Vec<&str> = names
                .iter()
                .filter(|_| rng.gen_bool(edge_chance))
                .map(String::as_str)
                .collect();
            envelope(name, &deps)
        })
        .collect()
}

fn random_graph(rng: &mut StdRng, nodes: usize, edge_chance: f64) -> DependencyGraph {
    build_graph_from_envelopes(random_envelopes(rng, nodes, edge_chance))
}

/// Hashes ranked strictly above `hash`, excluding `ignore`.
fn ranked_above(graph: &DependencyGraph, weights: &FragilityWeights, hash: &str, ignore: &str) -> BTreeSet<String> {
    calculate_fragility(graph, weights)
        .unwrap()
        .into_iter()
        .map(|entry| entry.hash)
        .take_while(|h| h != hash)
        .filter(|h| h != ignore)
        .collect()
}

// =============================================================================
// Construction
// =============================================================================

/// Forward references create unresolved nodes; nothing is dropped.
#[test]
fn test_every_input_and_reference_is_a_node() {
    let graph = build_graph_from_envelopes(vec![
        envelope("A", &["B", "ghost"]),
        envelope("B", &[]),
    ]);

    assert_eq!(graph.len(), 3);
    assert!(graph.node("A").unwrap().is_resolved());
    assert!(!graph.node("ghost").unwrap().is_resolved());
}

/// dependents is exactly the inverse of dependencies.
#[test]
fn test_dependents_inverse_of_dependencies() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let graph = random_graph(&mut rng, 8, 0.25);
        for a in graph.hashes() {
            for b in graph.hashes() {
                assert_eq!(
                    dependencies_of(&graph, a).contains(b),
                    dependents_of(&graph, b).contains(a),
                    "edge {} -> {} not mirrored",
                    a,
                    b
                );
            }
        }
    }
}

/// Content-hash keys come from the transcript itself.
#[test]
fn test_build_graph_keys_by_content_hash() {
    let upstream = transcript("upstream", &[]);
    let upstream_hash = upstream.transcript_hash().unwrap().to_string();
    let downstream = transcript("downstream", &[upstream_hash.as_str()]);

    let graph = build_graph(vec![downstream, upstream]).unwrap();
    assert_eq!(graph.len(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(dependents_of(&graph, &upstream_hash).len(), 1);
}

// =============================================================================
// Cycles
// =============================================================================

/// A → B, B → C, C → A yields exactly [[A, B, C]].
#[test]
fn test_three_cycle_reported_once() {
    let graph = build_graph_from_envelopes(vec![
        envelope("A", &["B"]),
        envelope("B", &["C"]),
        envelope("C", &["A"]),
    ]);
    assert_eq!(
        detect_cycles(&graph),
        vec![Cycle(vec!["A".into(), "B".into(), "C".into()])]
    );
}

/// detect_cycles is empty iff no node reaches itself.
#[test]
fn test_cycles_empty_iff_no_self_reach() {
    let mut rng = StdRng::seed_from_u64(42);
    for round in 0..40 {
        let graph = random_graph(&mut rng, 7, if round % 2 == 0 { 0.1 } else { 0.3 });
        let cycles = detect_cycles(&graph);
        let any_self_reach = graph.hashes().any(|h| reaches_itself(&graph, h));
        assert_eq!(cycles.is_empty(), !any_self_reach, "round {}", round);

        for cycle in &cycles {
            for hash in cycle.hashes() {
                assert!(reaches_itself(&graph, hash));
            }
            let first = &cycle.hashes()[0];
            assert!(cycle.hashes().iter().all(|h| h >= first));
        }
    }
}

/// Every reported cycle is distinct.
#[test]
fn test_cycles_are_unique() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..20 {
        let graph = random_graph(&mut rng, 6, 0.35);
        let cycles = detect_cycles(&graph);
        let unique: BTreeSet<&Cycle> = cycles.iter().collect();
        assert_eq!(unique.len(), cycles.len());
    }
}

// =============================================================================
// Analytics
// =============================================================================

/// Blast radius excludes the node and is closed under dependents.
#[test]
fn test_blast_radius_closure() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut checked = 0;
    while checked < 10 {
        let graph = random_graph(&mut rng, 9, 0.15);
        if !GraphValidation::of(&graph).is_acyclic() {
            continue;
        }
        checked += 1;

        for hash in graph.hashes() {
            let radius: BTreeSet<String> = blast_radius(&graph, hash).unwrap().into_iter().collect();
            assert!(!radius.contains(hash));
            for direct in dependents_of(&graph, hash) {
                assert!(radius.contains(&direct));
            }
            for member in &radius {
                for next in dependents_of(&graph, member) {
                    assert!(radius.contains(&next), "{} not closed over {}", hash, member);
                }
            }
        }
    }
}

/// X → Y, Z → Y: blast(Y) = {X, Z}; Y ranks above X and Z.
#[test]
fn test_shared_dependency_ranks_first() {
    let graph = build_graph_from_envelopes(vec![
        envelope("X", &["Y"]),
        envelope("Z", &["Y"]),
        envelope("Y", &[]),
    ]);

    assert_eq!(blast_radius(&graph, "Y").unwrap(), vec!["X", "Z"]);

    let ranking = calculate_fragility(&graph, &FragilityWeights::default()).unwrap();
    assert_eq!(ranking.len(), 3);
    assert_eq!(ranking[0].hash, "Y");
    assert!(ranking[0].score > ranking[1].score);
    assert_eq!(ranking[1].score, ranking[2].score);
    assert_eq!(ranking[1].hash, "X");
}

/// A fresh dependent on n raises n's blast radius; no node that trailed n
/// overtakes it, under any non-negative weights.
#[test]
fn test_larger_blast_radius_never_lowers_rank() {
    let weight_sets = [
        FragilityWeights::default(),
        FragilityWeights {
            blast_radius: 2.0,
            depth: 0.0,
            assumptions: 1.0,
        },
        FragilityWeights {
            blast_radius: 0.1,
            depth: 3.0,
            assumptions: 0.5,
        },
    ];
    const FRESH: &str = "zz-fresh";

    for seed in [1u64, 5, 19, 23, 77] {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut checked = 0;
        while checked < 4 {
            let envelopes = random_envelopes(&mut rng, 9, 0.15);
            let before = build_graph_from_envelopes(envelopes.clone());
            if !GraphValidation::of(&before).is_acyclic() {
                continue;
            }
            checked += 1;

            let hashes: Vec<String> = before.hashes().map(str::to_string).collect();
            let target = &hashes[rng.gen_range(0..hashes.len())];
            let mut grown = envelopes;
            grown.push(envelope(FRESH, &[target.as_str()]));
            let after = build_graph_from_envelopes(grown);

            assert_eq!(
                blast_radius(&after, target).unwrap().len(),
                blast_radius(&before, target).unwrap().len() + 1
            );
            for weights in &weight_sets {
                let above_before = ranked_above(&before, weights, target, FRESH);
                let above_after = ranked_above(&after, weights, target, FRESH);
                assert!(
                    above_after.is_subset(&above_before),
                    "seed {}: {} overtaken by {:?}",
                    seed,
                    target,
                    above_after.difference(&above_before).collect::<Vec<_>>()
                );
            }
        }
    }
}

/// Cyclic graphs: read-only views proceed, analytics refuse by name.
#[test]
fn test_cycle_policy_per_operation() {
    let graph = build_graph_from_envelopes(vec![
        envelope("A", &["B"]),
        envelope("B", &["C"]),
        envelope("C", &["A"]),
        envelope("D", &["A"]),
    ]);

    let validation = GraphValidation::of(&graph);
    validation.warn_if_cyclic("list");
    assert_eq!(graph.summaries().len(), 4);

    let err = calculate_fragility(&graph, &FragilityWeights::default()).unwrap_err();
    assert_eq!(err.code(), GraphErrorCode::TribGraphCyclic);
    assert_eq!(err.operation(), Some("fragility"));

    let err = blast_radius(&graph, "D").unwrap_err();
    assert_eq!(err.code(), GraphErrorCode::TribGraphCyclic);
    assert_eq!(err.operation(), Some("blast-radius"));
}

/// Unknown hash is NotFound even on a cyclic graph.
#[test]
fn test_blast_radius_unknown_hash() {
    let graph = build_graph_from_envelopes(vec![envelope("A", &["A"])]);
    let err = blast_radius(&graph, "missing").unwrap_err();
    assert_eq!(err.code(), GraphErrorCode::TribGraphNotFound);
}

/// Fragile assumptions raise a node's score.
#[test]
fn test_assumption_signal_breaks_structural_tie() {
    let mut fragile = transcript("fragile", &[]);
    fragile.result.evaluations.push(LensEvaluation {
        lens: "robustness".to_string(),
        robust_actions: vec![],
        fragile_assumptions: vec![FragileAssumption {
            assumption_id: "demand".to_string(),
            boundary: 0.2,
        }],
        dominated_actions: vec![],
    });

    let graph = build_graph_from_envelopes(vec![
        TranscriptEnvelope::with_hash("P", transcript("steady", &[])),
        TranscriptEnvelope::with_hash("Q", fragile),
    ]);
    let ranking = calculate_fragility(&graph, &FragilityWeights::default()).unwrap();
    assert_eq!(ranking[0].hash, "Q");
    assert!((ranking[0].assumption_signal - 0.8).abs() < 1e-9);
}

// =============================================================================
// Hashing
// =============================================================================

/// Key order does not change a digest.
#[test]
fn test_digest_stable_under_field_reordering() {
    let a: serde_json::Value =
        serde_json::from_str(r#"{"title":"t","nested":{"x":1,"y":[1,2]},"n":0.5}"#).unwrap();
    let b: serde_json::Value =
        serde_json::from_str(r#"{"n":0.5,"nested":{"y":[1,2],"x":1},"title":"t"}"#).unwrap();
    assert_eq!(hash_value(&a).unwrap(), hash_value(&b).unwrap());

    let c: serde_json::Value =
        serde_json::from_str(r#"{"n":0.5,"nested":{"y":[2,1],"x":1},"title":"t"}"#).unwrap();
    assert_ne!(hash_value(&a).unwrap(), hash_value(&c).unwrap());
}
