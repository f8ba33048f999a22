//! Example decision specs

use crate::transcript::{Assumption, DecisionSpec};

fn assumption(id: &str, confidence: f64) -> Assumption {
    Assumption {
        id: id.to_string(),
        confidence,
    }
}

/// A supplier contract negotiation with three moves.
pub fn make_negotiation_example() -> DecisionSpec {
    DecisionSpec {
        title: "Supplier contract renewal".to_string(),
        context: "Incumbent supplier proposes a 12% price increase for a two-year renewal"
            .to_string(),
        actions: vec![
            "accept-offer".to_string(),
            "counter-offer".to_string(),
            "walk-away".to_string(),
        ],
        assumptions: vec![
            assumption("supplier-has-alternatives", 0.4),
            assumption("price-floor-known", 0.7),
            assumption("deadline-is-firm", 0.55),
        ],
    }
}

/// An operational call during a database incident.
pub fn make_ops_example() -> DecisionSpec {
    DecisionSpec {
        title: "Primary database degradation".to_string(),
        context: "p99 write latency tripled over 20 minutes; replica lag is 4 seconds"
            .to_string(),
        actions: vec![
            "failover-now".to_string(),
            "drain-traffic".to_string(),
            "wait-and-observe".to_string(),
        ],
        assumptions: vec![
            assumption("replica-is-consistent", 0.8),
            assumption("load-is-transient", 0.35),
            assumption("failover-tested-recently", 0.6),
        ],
    }
}
