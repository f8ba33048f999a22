//! Transcript dependency graph
//!
//! - Construction from transcripts or envelopes (forward references allowed)
//! - Elementary cycle enumeration and acyclicity validation
//! - Blast radius and fragility ranking over acyclic graphs
//!
//! Construction never fails. Whether cycles matter is decided per operation:
//! read-only views warn, analytics refuse.

mod analytics;
mod builder;
mod cycles;
mod errors;

pub use analytics::{blast_radius, calculate_fragility, FragilityWeights, RankedNode};
pub use builder::{
    build_graph, build_graph_from_envelopes, DependencyGraph, GraphNode, NodeId, NodeSummary,
};
pub use cycles::{detect_cycles, Cycle, GraphValidation};
pub use errors::{GraphError, GraphErrorCode, GraphResult};
