//! Dependency graph construction
//!
//! The graph is an arena of nodes indexed by transcript hash. Nodes are
//! created lazily on first mention, so a dependency may be declared before
//! the transcript it names is supplied (forward reference). Such nodes stay
//! unresolved until a transcript with that hash arrives.
//!
//! Construction never rejects input. Acyclicity is checked separately, see
//! `graph::cycles`.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::hashing::HashResult;
use crate::observability::{log_event_with_fields, Event};
use crate::transcript::{DecisionTranscript, TranscriptEnvelope};

/// Index of a node in the graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena position
    pub fn index(self) -> usize {
        self.0
    }
}

/// A transcript in the dependency graph.
#[derive(Debug, Clone)]
pub struct GraphNode {
    hash: String,
    dependencies: BTreeSet<NodeId>,
    dependents: BTreeSet<NodeId>,
    transcript: Option<DecisionTranscript>,
}

impl GraphNode {
    fn new(hash: &str) -> Self {
        Self {
            hash: hash.to_string(),
            dependencies: BTreeSet::new(),
            dependents: BTreeSet::new(),
            transcript: None,
        }
    }

    /// The transcript hash keying this node
    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Nodes this node's conclusion is conditioned on
    pub fn dependencies(&self) -> &BTreeSet<NodeId> {
        &self.dependencies
    }

    /// Nodes conditioned on this node's conclusion
    pub fn dependents(&self) -> &BTreeSet<NodeId> {
        &self.dependents
    }

    /// The transcript, if it was supplied (not just referenced)
    pub fn transcript(&self) -> Option<&DecisionTranscript> {
        self.transcript.as_ref()
    }

    /// Whether the transcript was supplied
    pub fn is_resolved(&self) -> bool {
        self.transcript.is_some()
    }
}

/// Serializable view of one node, with hashes instead of arena ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSummary {
    /// Transcript hash
    pub hash: String,
    /// Title of the transcript's spec, when resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Whether the transcript was supplied
    pub resolved: bool,
    /// Dependency hashes, sorted
    pub dependencies: Vec<String>,
    /// Dependent hashes, sorted
    pub dependents: Vec<String>,
}

/// Directed dependency graph keyed by transcript hash.
///
/// An edge A → B means A's validity is conditioned on B's conclusion.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: Vec<GraphNode>,
    index: BTreeMap<String, NodeId>,
}

impl DependencyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one transcript under `hash`, creating referenced nodes as needed.
    ///
    /// Supplying the same hash twice merges the declarations: the first
    /// transcript is kept and dependency sets are unioned.
    pub fn add_transcript(&mut self, hash: &str, transcript: DecisionTranscript) {
        let id = self.ensure_node(hash);

        for dependency in &transcript.dependencies {
            let target = self.ensure_node(dependency);
            self.add_edge(id, target);
        }

        let node = &mut self.nodes[id.0];
        if node.transcript.is_none() {
            node.transcript = Some(transcript);
        }
    }

    fn ensure_node(&mut self, hash: &str) -> NodeId {
        if let Some(id) = self.index.get(hash) {
            return *id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(GraphNode::new(hash));
        self.index.insert(hash.to_string(), id);
        id
    }

    // dependents is maintained here and only here, as the exact inverse
    fn add_edge(&mut self, from: NodeId, to: NodeId) {
        self.nodes[from.0].dependencies.insert(to);
        self.nodes[to.0].dependents.insert(from);
    }

    /// Number of nodes, resolved or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of dependency edges
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.dependencies.len()).sum()
    }

    /// Whether a node with this hash exists
    pub fn contains(&self, hash: &str) -> bool {
        self.index.contains_key(hash)
    }

    /// Arena id for a hash
    pub fn node_id(&self, hash: &str) -> Option<NodeId> {
        self.index.get(hash).copied()
    }

    /// Node for a hash
    pub fn node(&self, hash: &str) -> Option<&GraphNode> {
        self.node_id(hash).map(|id| &self.nodes[id.0])
    }

    /// Node at an arena id.
    ///
    /// Ids are only handed out by this graph, so lookups never miss.
    pub fn node_at(&self, id: NodeId) -> &GraphNode {
        &self.nodes[id.0]
    }

    /// Node ids in hash order
    pub fn ids_by_hash(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.index.values().copied()
    }

    /// All hashes, sorted
    pub fn hashes(&self) -> impl Iterator<Item = &str> + '_ {
        self.index.keys().map(String::as_str)
    }

    /// Resolve a set of ids to sorted hashes
    pub fn hashes_of<'a, I>(&self, ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a NodeId>,
    {
        let mut hashes: Vec<String> = ids
            .into_iter()
            .map(|id| self.nodes[id.0].hash.clone())
            .collect();
        hashes.sort();
        hashes
    }

    /// Serializable summary of one node
    pub fn summary(&self, hash: &str) -> Option<NodeSummary> {
        let node = self.node(hash)?;
        Some(NodeSummary {
            hash: node.hash.clone(),
            title: node.transcript.as_ref().map(|t| t.spec.title.clone()),
            resolved: node.is_resolved(),
            dependencies: self.hashes_of(&node.dependencies),
            dependents: self.hashes_of(&node.dependents),
        })
    }

    /// Summaries of every node, in hash order
    pub fn summaries(&self) -> Vec<NodeSummary> {
        self.hashes().filter_map(|hash| self.summary(hash)).collect()
    }
}

/// Build a dependency graph from transcripts, keying each by its content
/// hash. Input order is irrelevant.
pub fn build_graph<I>(transcripts: I) -> HashResult<DependencyGraph>
where
    I: IntoIterator<Item = DecisionTranscript>,
{
    let mut graph = DependencyGraph::new();
    for transcript in transcripts {
        let hash = transcript.transcript_hash()?.to_string();
        graph.add_transcript(&hash, transcript);
    }
    log_built(&graph);
    Ok(graph)
}

/// Build a dependency graph from envelopes, keying each node by the
/// envelope's recorded hash.
pub fn build_graph_from_envelopes<I>(envelopes: I) -> DependencyGraph
where
    I: IntoIterator<Item = TranscriptEnvelope>,
{
    let mut graph = DependencyGraph::new();
    for envelope in envelopes {
        graph.add_transcript(&envelope.transcript_hash, envelope.transcript);
    }
    log_built(&graph);
    graph
}

fn log_built(graph: &DependencyGraph) {
    log_event_with_fields(
        Event::GraphBuilt,
        &[
            ("nodes", &graph.len().to_string()),
            ("edges", &graph.edge_count().to_string()),
        ],
    );
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::transcript::{DecisionResult, DecisionSpec, DecisionTranscript, TranscriptEnvelope};

    /// Envelope keyed by a short name with the given dependencies.
    pub fn envelope(hash: &str, dependencies: &[&str]) -> TranscriptEnvelope {
        TranscriptEnvelope::with_hash(
            hash,
            DecisionTranscript {
                spec: DecisionSpec {
                    title: format!("decision {}", hash),
                    context: String::new(),
                    actions: vec![],
                    assumptions: vec![],
                },
                result: DecisionResult::default(),
                dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::envelope;
    use super::*;

    #[test]
    fn test_forward_reference_creates_unresolved_node() {
        let graph = build_graph_from_envelopes(vec![envelope("A", &["B"])]);

        assert_eq!(graph.len(), 2);
        assert!(graph.node("A").unwrap().is_resolved());
        assert!(!graph.node("B").unwrap().is_resolved());

        let b = graph.summary("B").unwrap();
        assert_eq!(b.dependents, vec!["A".to_string()]);
    }

    #[test]
    fn test_forward_reference_resolves_later() {
        let graph = build_graph_from_envelopes(vec![envelope("A", &["B"]), envelope("B", &[])]);
        assert!(graph.node("B").unwrap().is_resolved());
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_input_order_irrelevant() {
        let one = build_graph_from_envelopes(vec![envelope("X", &["Y"]), envelope("Z", &["Y"]), envelope("Y", &[])]);
        let two = build_graph_from_envelopes(vec![envelope("Y", &[]), envelope("Z", &["Y"]), envelope("X", &["Y"])]);
        assert_eq!(one.summaries(), two.summaries());
    }

    #[test]
    fn test_dependents_are_exact_inverse() {
        let graph = build_graph_from_envelopes(vec![
            envelope("A", &["B", "C"]),
            envelope("B", &["C"]),
            envelope("D", &["A", "C"]),
        ]);

        for hash in graph.hashes() {
            let node = graph.node(hash).unwrap();
            let id = graph.node_id(hash).unwrap();
            for dep in node.dependencies() {
                assert!(graph.node_at(*dep).dependents().contains(&id));
            }
            for dependent in node.dependents() {
                assert!(graph.node_at(*dependent).dependencies().contains(&id));
            }
        }
        assert_eq!(graph.edge_count(), 5);
    }

    #[test]
    fn test_duplicate_declarations_collapse() {
        let graph = build_graph_from_envelopes(vec![envelope("A", &["B", "B"]), envelope("A", &["C"])]);
        let a = graph.summary("A").unwrap();
        assert_eq!(a.dependencies, vec!["B".to_string(), "C".to_string()]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_transcripts_keyed_by_content_hash() {
        let first = envelope("unused", &[]).transcript;
        let expected = first.transcript_hash().unwrap().to_string();

        let graph = build_graph(vec![first]).unwrap();
        assert!(graph.contains(&expected));
        assert!(graph.node(&expected).unwrap().is_resolved());
    }

    #[test]
    fn test_empty_input() {
        let graph = build_graph_from_envelopes(Vec::new());
        assert!(graph.is_empty());
        assert!(graph.summaries().is_empty());
    }
}
