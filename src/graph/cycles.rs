//! Cycle detection
//!
//! Enumerates every elementary cycle of the dependency graph exactly once
//! (Johnson's circuit search). Strongly connected components are computed
//! over the vertices not yet processed; the search starts at the smallest
//! hash that lies on a cycle and is confined to its component, so a cycle is
//! reported from its lexicographically smallest hash, following dependency
//! edges. An acyclic graph costs one linear pass. Neither pass recurses.
//!
//! Cycle policy is a value, not a side effect of construction: callers take
//! a `GraphValidation` and decide per operation whether to warn or refuse.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::observability::{log_event_with_fields, Event};

use super::builder::{DependencyGraph, NodeId};
use super::errors::{GraphError, GraphResult};

/// One elementary cycle as the ordered hash sequence forming the loop.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Cycle(pub Vec<String>);

impl Cycle {
    /// Hashes in loop order, starting from the smallest
    pub fn hashes(&self) -> &[String] {
        &self.0
    }

    /// Number of nodes in the loop
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Never true for a detected cycle
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Find all elementary cycles, self-loops included.
pub fn detect_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    let order: Vec<NodeId> = graph.ids_by_hash().collect();
    let mut rank = vec![0usize; graph.len()];
    for (position, id) in order.iter().enumerate() {
        rank[id.index()] = position;
    }

    let mut search = CircuitSearch::new(graph);
    let mut position = 0;
    while position < order.len() {
        let components = Components::of(graph, &order, |id| rank[id.index()] >= position);
        let Some(start) = order[position..]
            .iter()
            .copied()
            .find(|id| components.on_cycle(*id))
        else {
            break;
        };
        let component = components.members(start);
        search.run(start, &component);
        position = rank[start.index()] + 1;
    }
    search.cycles
}

/// Strongly connected components of the subgraph induced by the vertices
/// accepted by `allowed` (Tarjan, explicit stack).
struct Components<'g> {
    graph: &'g DependencyGraph,
    component: Vec<Option<usize>>,
    sizes: Vec<usize>,
}

impl<'g> Components<'g> {
    fn of<F>(graph: &'g DependencyGraph, order: &[NodeId], allowed: F) -> Self
    where
        F: Fn(NodeId) -> bool,
    {
        let n = graph.len();
        let mut index: Vec<Option<usize>> = vec![None; n];
        let mut lowlink = vec![0usize; n];
        let mut on_stack = vec![false; n];
        let mut stack: Vec<NodeId> = Vec::new();
        let mut component: Vec<Option<usize>> = vec![None; n];
        let mut sizes: Vec<usize> = Vec::new();
        let mut next_index = 0;

        for &root in order {
            if !allowed(root) || index[root.index()].is_some() {
                continue;
            }
            index[root.index()] = Some(next_index);
            lowlink[root.index()] = next_index;
            next_index += 1;
            stack.push(root);
            on_stack[root.index()] = true;
            let mut work = vec![(root, graph.node_at(root).dependencies().iter())];

            while let Some((v, next)) = work
                .last_mut()
                .map(|(v, edges)| (*v, edges.next().copied()))
            {
                match next {
                    Some(w) if !allowed(w) => {}
                    Some(w) => match index[w.index()] {
                        None => {
                            index[w.index()] = Some(next_index);
                            lowlink[w.index()] = next_index;
                            next_index += 1;
                            stack.push(w);
                            on_stack[w.index()] = true;
                            work.push((w, graph.node_at(w).dependencies().iter()));
                        }
                        Some(w_index) if on_stack[w.index()] => {
                            lowlink[v.index()] = lowlink[v.index()].min(w_index);
                        }
                        Some(_) => {}
                    },
                    None => {
                        work.pop();
                        if let Some((parent, _)) = work.last() {
                            lowlink[parent.index()] =
                                lowlink[parent.index()].min(lowlink[v.index()]);
                        }
                        if Some(lowlink[v.index()]) == index[v.index()] {
                            let id = sizes.len();
                            let mut size = 0;
                            while let Some(member) = stack.pop() {
                                on_stack[member.index()] = false;
                                component[member.index()] = Some(id);
                                size += 1;
                                if member == v {
                                    break;
                                }
                            }
                            sizes.push(size);
                        }
                    }
                }
            }
        }

        Self {
            graph,
            component,
            sizes,
        }
    }

    /// Whether `id` lies on at least one cycle of the subgraph
    fn on_cycle(&self, id: NodeId) -> bool {
        match self.component[id.index()] {
            Some(c) => self.sizes[c] > 1 || self.graph.node_at(id).dependencies().contains(&id),
            None => false,
        }
    }

    fn members(&self, id: NodeId) -> BTreeSet<NodeId> {
        let target = self.component[id.index()];
        self.graph
            .ids_by_hash()
            .filter(|other| target.is_some() && self.component[other.index()] == target)
            .collect()
    }
}

/// One level of the circuit search: a vertex and its remaining successors.
struct Frame {
    vertex: NodeId,
    successors: Vec<NodeId>,
    next: usize,
    found: bool,
}

struct CircuitSearch<'g> {
    graph: &'g DependencyGraph,
    blocked: Vec<bool>,
    blocked_by: Vec<BTreeSet<NodeId>>,
    path: Vec<NodeId>,
    cycles: Vec<Cycle>,
}

impl<'g> CircuitSearch<'g> {
    fn new(graph: &'g DependencyGraph) -> Self {
        Self {
            graph,
            blocked: vec![false; graph.len()],
            blocked_by: vec![BTreeSet::new(); graph.len()],
            path: Vec::new(),
            cycles: Vec::new(),
        }
    }

    fn run(&mut self, start: NodeId, component: &BTreeSet<NodeId>) {
        for id in component {
            self.blocked[id.index()] = false;
            self.blocked_by[id.index()].clear();
        }

        let mut frames = vec![self.enter(start, component)];
        while let Some(frame) = frames.last_mut() {
            if let Some(&w) = frame.successors.get(frame.next) {
                frame.next += 1;
                if w == start {
                    frame.found = true;
                    self.emit();
                } else if !self.blocked[w.index()] {
                    let child = self.enter(w, component);
                    frames.push(child);
                }
                continue;
            }

            let Some(done) = frames.pop() else {
                break;
            };
            if done.found {
                self.unblock(done.vertex);
            } else {
                for w in &done.successors {
                    self.blocked_by[w.index()].insert(done.vertex);
                }
            }
            self.path.pop();
            if let Some(parent) = frames.last_mut() {
                parent.found |= done.found;
            }
        }
    }

    fn enter(&mut self, v: NodeId, component: &BTreeSet<NodeId>) -> Frame {
        self.path.push(v);
        self.blocked[v.index()] = true;
        let successors = self
            .graph
            .node_at(v)
            .dependencies()
            .iter()
            .copied()
            .filter(|w| component.contains(w))
            .collect();
        Frame {
            vertex: v,
            successors,
            next: 0,
            found: false,
        }
    }

    fn unblock(&mut self, u: NodeId) {
        self.blocked[u.index()] = false;
        let mut pending = vec![u];
        while let Some(x) = pending.pop() {
            for w in std::mem::take(&mut self.blocked_by[x.index()]) {
                if self.blocked[w.index()] {
                    self.blocked[w.index()] = false;
                    pending.push(w);
                }
            }
        }
    }

    fn emit(&mut self) {
        let hashes = self
            .path
            .iter()
            .map(|id| self.graph.node_at(*id).hash().to_string())
            .collect();
        self.cycles.push(Cycle(hashes));
    }
}

/// Result of validating a graph for acyclicity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphValidation {
    cycles: Vec<Cycle>,
}

impl GraphValidation {
    /// Validate a graph
    pub fn of(graph: &DependencyGraph) -> Self {
        Self {
            cycles: detect_cycles(graph),
        }
    }

    /// True when no cycles were found
    pub fn is_acyclic(&self) -> bool {
        self.cycles.is_empty()
    }

    /// Detected cycles
    pub fn cycles(&self) -> &[Cycle] {
        &self.cycles
    }

    /// Refuse `operation` on a cyclic graph.
    pub fn require_acyclic(&self, operation: &str) -> GraphResult<()> {
        if self.is_acyclic() {
            return Ok(());
        }
        let count = self.cycles.len().to_string();
        log_event_with_fields(
            Event::GraphCycleRejected,
            &[("operation", operation), ("cycles", &count)],
        );
        Err(GraphError::cyclic(operation, self.cycles.len()))
    }

    /// Log a warning for a read-only `operation` on a cyclic graph and
    /// carry on.
    pub fn warn_if_cyclic(&self, operation: &str) {
        if self.is_acyclic() {
            return;
        }
        let count = self.cycles.len().to_string();
        log_event_with_fields(
            Event::GraphCycleWarning,
            &[("operation", operation), ("cycles", &count)],
        );
    }
}
