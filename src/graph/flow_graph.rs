use crate::core::member::MemberId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Money amount in minor units (pence).
///
/// Capacities and flows are exact non-negative integers; the engine performs
/// no fractional arithmetic.
pub type Amount = u64;

/// Errors arising from flow-graph construction and queries.
///
/// `EdgeNotFound` is an expected, recoverable probe result — the settlement
/// orchestrator uses it as control flow when an edge has already been settled
/// out of the graph. The remaining variants indicate misuse or corrupted
/// state and are not retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("no edge from {src} to {target}")]
    EdgeNotFound { src: MemberId, target: MemberId },
    #[error("edge from {src} to {target} already exists")]
    DuplicateEdge { src: MemberId, target: MemberId },
    #[error("self-loop on {vertex} is not allowed")]
    SelfLoop { vertex: MemberId },
    #[error("cannot push {requested} from {src} to {target}: residual capacity is {available}")]
    InsufficientResidual {
        src: MemberId,
        target: MemberId,
        requested: Amount,
        available: Amount,
    },
}

/// A directed debt edge from an implicit owner vertex to `target`.
///
/// `capacity` is the total amount owed along the edge; `flow` is the amount
/// already pushed by augmentation, with `0 <= flow <= capacity` at all times.
/// The backward residual capacity is not stored anywhere — it is always equal
/// to `flow` and is exposed through [`FlowGraph::residual_capacity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    target: MemberId,
    capacity: Amount,
    flow: Amount,
}

impl Edge {
    /// Create an edge with the given capacity and no flow.
    pub fn new(target: MemberId, capacity: Amount) -> Self {
        Self {
            target,
            capacity,
            flow: 0,
        }
    }

    pub fn target(&self) -> &MemberId {
        &self.target
    }

    pub fn capacity(&self) -> Amount {
        self.capacity
    }

    pub fn flow(&self) -> Amount {
        self.flow
    }

    /// Remaining forward capacity, `capacity - flow`.
    pub fn unused_capacity(&self) -> Amount {
        self.capacity - self.flow
    }

    pub fn is_saturated(&self) -> bool {
        self.flow == self.capacity
    }
}

/// A directed weighted debt network with built-in residual bookkeeping.
///
/// Vertices are household members; an edge `u -> v` means `u` owes `v` its
/// capacity. At most one forward edge exists per ordered pair and self-loops
/// are rejected. Residual adjacency is a computed view over forward edges,
/// never separately stored state.
///
/// Iteration is deterministic: vertices keep insertion order, and
/// [`FlowGraph::neighbours`] yields forward targets in edge-insertion order
/// followed by residual-only sources in vertex-insertion order. Graph
/// algorithms built on top are therefore reproducible.
///
/// # Examples
///
/// ```
/// use settle_engine::prelude::*;
///
/// let mut graph = FlowGraph::new();
/// graph
///     .add_edge(MemberId::new("ayla"), Edge::new(MemberId::new("ben"), 1_000))
///     .unwrap();
///
/// let ayla = MemberId::new("ayla");
/// let ben = MemberId::new("ben");
/// assert_eq!(graph.residual_capacity(&ayla, &ben), 1_000);
/// assert_eq!(graph.neighbours(&ayla), vec![ben]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowGraph {
    /// Vertex insertion order; the basis for all deterministic iteration.
    order: Vec<MemberId>,
    /// Outgoing forward edges per vertex, in insertion order.
    adjacency: HashMap<MemberId, Vec<Edge>>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            adjacency: HashMap::new(),
        }
    }

    /// Create a graph with the given vertices and no edges.
    pub fn with_vertices(vertices: impl IntoIterator<Item = MemberId>) -> Self {
        let mut graph = Self::new();
        for vertex in vertices {
            graph.add_vertex(vertex);
        }
        graph
    }

    /// Register a vertex. Re-registering an existing vertex is a no-op.
    pub fn add_vertex(&mut self, vertex: MemberId) {
        if !self.adjacency.contains_key(&vertex) {
            self.order.push(vertex.clone());
            self.adjacency.insert(vertex, Vec::new());
        }
    }

    /// All vertices, in insertion order.
    pub fn vertices(&self) -> &[MemberId] {
        &self.order
    }

    pub fn contains_vertex(&self, vertex: &MemberId) -> bool {
        self.adjacency.contains_key(vertex)
    }

    pub fn member_count(&self) -> usize {
        self.order.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    /// All forward edges as `(src, edge)` pairs, in deterministic order.
    pub fn edges(&self) -> Vec<(&MemberId, &Edge)> {
        let mut all = Vec::with_capacity(self.edge_count());
        for vertex in &self.order {
            if let Some(edges) = self.adjacency.get(vertex) {
                for edge in edges {
                    all.push((vertex, edge));
                }
            }
        }
        all
    }

    /// Total outstanding debt: the sum of unused capacity over all edges.
    pub fn gross_debt(&self) -> Amount {
        self.adjacency
            .values()
            .flatten()
            .map(Edge::unused_capacity)
            .sum()
    }

    /// Insert a forward edge from `src`.
    ///
    /// Both endpoints are registered as vertices if they are not yet known.
    pub fn add_edge(&mut self, src: MemberId, edge: Edge) -> Result<(), GraphError> {
        if src == *edge.target() {
            return Err(GraphError::SelfLoop { vertex: src });
        }
        self.add_vertex(src.clone());
        self.add_vertex(edge.target().clone());

        let edges = self.adjacency.entry(src.clone()).or_default();
        if edges.iter().any(|e| e.target() == edge.target()) {
            return Err(GraphError::DuplicateEdge {
                src,
                target: edge.target().clone(),
            });
        }
        edges.push(edge);
        Ok(())
    }

    /// Look up the forward edge for an ordered pair.
    ///
    /// Returns [`GraphError::EdgeNotFound`] when no such edge exists; callers
    /// probing the graph treat this as a normal, recoverable answer.
    pub fn get_edge(&self, src: &MemberId, target: &MemberId) -> Result<&Edge, GraphError> {
        self.adjacency
            .get(src)
            .and_then(|edges| edges.iter().find(|e| e.target() == target))
            .ok_or_else(|| GraphError::EdgeNotFound {
                src: src.clone(),
                target: target.clone(),
            })
    }

    fn edge_mut(&mut self, src: &MemberId, target: &MemberId) -> Option<&mut Edge> {
        self.adjacency
            .get_mut(src)
            .and_then(|edges| edges.iter_mut().find(|e| e.target() == target))
    }

    /// Residual capacity from `src` to `target`: forward unused capacity plus
    /// the backward capacity derived from any reverse edge's flow. Zero when
    /// neither edge exists. This is a computed view, not stored state.
    pub fn residual_capacity(&self, src: &MemberId, target: &MemberId) -> Amount {
        let forward = self
            .get_edge(src, target)
            .map(|e| e.unused_capacity())
            .unwrap_or(0);
        let backward = self.get_edge(target, src).map(|e| e.flow()).unwrap_or(0);
        forward + backward
    }

    /// Vertices reachable from `v` through positive residual capacity.
    ///
    /// Forward targets come first in edge-insertion order, then vertices
    /// reachable only by undoing pushed flow, in vertex-insertion order.
    pub fn neighbours(&self, v: &MemberId) -> Vec<MemberId> {
        let mut out: Vec<MemberId> = Vec::new();
        if let Some(edges) = self.adjacency.get(v) {
            for edge in edges {
                if edge.unused_capacity() > 0 {
                    out.push(edge.target().clone());
                }
            }
        }
        for other in &self.order {
            if other == v || out.contains(other) {
                continue;
            }
            let carries_flow = self
                .adjacency
                .get(other)
                .map(|edges| edges.iter().any(|e| e.target() == v && e.flow() > 0))
                .unwrap_or(false);
            if carries_flow {
                out.push(other.clone());
            }
        }
        out
    }

    /// Push `amount` along every consecutive pair of `path`.
    ///
    /// For each pair, previously pushed flow on the reverse edge is cancelled
    /// first; any remainder increases the forward edge's flow. Exceeding the
    /// residual capacity of a pair is a graph-invariant violation and fails
    /// with [`GraphError::InsufficientResidual`].
    pub fn augment_flow(&mut self, path: &[MemberId], amount: Amount) -> Result<(), GraphError> {
        for pair in path.windows(2) {
            self.push_between(&pair[0], &pair[1], amount)?;
        }
        Ok(())
    }

    fn push_between(
        &mut self,
        src: &MemberId,
        target: &MemberId,
        amount: Amount,
    ) -> Result<(), GraphError> {
        let available = self.residual_capacity(src, target);
        if available < amount {
            return Err(GraphError::InsufficientResidual {
                src: src.clone(),
                target: target.clone(),
                requested: amount,
                available,
            });
        }
        let mut remaining = amount;
        if let Some(reverse) = self.edge_mut(target, src) {
            let cancelled = reverse.flow.min(remaining);
            reverse.flow -= cancelled;
            remaining -= cancelled;
        }
        if remaining > 0 {
            if let Some(forward) = self.edge_mut(src, target) {
                forward.flow += remaining;
            }
        }
        Ok(())
    }

    /// Mark the forward edge for an ordered pair as fully used.
    pub fn saturate_edge(&mut self, src: &MemberId, target: &MemberId) -> Result<(), GraphError> {
        match self.edge_mut(src, target) {
            Some(edge) => {
                edge.flow = edge.capacity;
                Ok(())
            }
            None => Err(GraphError::EdgeNotFound {
                src: src.clone(),
                target: target.clone(),
            }),
        }
    }

    /// Remove every edge whose unused capacity has reached zero.
    ///
    /// Idempotent: pruning twice in a row is a no-op.
    pub fn prune_edges(&mut self) {
        for edges in self.adjacency.values_mut() {
            edges.retain(|e| e.unused_capacity() > 0);
        }
    }

    /// Fold pushed flow into capacity: every edge keeps only its unused
    /// capacity and its flow resets to zero. Saturated edges are dropped.
    ///
    /// After a commit the graph has no backward residual capacity anywhere, so
    /// settled cancellation cannot be undone by a later flow computation.
    pub fn commit_flows(&mut self) {
        for edges in self.adjacency.values_mut() {
            for edge in edges.iter_mut() {
                edge.capacity = edge.unused_capacity();
                edge.flow = 0;
            }
            edges.retain(|e| e.capacity > 0);
        }
    }
}

impl Default for FlowGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Structural equality: identical vertex sets and identical
/// `(src, target, capacity, flow)` tuples, independent of insertion order.
impl PartialEq for FlowGraph {
    fn eq(&self, other: &Self) -> bool {
        let mut ours: Vec<&MemberId> = self.order.iter().collect();
        let mut theirs: Vec<&MemberId> = other.order.iter().collect();
        ours.sort();
        theirs.sort();
        if ours != theirs {
            return false;
        }

        let tuples = |graph: &Self| {
            let mut edges: Vec<(MemberId, MemberId, Amount, Amount)> = graph
                .edges()
                .into_iter()
                .map(|(src, e)| (src.clone(), e.target().clone(), e.capacity(), e.flow()))
                .collect();
            edges.sort();
            edges
        };
        tuples(self) == tuples(other)
    }
}

impl Eq for FlowGraph {}
