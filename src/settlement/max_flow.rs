use crate::core::member::MemberId;
use crate::graph::flow_graph::{Amount, FlowGraph, GraphError};
use log::trace;
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

/// Errors arising from flow computation.
///
/// Plain unreachability of the sink is *not* an error — it is the normal
/// termination signal of the max-flow loop, reported as an empty path.
/// `BrokenPath` means the BFS predecessor data was internally inconsistent,
/// which indicates a violated graph invariant and is never retried.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("broken path: could not reconstruct a path from {src} to {sink}")]
    BrokenPath { src: MemberId, sink: MemberId },
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Maximum-flow computation over a [`FlowGraph`].
///
/// Implements the Edmunds–Karp specialisation of Ford–Fulkerson: repeatedly
/// augment along the shortest residual path (by edge count) found with a
/// breadth-first search, until the sink is unreachable.
pub struct MaxFlow;

impl MaxFlow {
    /// Maximum amount that can flow from `src` to `sink` through current
    /// residual capacities.
    ///
    /// Mutates the graph's flow values as a side effect; callers that need the
    /// pre-flow graph must clone first. `src == sink` returns `0` without
    /// looping. Each augmentation saturates at least one edge, so the loop
    /// terminates after at most O(V·E) augmentations.
    ///
    /// # Examples
    ///
    /// ```
    /// use settle_engine::prelude::*;
    ///
    /// let mut graph = FlowGraph::new();
    /// graph
    ///     .add_edge(MemberId::new("a"), Edge::new(MemberId::new("b"), 10))
    ///     .unwrap();
    /// graph
    ///     .add_edge(MemberId::new("b"), Edge::new(MemberId::new("c"), 4))
    ///     .unwrap();
    ///
    /// let flow = MaxFlow::edmunds_karp(&mut graph, &MemberId::new("a"), &MemberId::new("c"))
    ///     .unwrap();
    /// assert_eq!(flow, 4);
    /// ```
    pub fn edmunds_karp(
        graph: &mut FlowGraph,
        src: &MemberId,
        sink: &MemberId,
    ) -> Result<Amount, FlowError> {
        Self::bounded(graph, src, sink, Amount::MAX)
    }

    /// Like [`MaxFlow::edmunds_karp`], but stop once `limit` has been pushed.
    ///
    /// The final augmentation pushes a partial bottleneck when the full one
    /// would overshoot the limit. The settlement orchestrator uses this to
    /// drain at most the direct debt of the pair being settled.
    pub(crate) fn bounded(
        graph: &mut FlowGraph,
        src: &MemberId,
        sink: &MemberId,
        limit: Amount,
    ) -> Result<Amount, FlowError> {
        if src == sink || limit == 0 {
            return Ok(0);
        }

        let mut total: Amount = 0;
        loop {
            let path = Self::augmenting_path(graph, src, sink)?;
            if path.is_empty() {
                break;
            }
            let push = Self::bottleneck(graph, &path).min(limit - total);
            graph.augment_flow(&path, push)?;
            total += push;
            trace!("augmented {push} along {} vertices, total {total}", path.len());
            if total == limit {
                break;
            }
        }
        Ok(total)
    }

    /// Shortest augmenting path from `src` to `sink` by edge count.
    ///
    /// Returns the vertex sequence `[src, ..., sink]`, or an empty vector when
    /// the sink is unreachable under current residual capacities — the normal
    /// termination condition, never an error.
    pub fn augmenting_path(
        graph: &FlowGraph,
        src: &MemberId,
        sink: &MemberId,
    ) -> Result<Vec<MemberId>, FlowError> {
        // visited and predecessor maps seeded for every vertex
        let mut visited: HashMap<MemberId, bool> = graph
            .vertices()
            .iter()
            .map(|v| (v.clone(), false))
            .collect();
        let mut came_from: HashMap<MemberId, Option<MemberId>> = graph
            .vertices()
            .iter()
            .map(|v| (v.clone(), None))
            .collect();

        let mut queue: VecDeque<MemberId> = VecDeque::from([src.clone()]);

        'search: while let Some(current) = queue.pop_front() {
            visited.insert(current.clone(), true);

            for neighbour in graph.neighbours(&current) {
                if visited.get(&neighbour).copied().unwrap_or(false) {
                    continue;
                }
                // already discovered from a shorter or equal distance
                if neighbour == *src || came_from.get(&neighbour).is_some_and(|p| p.is_some()) {
                    continue;
                }
                came_from.insert(neighbour.clone(), Some(current.clone()));
                // BFS explores in non-decreasing edge distance, so the first
                // discovery of the sink already lies on a shortest path
                if neighbour == *sink {
                    break 'search;
                }
                queue.push_back(neighbour);
            }
        }

        Self::path_from_map(&came_from, src, sink)
    }

    /// Minimum residual capacity over the consecutive pairs of `path`.
    ///
    /// # Panics
    ///
    /// Panics if `path` has fewer than two vertices — a programming error at
    /// the call site, not a graph condition.
    pub fn bottleneck(graph: &FlowGraph, path: &[MemberId]) -> Amount {
        assert!(
            path.len() >= 2,
            "bottleneck requires a path of at least two vertices, got {}",
            path.len()
        );
        path.windows(2).fold(Amount::MAX, |min, pair| {
            min.min(graph.residual_capacity(&pair[0], &pair[1]))
        })
    }

    /// Reconstruct the vertex path by walking predecessors back from `sink`.
    ///
    /// An undiscovered sink yields an empty path. A predecessor chain that
    /// exists but does not lead back to `src` is corrupted state and fails
    /// loudly.
    fn path_from_map(
        came_from: &HashMap<MemberId, Option<MemberId>>,
        src: &MemberId,
        sink: &MemberId,
    ) -> Result<Vec<MemberId>, FlowError> {
        match came_from.get(sink) {
            // sink was never discovered: no augmenting path remains
            None | Some(None) => return Ok(Vec::new()),
            Some(Some(_)) => {}
        }

        let mut path: Vec<MemberId> = vec![sink.clone()];
        let mut current = sink;
        while let Some(Some(previous)) = came_from.get(current) {
            path.push(previous.clone());
            current = previous;
            if path.len() > came_from.len() {
                // a cycle in the predecessor map can never terminate at src
                return Err(FlowError::BrokenPath {
                    src: src.clone(),
                    sink: sink.clone(),
                });
            }
        }
        path.reverse();

        if path.first() != Some(src) {
            return Err(FlowError::BrokenPath {
                src: src.clone(),
                sink: sink.clone(),
            });
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::flow_graph::Edge;

    fn member(id: &str) -> MemberId {
        MemberId::new(id)
    }

    #[test]
    fn test_direct_edge_flow() {
        let mut graph = FlowGraph::new();
        graph.add_edge(member("a"), Edge::new(member("b"), 10)).unwrap();

        let flow = MaxFlow::edmunds_karp(&mut graph, &member("a"), &member("b")).unwrap();
        assert_eq!(flow, 10);
        assert!(graph.get_edge(&member("a"), &member("b")).unwrap().is_saturated());
    }

    #[test]
    fn test_src_equals_sink_is_zero() {
        let mut graph = FlowGraph::new();
        graph.add_edge(member("a"), Edge::new(member("b"), 10)).unwrap();
        let flow = MaxFlow::edmunds_karp(&mut graph, &member("a"), &member("a")).unwrap();
        assert_eq!(flow, 0);
    }

    #[test]
    fn test_unreachable_sink_is_zero_not_error() {
        let mut graph = FlowGraph::new();
        graph.add_edge(member("a"), Edge::new(member("b"), 5)).unwrap();
        graph.add_vertex(member("c"));

        let flow = MaxFlow::edmunds_karp(&mut graph, &member("a"), &member("c")).unwrap();
        assert_eq!(flow, 0);
    }

    #[test]
    fn test_chain_bottleneck() {
        let mut graph = FlowGraph::new();
        graph.add_edge(member("a"), Edge::new(member("b"), 10)).unwrap();
        graph.add_edge(member("b"), Edge::new(member("c"), 4)).unwrap();

        let flow = MaxFlow::edmunds_karp(&mut graph, &member("a"), &member("c")).unwrap();
        assert_eq!(flow, 4);
        assert_eq!(graph.get_edge(&member("a"), &member("b")).unwrap().flow(), 4);
    }

    #[test]
    fn test_parallel_routes_sum() {
        let mut graph = FlowGraph::new();
        graph.add_edge(member("a"), Edge::new(member("b"), 6)).unwrap();
        graph.add_edge(member("a"), Edge::new(member("c"), 5)).unwrap();
        graph.add_edge(member("c"), Edge::new(member("b"), 3)).unwrap();

        let flow = MaxFlow::edmunds_karp(&mut graph, &member("a"), &member("b")).unwrap();
        assert_eq!(flow, 9);
    }

    #[test]
    fn test_cross_edge_does_not_reduce_flow() {
        // two disjoint routes a -> b -> d and a -> c -> d plus a cross edge
        let mut graph = FlowGraph::new();
        graph.add_edge(member("a"), Edge::new(member("b"), 1)).unwrap();
        graph.add_edge(member("a"), Edge::new(member("c"), 1)).unwrap();
        graph.add_edge(member("b"), Edge::new(member("c"), 1)).unwrap();
        graph.add_edge(member("b"), Edge::new(member("d"), 1)).unwrap();
        graph.add_edge(member("c"), Edge::new(member("d"), 1)).unwrap();

        let flow = MaxFlow::edmunds_karp(&mut graph, &member("a"), &member("d")).unwrap();
        assert_eq!(flow, 2);
    }

    #[test]
    fn test_augmenting_path_is_shortest() {
        let mut graph = FlowGraph::new();
        // long route a -> b -> c -> d and short route a -> d
        graph.add_edge(member("a"), Edge::new(member("b"), 1)).unwrap();
        graph.add_edge(member("b"), Edge::new(member("c"), 1)).unwrap();
        graph.add_edge(member("c"), Edge::new(member("d"), 1)).unwrap();
        graph.add_edge(member("a"), Edge::new(member("d"), 1)).unwrap();

        let path = MaxFlow::augmenting_path(&graph, &member("a"), &member("d")).unwrap();
        assert_eq!(path, vec![member("a"), member("d")]);
    }

    #[test]
    fn test_augmenting_path_empty_when_unreachable() {
        let mut graph = FlowGraph::new();
        graph.add_edge(member("a"), Edge::new(member("b"), 5)).unwrap();
        graph.add_vertex(member("c"));

        let path = MaxFlow::augmenting_path(&graph, &member("a"), &member("c")).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn test_bottleneck_minimum() {
        let mut graph = FlowGraph::new();
        graph.add_edge(member("a"), Edge::new(member("b"), 10)).unwrap();
        graph.add_edge(member("b"), Edge::new(member("c"), 3)).unwrap();

        let path = vec![member("a"), member("b"), member("c")];
        assert_eq!(MaxFlow::bottleneck(&graph, &path), 3);
    }

    #[test]
    #[should_panic(expected = "at least two vertices")]
    fn test_bottleneck_short_path_panics() {
        let graph = FlowGraph::new();
        MaxFlow::bottleneck(&graph, &[member("a")]);
    }

    #[test]
    fn test_broken_predecessor_chain_fails_loudly() {
        // sink has a predecessor but the chain never reaches the source
        let mut came_from: HashMap<MemberId, Option<MemberId>> = HashMap::new();
        came_from.insert(member("a"), None);
        came_from.insert(member("x"), None);
        came_from.insert(member("sink"), Some(member("x")));

        let result = MaxFlow::path_from_map(&came_from, &member("a"), &member("sink"));
        assert!(matches!(result, Err(FlowError::BrokenPath { .. })));
    }

    #[test]
    fn test_cyclic_predecessor_chain_fails_loudly() {
        let mut came_from: HashMap<MemberId, Option<MemberId>> = HashMap::new();
        came_from.insert(member("a"), None);
        came_from.insert(member("x"), Some(member("y")));
        came_from.insert(member("y"), Some(member("x")));
        came_from.insert(member("sink"), Some(member("x")));

        let result = MaxFlow::path_from_map(&came_from, &member("a"), &member("sink"));
        assert!(matches!(result, Err(FlowError::BrokenPath { .. })));
    }

    #[test]
    fn test_bounded_stops_at_limit() {
        let mut graph = FlowGraph::new();
        graph.add_edge(member("a"), Edge::new(member("b"), 10)).unwrap();

        let flow = MaxFlow::bounded(&mut graph, &member("a"), &member("b"), 4).unwrap();
        assert_eq!(flow, 4);
        assert_eq!(graph.get_edge(&member("a"), &member("b")).unwrap().flow(), 4);
    }

    #[test]
    fn test_capacity_bound_holds_after_run() {
        let mut graph = FlowGraph::new();
        graph.add_edge(member("a"), Edge::new(member("b"), 7)).unwrap();
        graph.add_edge(member("b"), Edge::new(member("c"), 9)).unwrap();
        graph.add_edge(member("a"), Edge::new(member("c"), 2)).unwrap();

        MaxFlow::edmunds_karp(&mut graph, &member("a"), &member("c")).unwrap();
        for (_, edge) in graph.edges() {
            assert!(edge.flow() <= edge.capacity());
        }
    }
}
