use crate::core::member::MemberId;
use crate::graph::flow_graph::{Edge, FlowGraph, GraphError};
use crate::settlement::max_flow::{FlowError, MaxFlow};
use log::debug;
use thiserror::Error;

/// Errors arising from debt simplification.
#[derive(Debug, Error)]
pub enum SettleError {
    /// The simplified graph is structurally identical to the input.
    ///
    /// A no-op signal, not a fault: nothing changed, so the caller has nothing
    /// to persist and nothing to roll back.
    #[error("no simplifications were made")]
    NoSimplification,
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// The debt-simplification orchestrator.
///
/// Walks every adjacent pair of the debt network, nets the pair's direct debt
/// against the maximum counter-flow the rest of the network can carry back,
/// and collects the surviving net debts into a fresh graph.
pub struct Settle;

impl Settle {
    /// Produce a simplified debt network.
    ///
    /// For each pair `(u, v)` with a direct debt of `owed`, the engine drains
    /// the maximum counter-flow from `v` back to `u` through the rest of the
    /// network, bounded by `owed`. Whatever flows back cancels: a cycle of
    /// debt carries no net obligation. The remainder, if any, becomes a single
    /// consolidated edge in the output. Saturated edges are pruned and
    /// remaining flows committed after every pair, so cancelled debt is
    /// neither recorded nor reprocessed.
    ///
    /// The caller's graph is never mutated: the engine works on an owned copy
    /// and compares the result against an owned snapshot. Every member's net
    /// position (owed minus owing) is identical before and after.
    ///
    /// Returns [`SettleError::NoSimplification`] when the output is
    /// structurally equal to the input — including for an empty network.
    ///
    /// # Examples
    ///
    /// ```
    /// use settle_engine::prelude::*;
    ///
    /// let mut debts = FlowGraph::new();
    /// debts
    ///     .add_edge(MemberId::new("ayla"), Edge::new(MemberId::new("ben"), 1_000))
    ///     .unwrap();
    /// debts
    ///     .add_edge(MemberId::new("ben"), Edge::new(MemberId::new("ayla"), 400))
    ///     .unwrap();
    ///
    /// let simplified = Settle::simplify_debt(&debts).unwrap();
    /// let edge = simplified
    ///     .get_edge(&MemberId::new("ayla"), &MemberId::new("ben"))
    ///     .unwrap();
    /// assert_eq!(edge.capacity(), 600);
    /// assert_eq!(simplified.edge_count(), 1);
    /// ```
    pub fn simplify_debt(debt_network: &FlowGraph) -> Result<FlowGraph, SettleError> {
        // owned snapshot for the final no-op comparison, owned working copy
        // for mutation; the caller's graph is read-only throughout
        let snapshot = debt_network.clone();
        let mut working = debt_network.clone();
        let mut simplified = FlowGraph::with_vertices(debt_network.vertices().iter().cloned());

        let members: Vec<MemberId> = working.vertices().to_vec();
        for member in &members {
            for neighbour in working.neighbours(member) {
                // the edge may have been settled out of the graph while
                // handling an earlier pair; that is expected, move on
                let owed = match working.get_edge(member, &neighbour) {
                    Ok(edge) => edge.unused_capacity(),
                    Err(GraphError::EdgeNotFound { .. }) => continue,
                    Err(e) => return Err(e.into()),
                };

                let countered = MaxFlow::bounded(&mut working, &neighbour, member, owed)?;
                debug!("settling {member} -> {neighbour}: owed {owed}, countered {countered}");

                if owed > countered {
                    simplified.add_edge(
                        member.clone(),
                        Edge::new(neighbour.clone(), owed - countered),
                    )?;
                }

                // the direct debt is fully accounted for: `countered` cancelled
                // against the counter-flow, the rest recorded above
                working.saturate_edge(member, &neighbour)?;
                working.prune_edges();
                working.commit_flows();
            }
        }

        if simplified == snapshot {
            return Err(SettleError::NoSimplification);
        }
        Ok(simplified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: &str) -> MemberId {
        MemberId::new(id)
    }

    fn graph_of(edges: &[(&str, &str, u64)]) -> FlowGraph {
        let mut graph = FlowGraph::new();
        for (src, dst, amount) in edges {
            graph
                .add_edge(member(src), Edge::new(member(dst), *amount))
                .unwrap();
        }
        graph
    }

    #[test]
    fn test_cycle_cancels_completely() {
        let debts = graph_of(&[("a", "b", 10), ("b", "c", 10), ("c", "a", 10)]);
        let simplified = Settle::simplify_debt(&debts).unwrap();

        assert_eq!(simplified.edge_count(), 0);
        assert_eq!(simplified.member_count(), 3);
        assert_eq!(simplified.gross_debt(), 0);
    }

    #[test]
    fn test_opposite_edges_net() {
        let debts = graph_of(&[("a", "b", 10), ("b", "a", 4)]);
        let simplified = Settle::simplify_debt(&debts).unwrap();

        assert_eq!(simplified.edge_count(), 1);
        let edge = simplified.get_edge(&member("a"), &member("b")).unwrap();
        assert_eq!(edge.capacity(), 6);
        assert_eq!(edge.flow(), 0);
    }

    #[test]
    fn test_opposite_edges_net_the_other_way() {
        let debts = graph_of(&[("a", "b", 4), ("b", "a", 10)]);
        let simplified = Settle::simplify_debt(&debts).unwrap();

        assert_eq!(simplified.edge_count(), 1);
        let edge = simplified.get_edge(&member("b"), &member("a")).unwrap();
        assert_eq!(edge.capacity(), 6);
    }

    #[test]
    fn test_chain_is_already_minimal() {
        let debts = graph_of(&[("a", "b", 10), ("b", "c", 10)]);
        let result = Settle::simplify_debt(&debts);
        assert!(matches!(result, Err(SettleError::NoSimplification)));
    }

    #[test]
    fn test_partial_cycle_reduces() {
        let debts = graph_of(&[("a", "b", 10), ("b", "c", 10), ("c", "a", 4)]);
        let simplified = Settle::simplify_debt(&debts).unwrap();

        assert_eq!(simplified.edge_count(), 2);
        assert_eq!(
            simplified.get_edge(&member("a"), &member("b")).unwrap().capacity(),
            6
        );
        assert_eq!(
            simplified.get_edge(&member("b"), &member("c")).unwrap().capacity(),
            6
        );
    }

    #[test]
    fn test_simplify_is_idempotent() {
        let debts = graph_of(&[("a", "b", 10), ("b", "a", 4), ("b", "c", 7)]);
        let simplified = Settle::simplify_debt(&debts).unwrap();

        let again = Settle::simplify_debt(&simplified);
        assert!(matches!(again, Err(SettleError::NoSimplification)));
    }

    #[test]
    fn test_empty_network_is_a_no_op() {
        let debts = FlowGraph::with_vertices(vec![member("a"), member("b")]);
        let result = Settle::simplify_debt(&debts);
        assert!(matches!(result, Err(SettleError::NoSimplification)));
    }

    #[test]
    fn test_caller_graph_is_untouched() {
        let debts = graph_of(&[("a", "b", 10), ("b", "a", 4)]);
        let before = debts.clone();
        let _ = Settle::simplify_debt(&debts).unwrap();
        assert_eq!(debts, before);
    }

    #[test]
    fn test_output_edges_carry_no_flow() {
        let debts = graph_of(&[("a", "b", 10), ("b", "a", 4), ("b", "c", 3)]);
        let simplified = Settle::simplify_debt(&debts).unwrap();
        for (_, edge) in simplified.edges() {
            assert_eq!(edge.flow(), 0);
            assert!(edge.capacity() > 0);
        }
    }

    #[test]
    fn test_net_positions_preserved() {
        let debts = graph_of(&[
            ("a", "b", 10),
            ("b", "c", 10),
            ("c", "a", 4),
            ("c", "d", 5),
            ("d", "a", 2),
        ]);
        let simplified = Settle::simplify_debt(&debts).unwrap();

        for m in debts.vertices() {
            assert_eq!(
                net_position(&debts, m),
                net_position(&simplified, m),
                "net position of {m} must be preserved"
            );
        }
    }

    fn net_position(graph: &FlowGraph, member: &MemberId) -> i128 {
        let mut position: i128 = 0;
        for (src, edge) in graph.edges() {
            if src == member {
                position -= i128::from(edge.unused_capacity());
            }
            if edge.target() == member {
                position += i128::from(edge.unused_capacity());
            }
        }
        position
    }
}
