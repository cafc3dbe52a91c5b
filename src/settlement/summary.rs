use crate::graph::flow_graph::{Amount, FlowGraph};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Before/after statistics for one simplification run.
///
/// Computed from the input and output graphs; the application layer uses it
/// for reporting, nothing here feeds back into the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementSummary {
    /// Members in the network.
    pub member_count: usize,
    /// Debt edges before simplification.
    pub edges_before: usize,
    /// Debt edges after simplification.
    pub edges_after: usize,
    /// Total outstanding debt before, in minor units.
    pub gross_before: Amount,
    /// Total outstanding debt after, in minor units.
    pub gross_after: Amount,
}

impl SettlementSummary {
    /// Compare a debt network with its simplified counterpart.
    pub fn compare(before: &FlowGraph, after: &FlowGraph) -> Self {
        Self {
            member_count: before.member_count(),
            edges_before: before.edge_count(),
            edges_after: after.edge_count(),
            gross_before: before.gross_debt(),
            gross_after: after.gross_debt(),
        }
    }

    /// Number of debt relationships settled away.
    pub fn edges_removed(&self) -> usize {
        self.edges_before.saturating_sub(self.edges_after)
    }

    /// Total debt cancelled by simplification, in minor units.
    pub fn debt_cleared(&self) -> Amount {
        self.gross_before.saturating_sub(self.gross_after)
    }

    /// Cleared debt as a percentage of the gross before simplification.
    pub fn reduction_percent(&self) -> f64 {
        if self.gross_before == 0 {
            return 0.0;
        }
        self.debt_cleared() as f64 * 100.0 / self.gross_before as f64
    }
}

impl fmt::Display for SettlementSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Settlement Summary ===")?;
        writeln!(f, "Members:       {}", self.member_count)?;
        writeln!(f, "Edges:         {} -> {}", self.edges_before, self.edges_after)?;
        writeln!(f, "Gross debt:    {} -> {}", self.gross_before, self.gross_after)?;
        writeln!(f, "Debt cleared:  {}", self.debt_cleared())?;
        writeln!(f, "Reduction:     {:.1}%", self.reduction_percent())?;
        Ok(())
    }
}
