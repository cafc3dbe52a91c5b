//! # settle-engine
//!
//! Household debt-network simplification engine.
//!
//! Given a directed graph of pairwise IOUs inside a household, this engine
//! computes a minimal equivalent set of debts using repeated bounded
//! maximum-flow computation over a residual graph.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: member identifiers, ledger transactions
//! - **graph** — The flow graph: capacities, flows, residual bookkeeping
//! - **settlement** — Max-flow engine and the debt-simplification orchestrator
//! - **simulation** — Random debt-network generation for benchmarks and testing
//!
//! The engine is synchronous and self-contained: it performs no I/O and never
//! mutates a caller's graph. Storage and transport belong to the surrounding
//! application.

pub mod core;
pub mod graph;
pub mod settlement;
pub mod simulation;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::member::MemberId;
    pub use crate::core::transaction::{Transaction, TransactionSet};
    pub use crate::graph::flow_graph::{Amount, Edge, FlowGraph, GraphError};
    pub use crate::settlement::max_flow::{FlowError, MaxFlow};
    pub use crate::settlement::settle::{Settle, SettleError};
    pub use crate::settlement::summary::SettlementSummary;
}
