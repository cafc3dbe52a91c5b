//! Maximum flow and the debt-simplification orchestrator.

pub mod max_flow;
pub mod settle;
pub mod summary;
