//! The debt network as a flow graph with residual bookkeeping.

pub mod flow_graph;
