//! Control-flow analyses: CFG, dominator tree, dominance frontiers.
//!
//! Analyses never hold references into the function they describe; they
//! are id-indexed snapshots, recomputed on demand and discarded.

pub mod cfg;
pub mod dominance;

pub use cfg::{build_control_flow_graph, ControlFlowGraph, ControlFlowGraphNode};
pub use dominance::{
    build_dominance_frontier, build_dominator_tree, DominanceFrontier, DominanceFrontierNode,
    DominatorTree, DominatorTreeNode,
};
