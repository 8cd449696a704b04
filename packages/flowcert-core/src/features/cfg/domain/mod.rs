//! CFG domain types

pub mod graph;

pub use graph::{BasicBlock, BlockId, CfgEdge, ControlFlowGraph, EdgeKind};
