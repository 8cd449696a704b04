//! Control flow graph types
//!
//! Blocks live in an arena addressed by dense integer index, so back edges
//! are plain indices and the graph has no ownership cycles. A block flagged
//! `dead` (code following an unconditional terminator) is retained for
//! rendering only and excluded from every analysis traversal.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::shared::models::{Expr, Statement};

/// Dense block index into the owning graph's arena
pub type BlockId = usize;

/// Control flow edge kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Sequential flow to the next leader
    Unconditional,
    /// True branch of a conditional
    TrueBranch,
    /// False branch of a conditional
    FalseBranch,
    /// Back edge to a loop header
    LoopBack,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Unconditional => "unconditional",
            EdgeKind::TrueBranch => "true",
            EdgeKind::FalseBranch => "false",
            EdgeKind::LoopBack => "loop_back",
        }
    }
}

/// Outgoing edge of a basic block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CfgEdge {
    pub target: BlockId,
    pub kind: EdgeKind,
}

/// Maximal straight-line run of statements with one entry and one exit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicBlock {
    pub id: BlockId,
    pub statements: Vec<Statement>,
    /// Condition terminating this block, if it branches
    pub branch_cond: Option<Expr>,
    pub edges: Vec<CfgEdge>,
    /// Unreachable from entry; kept for rendering only
    pub dead: bool,
}

impl BasicBlock {
    pub(crate) fn new(id: BlockId) -> Self {
        Self {
            id,
            statements: Vec::new(),
            branch_cond: None,
            edges: Vec::new(),
            dead: false,
        }
    }

    pub fn successors(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.edges.iter().map(|e| e.target)
    }

    pub fn edge_to(&self, target: BlockId) -> Option<&CfgEdge> {
        self.edges.iter().find(|e| e.target == target)
    }
}

/// Per-function control flow graph
///
/// Invariant: every non-dead block is reachable from the entry block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlFlowGraph {
    pub function_name: String,
    blocks: Vec<BasicBlock>,
    /// Blocks that leave the function: explicit returns and the implicit
    /// fall-off end
    pub exits: Vec<BlockId>,
}

impl ControlFlowGraph {
    pub(crate) fn new(function_name: String, blocks: Vec<BasicBlock>, exits: Vec<BlockId>) -> Self {
        Self {
            function_name,
            blocks,
            exits,
        }
    }

    /// The designated entry block
    pub fn entry(&self) -> BlockId {
        0
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id]
    }

    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.blocks.iter()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Blocks that participate in analysis
    pub fn live_blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.blocks.iter().filter(|b| !b.dead)
    }

    pub fn live_block_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.dead).count()
    }

    pub fn is_exit(&self, id: BlockId) -> bool {
        self.exits.contains(&id)
    }

    /// Predecessor map over live blocks
    pub fn predecessors(&self) -> FxHashMap<BlockId, Vec<BlockId>> {
        let mut preds: FxHashMap<BlockId, Vec<BlockId>> = FxHashMap::default();
        for block in self.live_blocks() {
            preds.entry(block.id).or_default();
            for edge in &block.edges {
                preds.entry(edge.target).or_default().push(block.id);
            }
        }
        preds
    }

    /// Reverse-postorder over live blocks, starting at entry. Iterative
    /// traversal with an explicit stack; no recursion on deep graphs.
    pub fn reverse_postorder(&self) -> Vec<BlockId> {
        if self.blocks.is_empty() {
            return Vec::new();
        }
        let mut visited = vec![false; self.blocks.len()];
        let mut postorder = Vec::with_capacity(self.blocks.len());
        let mut stack: Vec<(BlockId, usize)> = vec![(self.entry(), 0)];
        visited[self.entry()] = true;

        while let Some((block, cursor)) = stack.last_mut() {
            let edges = &self.blocks[*block].edges;
            if *cursor < edges.len() {
                let target = edges[*cursor].target;
                *cursor += 1;
                if !visited[target] && !self.blocks[target].dead {
                    visited[target] = true;
                    stack.push((target, 0));
                }
            } else {
                postorder.push(*block);
                stack.pop();
            }
        }

        postorder.reverse();
        postorder
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<BasicBlock> {
        &mut self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> ControlFlowGraph {
        // 0 -> 1 (true), 0 -> 2 (false), 1 -> 3, 2 -> 3
        let mut blocks: Vec<BasicBlock> = (0..4).map(BasicBlock::new).collect();
        blocks[0].edges.push(CfgEdge {
            target: 1,
            kind: EdgeKind::TrueBranch,
        });
        blocks[0].edges.push(CfgEdge {
            target: 2,
            kind: EdgeKind::FalseBranch,
        });
        blocks[1].edges.push(CfgEdge {
            target: 3,
            kind: EdgeKind::Unconditional,
        });
        blocks[2].edges.push(CfgEdge {
            target: 3,
            kind: EdgeKind::Unconditional,
        });
        ControlFlowGraph::new("diamond".to_string(), blocks, vec![3])
    }

    #[test]
    fn test_reverse_postorder_visits_join_last() {
        let cfg = diamond();
        let rpo = cfg.reverse_postorder();
        assert_eq!(rpo.len(), 4);
        assert_eq!(rpo[0], 0);
        assert_eq!(rpo[3], 3);
    }

    #[test]
    fn test_predecessors() {
        let cfg = diamond();
        let preds = cfg.predecessors();
        assert!(preds[&0].is_empty());
        let mut join_preds = preds[&3].clone();
        join_preds.sort_unstable();
        assert_eq!(join_preds, vec![1, 2]);
    }

    #[test]
    fn test_dead_blocks_excluded_from_traversal() {
        let mut cfg = diamond();
        cfg.blocks_mut()[2].dead = true;
        let rpo = cfg.reverse_postorder();
        assert!(!rpo.contains(&2));
        assert_eq!(cfg.live_block_count(), 3);
    }
}
