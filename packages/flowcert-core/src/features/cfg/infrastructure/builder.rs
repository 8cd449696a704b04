//! CFG construction
//!
//! Structured lowering of a function body into basic blocks. Leaders are the
//! function's first statement, every branch target, and every statement
//! following a branch; straight-line runs between leaders become blocks.
//! The builder performs no analysis and is pure given an immutable body.

use tracing::debug;

use crate::features::cfg::domain::{BasicBlock, BlockId, CfgEdge, ControlFlowGraph, EdgeKind};
use crate::shared::models::{FunctionBody, Statement, StmtKind};

/// A block with an outgoing edge still waiting for its target leader
#[derive(Debug, Clone, Copy)]
struct PendingEdge {
    from: BlockId,
    kind: EdgeKind,
}

/// Enclosing loop during lowering
struct LoopFrame {
    header: BlockId,
    /// Blocks ending in `break`, wired to the block after the loop
    breaks: Vec<BlockId>,
}

/// Builds a `ControlFlowGraph` from a function body
pub struct CfgBuilder {
    blocks: Vec<BasicBlock>,
    exits: Vec<BlockId>,
    loops: Vec<LoopFrame>,
}

impl CfgBuilder {
    pub fn build(func: &FunctionBody) -> ControlFlowGraph {
        let mut builder = CfgBuilder {
            blocks: Vec::new(),
            exits: Vec::new(),
            loops: Vec::new(),
        };

        let entry = builder.new_block();
        let open = builder.lower_slice(
            &func.statements,
            vec![PendingEdge {
                from: entry,
                kind: EdgeKind::Unconditional,
            }],
        );

        builder.seal_function_end(open);
        builder.mark_dead_blocks();

        let exits: Vec<BlockId> = {
            let blocks = &builder.blocks;
            let mut seen = Vec::new();
            for id in builder.exits {
                if !blocks[id].dead && !seen.contains(&id) {
                    seen.push(id);
                }
            }
            seen
        };

        debug!(
            function = %func.name,
            blocks = builder.blocks.len(),
            exits = exits.len(),
            "built control flow graph"
        );
        ControlFlowGraph::new(func.name.clone(), builder.blocks, exits)
    }

    fn new_block(&mut self) -> BlockId {
        let id = self.blocks.len();
        self.blocks.push(BasicBlock::new(id));
        id
    }

    fn add_edge(&mut self, from: BlockId, to: BlockId, kind: EdgeKind) {
        self.blocks[from].edges.push(CfgEdge { target: to, kind });
    }

    /// Wire all pending edges into a fresh block
    fn seal(&mut self, open: Vec<PendingEdge>) -> BlockId {
        let block = self.new_block();
        for pending in open {
            self.add_edge(pending.from, block, pending.kind);
        }
        block
    }

    /// Block to receive the next straight-line statement: reuse the single
    /// open block when it is still extendable, otherwise start a new leader.
    fn current_block(&mut self, open: Vec<PendingEdge>) -> BlockId {
        if open.len() == 1 && open[0].kind == EdgeKind::Unconditional {
            let b = open[0].from;
            if self.blocks[b].branch_cond.is_none() && self.blocks[b].edges.is_empty() {
                return b;
            }
        }
        self.seal(open)
    }

    fn lower_slice(&mut self, stmts: &[Statement], mut open: Vec<PendingEdge>) -> Vec<PendingEdge> {
        for stmt in stmts {
            open = self.lower_stmt(stmt, open);
        }
        open
    }

    fn lower_stmt(&mut self, stmt: &Statement, open: Vec<PendingEdge>) -> Vec<PendingEdge> {
        match &stmt.kind {
            StmtKind::Assign { .. } | StmtKind::Call(_) | StmtKind::Unsupported { .. } => {
                let block = self.current_block(open);
                self.blocks[block].statements.push(stmt.clone());
                vec![PendingEdge {
                    from: block,
                    kind: EdgeKind::Unconditional,
                }]
            }

            StmtKind::Block(stmts) => self.lower_slice(stmts, open),

            StmtKind::Return(_) => {
                let block = self.current_block(open);
                self.blocks[block].statements.push(stmt.clone());
                self.exits.push(block);
                Vec::new()
            }

            StmtKind::Break => {
                let block = self.current_block(open);
                self.blocks[block].statements.push(stmt.clone());
                if let Some(frame) = self.loops.last_mut() {
                    frame.breaks.push(block);
                }
                Vec::new()
            }

            StmtKind::Continue => {
                let block = self.current_block(open);
                self.blocks[block].statements.push(stmt.clone());
                if let Some(frame) = self.loops.last() {
                    let header = frame.header;
                    self.add_edge(block, header, EdgeKind::LoopBack);
                }
                Vec::new()
            }

            StmtKind::If {
                init,
                cond,
                then_branch,
                else_branch,
            } => {
                let header = self.current_block(open);
                if let Some(init) = init {
                    self.blocks[header].statements.push((**init).clone());
                }
                self.blocks[header].branch_cond = Some(cond.clone());

                let mut merged = self.lower_stmt(
                    then_branch,
                    vec![PendingEdge {
                        from: header,
                        kind: EdgeKind::TrueBranch,
                    }],
                );

                match else_branch {
                    Some(else_branch) => {
                        let else_open = self.lower_stmt(
                            else_branch,
                            vec![PendingEdge {
                                from: header,
                                kind: EdgeKind::FalseBranch,
                            }],
                        );
                        merged.extend(else_open);
                    }
                    None => merged.push(PendingEdge {
                        from: header,
                        kind: EdgeKind::FalseBranch,
                    }),
                }
                merged
            }

            StmtKind::While { cond, body } => {
                // The header is a branch target, so it always starts a new
                // leader even after a straight-line run.
                let header = self.seal(open);
                self.blocks[header].branch_cond = Some(cond.clone());

                self.loops.push(LoopFrame {
                    header,
                    breaks: Vec::new(),
                });
                let body_open = self.lower_stmt(
                    body,
                    vec![PendingEdge {
                        from: header,
                        kind: EdgeKind::TrueBranch,
                    }],
                );
                let frame = self.loops.pop().unwrap_or(LoopFrame {
                    header,
                    breaks: Vec::new(),
                });

                for pending in body_open {
                    let kind = match pending.kind {
                        EdgeKind::Unconditional => EdgeKind::LoopBack,
                        other => other,
                    };
                    self.add_edge(pending.from, header, kind);
                }

                let mut open = vec![PendingEdge {
                    from: header,
                    kind: EdgeKind::FalseBranch,
                }];
                for b in frame.breaks {
                    open.push(PendingEdge {
                        from: b,
                        kind: EdgeKind::Unconditional,
                    });
                }
                open
            }
        }
    }

    /// Resolve the implicit exit at the end of the function
    fn seal_function_end(&mut self, open: Vec<PendingEdge>) {
        if open.is_empty() {
            return;
        }
        if open.len() == 1 && open[0].kind == EdgeKind::Unconditional {
            self.exits.push(open[0].from);
        } else {
            let end = self.seal(open);
            self.exits.push(end);
        }
    }

    /// Flag blocks unreachable from entry. Iterative traversal, explicit
    /// stack.
    fn mark_dead_blocks(&mut self) {
        let mut reachable = vec![false; self.blocks.len()];
        let mut stack = vec![0];
        reachable[0] = true;
        while let Some(b) = stack.pop() {
            for i in 0..self.blocks[b].edges.len() {
                let t = self.blocks[b].edges[i].target;
                if !reachable[t] {
                    reachable[t] = true;
                    stack.push(t);
                }
            }
        }
        for (id, block) in self.blocks.iter_mut().enumerate() {
            if !reachable[id] {
                block.dead = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{BinaryOp, Expr};

    fn build(stmts: Vec<Statement>) -> ControlFlowGraph {
        CfgBuilder::build(&FunctionBody::new("f", stmts))
    }

    #[test]
    fn test_empty_body_single_block() {
        let cfg = build(vec![]);
        assert_eq!(cfg.block_count(), 1);
        assert_eq!(cfg.exits, vec![cfg.entry()]);
    }

    #[test]
    fn test_straight_line_single_block() {
        let cfg = build(vec![
            Statement::assign("x", Expr::IntLit(1)),
            Statement::assign("y", Expr::IntLit(2)),
            Statement::ret(Some(Expr::var("y"))),
        ]);
        assert_eq!(cfg.block_count(), 1);
        assert_eq!(cfg.block(0).statements.len(), 3);
        assert_eq!(cfg.exits, vec![0]);
    }

    #[test]
    fn test_if_else_with_returns_has_three_blocks_two_exits() {
        let cfg = build(vec![Statement::if_stmt(
            Expr::var("cond"),
            Statement::ret(Some(Expr::IntLit(1))),
            Some(Statement::ret(Some(Expr::IntLit(2)))),
        )]);

        assert_eq!(cfg.block_count(), 3);
        assert_eq!(cfg.entry(), 0);
        assert_eq!(cfg.exits.len(), 2);

        let header = cfg.block(0);
        assert!(header.branch_cond.is_some());
        let kinds: Vec<EdgeKind> = header.edges.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&EdgeKind::TrueBranch));
        assert!(kinds.contains(&EdgeKind::FalseBranch));
    }

    #[test]
    fn test_if_without_else_joins() {
        let cfg = build(vec![
            Statement::if_stmt(
                Expr::var("cond"),
                Statement::assign("x", Expr::IntLit(1)),
                None,
            ),
            Statement::assign("y", Expr::IntLit(2)),
        ]);

        // header, then-block, join
        assert_eq!(cfg.block_count(), 3);
        let header = cfg.block(0);
        assert_eq!(header.edges.len(), 2);
        // both paths reach the join block
        let preds = cfg.predecessors();
        let join = cfg.exits[0];
        assert_eq!(preds[&join].len(), 2);
    }

    #[test]
    fn test_code_after_return_is_dead() {
        let cfg = build(vec![
            Statement::ret(None),
            Statement::assign("x", Expr::IntLit(1)),
        ]);

        assert_eq!(cfg.block_count(), 2);
        assert!(cfg.block(1).dead);
        assert_eq!(cfg.exits, vec![0]);
        assert_eq!(cfg.live_block_count(), 1);
    }

    #[test]
    fn test_while_loop_back_edge() {
        let body = Statement::block(vec![Statement::assign(
            "i",
            Expr::binary(BinaryOp::Add, Expr::var("i"), Expr::IntLit(1)),
        )]);
        let cfg = build(vec![
            Statement::assign("i", Expr::IntLit(0)),
            Statement::synthetic(StmtKind::While {
                cond: Expr::binary(BinaryOp::Lt, Expr::var("i"), Expr::var("n")),
                body: Box::new(body),
            }),
            Statement::ret(Some(Expr::var("i"))),
        ]);

        assert_eq!(cfg.block_count(), 4);
        let back_edges: Vec<_> = cfg
            .blocks()
            .flat_map(|b| b.edges.iter())
            .filter(|e| e.kind == EdgeKind::LoopBack)
            .collect();
        assert_eq!(back_edges.len(), 1);
        assert_eq!(back_edges[0].target, 1);
    }

    #[test]
    fn test_break_edges_to_after_loop() {
        let body = Statement::block(vec![Statement::if_stmt(
            Expr::var("done"),
            Statement::synthetic(StmtKind::Break),
            None,
        )]);
        let cfg = build(vec![
            Statement::synthetic(StmtKind::While {
                cond: Expr::BoolLit(true),
                body: Box::new(body),
            }),
            Statement::ret(None),
        ]);

        // The break block must reach the block holding the return.
        let ret_block = cfg.exits[0];
        let preds = cfg.predecessors();
        assert!(preds[&ret_block].len() >= 2);
    }

    #[test]
    fn test_unsupported_statement_does_not_fail_build() {
        let cfg = build(vec![
            Statement::synthetic(StmtKind::Unsupported {
                description: "switch".to_string(),
            }),
            Statement::ret(None),
        ]);
        assert_eq!(cfg.block_count(), 1);
        assert_eq!(cfg.block(0).statements.len(), 2);
    }
}
