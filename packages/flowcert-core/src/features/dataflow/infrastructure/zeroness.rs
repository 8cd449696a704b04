//! Zero-ness transfer function
//!
//! The concrete instantiation of the solver shipped with the crate: tracks
//! whether each variable is zero, non-zero, or either. Opaque calls leave
//! the tracked environment untouched; their effects live outside it.

use crate::features::cfg::domain::BasicBlock;
use crate::features::dataflow::domain::{AbstractState, ValueKind};
use crate::shared::models::{BinaryOp, Expr, Statement, StmtKind, UnaryOp};

/// Abstract zero-ness of an expression under `state`
pub fn eval_expr_kind(expr: &Expr, state: &AbstractState) -> ValueKind {
    if state.is_unreachable() {
        return ValueKind::Bottom;
    }
    match expr {
        Expr::IntLit(0) => ValueKind::Zero,
        Expr::IntLit(_) => ValueKind::NonZero,
        Expr::BoolLit(true) => ValueKind::NonZero,
        Expr::BoolLit(false) => ValueKind::Zero,
        Expr::Var(name) => state.get(name),
        Expr::Call { .. } => ValueKind::Top,
        Expr::Unary { op, operand } => {
            let inner = eval_expr_kind(operand, state);
            match op {
                // Negation preserves zero-ness
                UnaryOp::Neg => inner,
                UnaryOp::Not => match inner {
                    ValueKind::Bottom => ValueKind::Bottom,
                    ValueKind::Zero => ValueKind::NonZero,
                    ValueKind::NonZero => ValueKind::Zero,
                    // !x is always 0 or 1
                    ValueKind::MaybeZero | ValueKind::Top => ValueKind::MaybeZero,
                },
            }
        }
        Expr::Binary { op, lhs, rhs } => {
            let l = eval_expr_kind(lhs, state);
            let r = eval_expr_kind(rhs, state);
            if l == ValueKind::Bottom || r == ValueKind::Bottom {
                return ValueKind::Bottom;
            }
            match op {
                BinaryOp::Add | BinaryOp::Sub => {
                    if l == ValueKind::Top || r == ValueKind::Top {
                        ValueKind::Top
                    } else if l == ValueKind::Zero {
                        r
                    } else if r == ValueKind::Zero {
                        l
                    } else {
                        ValueKind::MaybeZero
                    }
                }
                BinaryOp::Mul => {
                    if l == ValueKind::Zero || r == ValueKind::Zero {
                        ValueKind::Zero
                    } else if l == ValueKind::NonZero && r == ValueKind::NonZero {
                        ValueKind::NonZero
                    } else if l == ValueKind::Top || r == ValueKind::Top {
                        ValueKind::Top
                    } else {
                        ValueKind::MaybeZero
                    }
                }
                BinaryOp::Div => {
                    if l == ValueKind::Zero {
                        ValueKind::Zero
                    } else {
                        ValueKind::MaybeZero
                    }
                }
                // Comparison and logic results are 0 or 1
                BinaryOp::Eq
                | BinaryOp::Ne
                | BinaryOp::Lt
                | BinaryOp::Le
                | BinaryOp::Gt
                | BinaryOp::Ge
                | BinaryOp::And
                | BinaryOp::Or => ValueKind::MaybeZero,
            }
        }
    }
}

/// Apply one statement to the state
pub fn apply_statement(state: &mut AbstractState, stmt: &Statement) {
    if state.is_unreachable() {
        return;
    }
    match &stmt.kind {
        StmtKind::Assign { target, value } => {
            let kind = eval_expr_kind(value, state);
            state.set(target, kind);
        }
        // Opaque effects stay outside the tracked environment
        StmtKind::Call(_) | StmtKind::Unsupported { .. } => {}
        StmtKind::Return(_) | StmtKind::Break | StmtKind::Continue => {}
        // Structured statements never appear inside a basic block; branches
        // are separate blocks.
        StmtKind::Block(_) | StmtKind::If { .. } | StmtKind::While { .. } => {}
    }
}

/// Block transfer function for the zero-ness lattice
pub fn zeroness_transfer(block: &BasicBlock, input: &AbstractState) -> AbstractState {
    let mut state = input.clone();
    for stmt in &block.statements {
        apply_statement(&mut state, stmt);
    }
    state
}
