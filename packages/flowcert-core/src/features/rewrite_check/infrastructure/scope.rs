//! Initializer scope checks
//!
//! Identifiers introduced by an `If`'s initializer must not be referenced by
//! any statement outside that `If`'s own condition and branches. A name that
//! shadows an identifier already visible in the enclosing scope is treated
//! as a violation too: after flattening, references would silently rebind.

use rustc_hash::FxHashSet;

use crate::features::eval::domain::AnalysisFault;
use crate::shared::models::{Expr, Statement, StmtKind};

/// Check every initializer-bearing `If` in `fragment`
pub fn check_initializer_scopes(
    fragment: &Statement,
    visible: &FxHashSet<String>,
) -> Result<(), AnalysisFault> {
    let mut inits: Vec<(String, usize)> = Vec::new();
    collect_inits(fragment, &mut inits);

    for (name, inside_refs) in inits {
        if visible.contains(&name) {
            return Err(AnalysisFault::ScopeViolation(name));
        }
        let total_refs = count_refs_stmt(fragment, &name);
        if total_refs > inside_refs {
            return Err(AnalysisFault::ScopeViolation(name));
        }
    }
    Ok(())
}

/// Collect (initializer name, references inside the owning `If`) pairs
fn collect_inits(stmt: &Statement, out: &mut Vec<(String, usize)>) {
    match &stmt.kind {
        StmtKind::Block(stmts) => {
            for s in stmts {
                collect_inits(s, out);
            }
        }
        StmtKind::If {
            init,
            cond,
            then_branch,
            else_branch,
        } => {
            if let Some(init) = init {
                if let StmtKind::Assign { target, .. } = &init.kind {
                    let mut inside = count_refs_expr(cond, target);
                    inside += count_refs_stmt(then_branch, target);
                    if let Some(else_branch) = else_branch {
                        inside += count_refs_stmt(else_branch, target);
                    }
                    out.push((target.clone(), inside));
                }
            }
            collect_inits(then_branch, out);
            if let Some(else_branch) = else_branch {
                collect_inits(else_branch, out);
            }
        }
        StmtKind::While { body, .. } => collect_inits(body, out),
        _ => {}
    }
}

/// Count references to `name` in a subtree: reads in every expression
/// position plus assignment targets
fn count_refs_stmt(stmt: &Statement, name: &str) -> usize {
    let mut count = 0;
    match &stmt.kind {
        StmtKind::Assign { target, value } => {
            if target == name {
                count += 1;
            }
            count += count_refs_expr(value, name);
        }
        StmtKind::Block(stmts) => {
            for s in stmts {
                count += count_refs_stmt(s, name);
            }
        }
        StmtKind::If {
            init,
            cond,
            then_branch,
            else_branch,
        } => {
            if let Some(init) = init {
                // The initializer's own binding does not count; its
                // right-hand side still reads the outer name.
                if let StmtKind::Assign { value, .. } = &init.kind {
                    count += count_refs_expr(value, name);
                }
            }
            count += count_refs_expr(cond, name);
            count += count_refs_stmt(then_branch, name);
            if let Some(else_branch) = else_branch {
                count += count_refs_stmt(else_branch, name);
            }
        }
        StmtKind::While { cond, body } => {
            count += count_refs_expr(cond, name);
            count += count_refs_stmt(body, name);
        }
        StmtKind::Return(Some(value)) => count += count_refs_expr(value, name),
        StmtKind::Return(None) | StmtKind::Break | StmtKind::Continue => {}
        StmtKind::Call(expr) => count += count_refs_expr(expr, name),
        StmtKind::Unsupported { .. } => {}
    }
    count
}

fn count_refs_expr(expr: &Expr, name: &str) -> usize {
    match expr {
        Expr::IntLit(_) | Expr::BoolLit(_) => 0,
        Expr::Var(v) => usize::from(v == name),
        Expr::Unary { operand, .. } => count_refs_expr(operand, name),
        Expr::Binary { lhs, rhs, .. } => {
            count_refs_expr(lhs, name) + count_refs_expr(rhs, name)
        }
        Expr::Call { args, .. } => args.iter().map(|a| count_refs_expr(a, name)).sum(),
    }
}
