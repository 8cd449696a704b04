//! Structural pattern preconditions
//!
//! Each recognized rewrite pattern demands a shape of the original fragment
//! before equivalence is even attempted. Failing a precondition is never a
//! crash; it surfaces as a fault the policy maps onto `Unknown`.

use crate::features::eval::domain::AnalysisFault;
use crate::features::rewrite_check::domain::RewritePattern;
use crate::shared::models::{Statement, StmtKind};

/// Check the precondition of `pattern` against the original fragment
pub fn check_pattern_precondition(
    pattern: RewritePattern,
    original: &Statement,
) -> Result<(), AnalysisFault> {
    let Some(if_stmt) = leading_if(original) else {
        return Err(AnalysisFault::UnsupportedConstruct(
            "fragment does not start with a conditional".to_string(),
        ));
    };
    let StmtKind::If {
        then_branch,
        else_branch,
        ..
    } = &if_stmt.kind
    else {
        return Err(AnalysisFault::UnsupportedConstruct(
            "fragment does not start with a conditional".to_string(),
        ));
    };

    match pattern {
        RewritePattern::IfElseFlatten => {
            // Valid only when every reachable path through the then branch
            // ends in a terminator; the else branch moves out behind it.
            if else_branch.is_none() {
                return Err(AnalysisFault::UnsupportedConstruct(
                    "flattening needs an else branch to move out".to_string(),
                ));
            }
            if !then_branch.always_terminates() {
                return Err(AnalysisFault::NonTerminatingBranch);
            }
            Ok(())
        }

        RewritePattern::EarlyReturnNormalize => {
            // The guard that ends up in front of the fall-through code must
            // terminate on every path, whichever branch it started as.
            let Some(else_branch) = else_branch else {
                return Err(AnalysisFault::UnsupportedConstruct(
                    "normalization needs both branches".to_string(),
                ));
            };
            if !then_branch.always_terminates() && !else_branch.always_terminates() {
                return Err(AnalysisFault::NonTerminatingBranch);
            }
            Ok(())
        }

        RewritePattern::ElseIfChainFlatten => check_chain(if_stmt),
    }
}

/// Every arm of the chain, including the final else, must terminate
fn check_chain(if_stmt: &Statement) -> Result<(), AnalysisFault> {
    let StmtKind::If {
        then_branch,
        else_branch,
        ..
    } = &if_stmt.kind
    else {
        return Err(AnalysisFault::UnsupportedConstruct(
            "else-if chain arm is not a conditional".to_string(),
        ));
    };

    if !then_branch.always_terminates() {
        return Err(AnalysisFault::NonTerminatingBranch);
    }
    match else_branch {
        None => Err(AnalysisFault::NonTerminatingBranch),
        Some(else_branch) => match &else_branch.kind {
            StmtKind::If { .. } => check_chain(else_branch),
            _ => {
                if else_branch.always_terminates() {
                    Ok(())
                } else {
                    Err(AnalysisFault::NonTerminatingBranch)
                }
            }
        },
    }
}

/// The conditional the pattern applies to: the fragment itself or the first
/// statement of its top-level sequence
fn leading_if(stmt: &Statement) -> Option<&Statement> {
    match &stmt.kind {
        StmtKind::If { .. } => Some(stmt),
        StmtKind::Block(stmts) => stmts.first().and_then(|first| match &first.kind {
            StmtKind::If { .. } => Some(first),
            _ => None,
        }),
        _ => None,
    }
}
