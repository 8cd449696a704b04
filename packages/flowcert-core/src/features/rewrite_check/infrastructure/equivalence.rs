//! Case-split equivalence checking
//!
//! Two fragments are equivalent iff they produce equal termination results
//! for every environment. The modeled grammar has no unbounded loops and
//! finite branch depth, so the checker enumerates all truth assignments over
//! the distinct condition expressions of both sides (compared by syntactic
//! identity, negations peeled) and evaluates both fragments symbolically
//! under each assignment. Opaque-call traces must match per assignment,
//! order and multiplicity included.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::config::{AnalyzerConfig, CallPolicy, ControlFlowMode};
use crate::features::eval::domain::AnalysisFault;
use crate::features::eval::infrastructure::Evaluator;
use crate::shared::models::{Expr, Statement, StmtKind, UnaryOp};

/// Outcome of one equivalence check
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    Equivalent,
    /// Evaluation of either side hit a fault
    Fault(AnalysisFault),
    /// Both sides evaluated cleanly but disagree under some assignment
    Mismatch { assignment: String, detail: String },
}

pub struct EquivalenceChecker {
    mode: ControlFlowMode,
    policy: CallPolicy,
    max_conditions: usize,
}

impl EquivalenceChecker {
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            mode: config.control_flow_mode,
            policy: config.call_policy,
            max_conditions: config.max_conditions,
        }
    }

    /// Decide equivalence of `original` and `rewritten` under `in_loop`
    pub fn check(
        &self,
        original: &Statement,
        rewritten: &Statement,
        in_loop: bool,
    ) -> CheckOutcome {
        let mut keys = Vec::new();
        collect_condition_keys(original, &mut keys);
        collect_condition_keys(rewritten, &mut keys);

        if keys.len() > self.max_conditions {
            return CheckOutcome::Fault(AnalysisFault::UnsupportedConstruct(format!(
                "{} distinct conditions exceed the case-split bound of {}",
                keys.len(),
                self.max_conditions
            )));
        }

        for mask in 0u64..(1u64 << keys.len()) {
            let assignment: FxHashMap<String, bool> = keys
                .iter()
                .enumerate()
                .map(|(i, key)| (key.clone(), mask & (1 << i) != 0))
                .collect();

            let evaluator = Evaluator::new(self.mode, self.policy, &assignment, in_loop);
            let left = evaluator.run(original);
            let right = evaluator.run(rewritten);

            if let Some(fault) = left.result.fault().or_else(|| right.result.fault()) {
                return CheckOutcome::Fault(fault.clone());
            }

            let description = describe_assignment(&keys, mask);
            if left.calls != right.calls {
                return CheckOutcome::Fault(AnalysisFault::CallOrderViolation(format!(
                    "under {description}: original calls {:?}, rewritten calls {:?}",
                    left.calls, right.calls
                )));
            }
            if left.result != right.result {
                trace!(
                    assignment = %description,
                    left = left.result.kind_name(),
                    right = right.result.kind_name(),
                    "fragments disagree"
                );
                return CheckOutcome::Mismatch {
                    assignment: description,
                    detail: format!(
                        "original yields {}, rewritten yields {}",
                        left.result.kind_name(),
                        right.result.kind_name()
                    ),
                };
            }
        }

        CheckOutcome::Equivalent
    }
}

/// Canonical condition keys of every conditional in the fragment, negations
/// peeled and constants skipped; insertion order, deduplicated
pub fn collect_condition_keys(stmt: &Statement, out: &mut Vec<String>) {
    stmt.walk(&mut |s| {
        let cond = match &s.kind {
            StmtKind::If { cond, .. } => cond,
            StmtKind::While { cond, .. } => cond,
            _ => return,
        };
        let stripped = strip_negations(cond);
        if matches!(stripped, Expr::BoolLit(_)) {
            return;
        }
        let key = stripped.canonical();
        if !out.contains(&key) {
            out.push(key);
        }
    });
}

fn strip_negations(expr: &Expr) -> &Expr {
    let mut current = expr;
    while let Expr::Unary {
        op: UnaryOp::Not,
        operand,
    } = current
    {
        current = operand;
    }
    current
}

/// Variables read by any case-split condition; assignments to these defeat
/// the opaque-boolean assumption
pub fn collect_condition_vars(stmt: &Statement, out: &mut Vec<String>) {
    stmt.walk(&mut |s| {
        let cond = match &s.kind {
            StmtKind::If { cond, .. } => cond,
            StmtKind::While { cond, .. } => cond,
            _ => return,
        };
        let mut vars = Vec::new();
        cond.collect_vars(&mut vars);
        for v in vars {
            if !out.contains(&v) {
                out.push(v);
            }
        }
    });
}

/// Assignment targets outside conditional initializers
pub fn collect_non_init_assign_targets(stmt: &Statement, out: &mut Vec<String>) {
    match &stmt.kind {
        StmtKind::Assign { target, .. } => {
            if !out.contains(target) {
                out.push(target.clone());
            }
        }
        StmtKind::Block(stmts) => {
            for s in stmts {
                collect_non_init_assign_targets(s, out);
            }
        }
        StmtKind::If {
            then_branch,
            else_branch,
            ..
        } => {
            // The initializer binds before its condition on both sides by
            // construction; it is exempt.
            collect_non_init_assign_targets(then_branch, out);
            if let Some(else_branch) = else_branch {
                collect_non_init_assign_targets(else_branch, out);
            }
        }
        StmtKind::While { body, .. } => collect_non_init_assign_targets(body, out),
        _ => {}
    }
}

fn describe_assignment(keys: &[String], mask: u64) -> String {
    if keys.is_empty() {
        return "the empty assignment".to_string();
    }
    let parts: Vec<String> = keys
        .iter()
        .enumerate()
        .map(|(i, key)| format!("{key}={}", mask & (1 << i) != 0))
        .collect();
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::BinaryOp;

    fn checker() -> EquivalenceChecker {
        EquivalenceChecker::from_config(&AnalyzerConfig::default())
    }

    fn flatten_pair() -> (Statement, Statement) {
        let original = Statement::if_stmt(
            Expr::var("cond"),
            Statement::ret(Some(Expr::IntLit(1))),
            Some(Statement::assign("x", Expr::IntLit(2))),
        );
        let rewritten = Statement::block(vec![
            Statement::if_stmt(
                Expr::var("cond"),
                Statement::ret(Some(Expr::IntLit(1))),
                None,
            ),
            Statement::assign("x", Expr::IntLit(2)),
        ]);
        (original, rewritten)
    }

    #[test]
    fn test_guarded_return_flattening_is_equivalent() {
        let (original, rewritten) = flatten_pair();
        assert_eq!(
            checker().check(&original, &rewritten, false),
            CheckOutcome::Equivalent
        );
    }

    #[test]
    fn test_dropped_assignment_is_a_mismatch() {
        let (original, _) = flatten_pair();
        let rewritten = Statement::block(vec![Statement::if_stmt(
            Expr::var("cond"),
            Statement::ret(Some(Expr::IntLit(1))),
            None,
        )]);
        assert!(matches!(
            checker().check(&original, &rewritten, false),
            CheckOutcome::Mismatch { .. }
        ));
    }

    #[test]
    fn test_changed_return_value_is_a_mismatch() {
        let original = Statement::ret(Some(Expr::IntLit(1)));
        let rewritten = Statement::ret(Some(Expr::IntLit(2)));
        assert!(matches!(
            checker().check(&original, &rewritten, false),
            CheckOutcome::Mismatch { .. }
        ));
    }

    #[test]
    fn test_duplicated_call_is_a_call_order_fault() {
        let original = Statement::block(vec![Statement::call(Expr::call("f", vec![]))]);
        let rewritten = Statement::block(vec![
            Statement::call(Expr::call("f", vec![])),
            Statement::call(Expr::call("f", vec![])),
        ]);
        assert!(matches!(
            checker().check(&original, &rewritten, false),
            CheckOutcome::Fault(AnalysisFault::CallOrderViolation(_))
        ));
    }

    #[test]
    fn test_reordered_calls_are_a_call_order_fault() {
        let original = Statement::block(vec![
            Statement::call(Expr::call("f", vec![])),
            Statement::call(Expr::call("g", vec![])),
        ]);
        let rewritten = Statement::block(vec![
            Statement::call(Expr::call("g", vec![])),
            Statement::call(Expr::call("f", vec![])),
        ]);
        assert!(matches!(
            checker().check(&original, &rewritten, false),
            CheckOutcome::Fault(AnalysisFault::CallOrderViolation(_))
        ));
    }

    #[test]
    fn test_negated_guard_shares_the_condition_key() {
        // if cond { x = 1 } else { return }  ≡  if !cond { return }; x = 1
        let original = Statement::if_stmt(
            Expr::var("cond"),
            Statement::assign("x", Expr::IntLit(1)),
            Some(Statement::ret(None)),
        );
        let rewritten = Statement::block(vec![
            Statement::if_stmt(Expr::not(Expr::var("cond")), Statement::ret(None), None),
            Statement::assign("x", Expr::IntLit(1)),
        ]);

        let mut keys = Vec::new();
        collect_condition_keys(&original, &mut keys);
        collect_condition_keys(&rewritten, &mut keys);
        assert_eq!(keys, vec!["cond".to_string()]);

        assert_eq!(
            checker().check(&original, &rewritten, false),
            CheckOutcome::Equivalent
        );
    }

    #[test]
    fn test_break_outside_loop_faults() {
        let original = Statement::synthetic(StmtKind::Break);
        let rewritten = Statement::synthetic(StmtKind::Break);
        assert_eq!(
            checker().check(&original, &rewritten, false),
            CheckOutcome::Fault(AnalysisFault::MalformedControlTransfer)
        );
    }

    #[test]
    fn test_break_inside_loop_is_comparable() {
        let original = Statement::if_stmt(
            Expr::var("done"),
            Statement::synthetic(StmtKind::Break),
            None,
        );
        let rewritten = original.clone();
        assert_eq!(
            checker().check(&original, &rewritten, true),
            CheckOutcome::Equivalent
        );
    }

    #[test]
    fn test_condition_bound_is_enforced() {
        let mut config = AnalyzerConfig::default();
        config.max_conditions = 2;
        let checker = EquivalenceChecker::from_config(&config);

        let fragment = Statement::block(
            (0..3)
                .map(|i| {
                    Statement::if_stmt(
                        Expr::var(format!("c{i}")),
                        Statement::assign("x", Expr::IntLit(i)),
                        None,
                    )
                })
                .collect(),
        );
        assert!(matches!(
            checker.check(&fragment, &fragment.clone(), false),
            CheckOutcome::Fault(AnalysisFault::UnsupportedConstruct(_))
        ));
    }

    #[test]
    fn test_chain_flattening_is_equivalent() {
        let original = Statement::if_stmt(
            Expr::var("c1"),
            Statement::ret(Some(Expr::IntLit(1))),
            Some(Statement::if_stmt(
                Expr::var("c2"),
                Statement::ret(Some(Expr::IntLit(2))),
                Some(Statement::ret(Some(Expr::IntLit(3)))),
            )),
        );
        let rewritten = Statement::block(vec![
            Statement::if_stmt(
                Expr::var("c1"),
                Statement::ret(Some(Expr::IntLit(1))),
                None,
            ),
            Statement::if_stmt(
                Expr::var("c2"),
                Statement::ret(Some(Expr::IntLit(2))),
                None,
            ),
            Statement::ret(Some(Expr::IntLit(3))),
        ]);
        assert_eq!(
            checker().check(&original, &rewritten, false),
            CheckOutcome::Equivalent
        );
    }

    #[test]
    fn test_initializer_value_flows_through_both_sides() {
        let init = Statement::assign("v", Expr::call("compute", vec![]));
        let cond = Expr::binary(BinaryOp::Gt, Expr::var("v"), Expr::IntLit(0));
        let original = Statement::if_with_init(
            init.clone(),
            cond.clone(),
            Statement::ret(Some(Expr::var("v"))),
            Some(Statement::ret(Some(Expr::IntLit(0)))),
        );
        let rewritten = Statement::block(vec![
            Statement::if_with_init(
                init,
                cond,
                Statement::ret(Some(Expr::var("v"))),
                None,
            ),
            Statement::ret(Some(Expr::IntLit(0))),
        ]);
        assert_eq!(
            checker().check(&original, &rewritten, false),
            CheckOutcome::Equivalent
        );
    }
}
