//! Termination-aware denotational evaluator
//!
//! A small interpreter over the restricted statement grammar. Unknown
//! variables read as symbolic initial values; opaque calls produce
//! occurrence-indexed symbolic results and append their canonical term to an
//! ordered call trace. Conditions resolve against a truth assignment keyed
//! by canonical condition text, so the checker can case-split over every
//! combination.

use rustc_hash::FxHashMap;

use crate::config::{CallPolicy, ControlFlowMode};
use crate::features::eval::domain::{AnalysisFault, Environment, TerminationResult, Value};
use crate::shared::models::{BinaryOp, Expr, Statement, StmtKind, UnaryOp};

/// Result of one fragment evaluation: the termination result plus the
/// ordered opaque-call trace observed on the way
#[derive(Debug, Clone, PartialEq)]
pub struct EvalOutcome {
    pub result: TerminationResult,
    pub calls: Vec<String>,
}

/// Evaluator for one truth assignment
pub struct Evaluator<'a> {
    mode: ControlFlowMode,
    policy: CallPolicy,
    assignment: &'a FxHashMap<String, bool>,
    in_loop: bool,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        mode: ControlFlowMode,
        policy: CallPolicy,
        assignment: &'a FxHashMap<String, bool>,
        in_loop: bool,
    ) -> Self {
        Self {
            mode,
            policy,
            assignment,
            in_loop,
        }
    }

    /// Evaluate a fragment from the empty symbolic environment
    pub fn run(&self, stmt: &Statement) -> EvalOutcome {
        let mut calls = Vec::new();
        let result = self.eval_stmt(stmt, Environment::default(), &mut calls);
        EvalOutcome { result, calls }
    }

    fn eval_stmt(
        &self,
        stmt: &Statement,
        mut env: Environment,
        calls: &mut Vec<String>,
    ) -> TerminationResult {
        match &stmt.kind {
            StmtKind::Assign { target, value } => {
                match self.eval_expr(value, &env, calls) {
                    Ok(v) => {
                        env.insert(target.clone(), v);
                        TerminationResult::Continue(env)
                    }
                    Err(fault) => TerminationResult::Undefined(fault),
                }
            }

            StmtKind::Block(stmts) => {
                for s in stmts {
                    match self.eval_stmt(s, env, calls) {
                        TerminationResult::Continue(next) => env = next,
                        other => return other,
                    }
                }
                TerminationResult::Continue(env)
            }

            StmtKind::If {
                init,
                cond,
                then_branch,
                else_branch,
            } => self.eval_if(init.as_deref(), cond, then_branch, else_branch.as_deref(), env, calls),

            StmtKind::While { .. } => TerminationResult::Undefined(
                AnalysisFault::UnsupportedConstruct("loop inside fragment".to_string()),
            ),

            StmtKind::Return(value) => {
                if self.mode == ControlFlowMode::NoTermination {
                    return TerminationResult::Undefined(AnalysisFault::UnsupportedConstruct(
                        "early return without termination modeling".to_string(),
                    ));
                }
                match value {
                    None => TerminationResult::Return(None),
                    Some(expr) => match self.eval_expr(expr, &env, calls) {
                        Ok(v) => TerminationResult::Return(Some(v)),
                        Err(fault) => TerminationResult::Undefined(fault),
                    },
                }
            }

            StmtKind::Break => self.eval_loop_exit(TerminationResult::Break),
            StmtKind::Continue => self.eval_loop_exit(TerminationResult::ContinueLoop),

            StmtKind::Call(expr) => match self.eval_expr(expr, &env, calls) {
                // The call's effect lives outside the environment.
                Ok(_) => TerminationResult::Continue(env),
                Err(fault) => TerminationResult::Undefined(fault),
            },

            StmtKind::Unsupported { description } => TerminationResult::Undefined(
                AnalysisFault::UnsupportedConstruct(description.clone()),
            ),
        }
    }

    fn eval_loop_exit(&self, result: TerminationResult) -> TerminationResult {
        if self.mode == ControlFlowMode::NoTermination {
            return TerminationResult::Undefined(AnalysisFault::UnsupportedConstruct(
                "loop exit without termination modeling".to_string(),
            ));
        }
        if !self.in_loop {
            return TerminationResult::Undefined(AnalysisFault::MalformedControlTransfer);
        }
        result
    }

    fn eval_if(
        &self,
        init: Option<&Statement>,
        cond: &Expr,
        then_branch: &Statement,
        else_branch: Option<&Statement>,
        mut env: Environment,
        calls: &mut Vec<String>,
    ) -> TerminationResult {
        // Initializer bindings scope to the condition and branches only;
        // the outer binding (if any) is restored on normal fall-through.
        let mut scoped: Option<(String, Option<Value>)> = None;
        if let Some(init) = init {
            let StmtKind::Assign { target, value } = &init.kind else {
                return TerminationResult::Undefined(AnalysisFault::UnsupportedConstruct(
                    "non-assignment conditional initializer".to_string(),
                ));
            };
            let v = match self.eval_expr(value, &env, calls) {
                Ok(v) => v,
                Err(fault) => return TerminationResult::Undefined(fault),
            };
            scoped = Some((target.clone(), env.get(target).cloned()));
            env.insert(target.clone(), v);
        }

        let taken = match self.eval_cond(cond, &env, calls) {
            Ok(b) => b,
            Err(fault) => return TerminationResult::Undefined(fault),
        };

        let branch_result = if taken {
            self.eval_stmt(then_branch, env, calls)
        } else {
            match else_branch {
                Some(else_branch) => self.eval_stmt(else_branch, env, calls),
                None => TerminationResult::Continue(env),
            }
        };

        match (branch_result, scoped) {
            (TerminationResult::Continue(mut out), Some((name, outer))) => {
                match outer {
                    Some(v) => {
                        out.insert(name, v);
                    }
                    None => {
                        out.remove(&name);
                    }
                }
                TerminationResult::Continue(out)
            }
            (other, _) => other,
        }
    }

    /// Resolve a condition to a boolean. Negations peel off, then the truth
    /// assignment wins over concrete folding so both compared fragments see
    /// the same opaque boolean.
    fn eval_cond(
        &self,
        cond: &Expr,
        env: &Environment,
        calls: &mut Vec<String>,
    ) -> Result<bool, AnalysisFault> {
        if let Expr::Unary {
            op: UnaryOp::Not,
            operand,
        } = cond
        {
            return Ok(!self.eval_cond(operand, env, calls)?);
        }

        let value = self.eval_expr(cond, env, calls)?;
        if let Some(&b) = self.assignment.get(&cond.canonical()) {
            return Ok(b);
        }
        match value {
            Value::Bool(b) => Ok(b),
            Value::Int(v) => Ok(v != 0),
            Value::Opaque(term) => Err(AnalysisFault::UnsupportedConstruct(format!(
                "unresolved condition `{term}`"
            ))),
        }
    }

    fn eval_expr(
        &self,
        expr: &Expr,
        env: &Environment,
        calls: &mut Vec<String>,
    ) -> Result<Value, AnalysisFault> {
        match expr {
            Expr::IntLit(v) => Ok(Value::Int(*v)),
            Expr::BoolLit(v) => Ok(Value::Bool(*v)),

            // An unbound variable reads as its symbolic initial value.
            Expr::Var(name) => Ok(env
                .get(name)
                .cloned()
                .unwrap_or_else(|| Value::Opaque(name.clone()))),

            Expr::Unary { op, operand } => {
                let v = self.eval_expr(operand, env, calls)?;
                Ok(match (op, v) {
                    (UnaryOp::Neg, Value::Int(i)) => Value::Int(i.wrapping_neg()),
                    (UnaryOp::Not, Value::Bool(b)) => Value::Bool(!b),
                    (UnaryOp::Not, Value::Int(i)) => Value::Bool(i == 0),
                    (op, v) => Value::Opaque(format!("({}{})", op.symbol(), v.term())),
                })
            }

            Expr::Binary { op, lhs, rhs } => {
                let l = self.eval_expr(lhs, env, calls)?;
                let r = self.eval_expr(rhs, env, calls)?;
                Ok(Self::fold_binary(*op, l, r))
            }

            Expr::Call { callee, args } => {
                if self.policy == CallPolicy::DisallowCalls {
                    return Err(AnalysisFault::UnsupportedConstruct(format!(
                        "call to `{callee}` under DisallowCalls policy"
                    )));
                }
                let mut arg_terms = Vec::with_capacity(args.len());
                for arg in args {
                    arg_terms.push(self.eval_expr(arg, env, calls)?.term());
                }
                let term = format!("{callee}({})", arg_terms.join(", "));
                // Occurrence index keeps two dynamic calls of the same
                // callee distinct as values while the trace compares order
                // and multiplicity.
                let occurrence = calls.len();
                calls.push(term.clone());
                Ok(Value::Opaque(format!("{term}#{occurrence}")))
            }
        }
    }

    fn fold_binary(op: BinaryOp, l: Value, r: Value) -> Value {
        use Value::*;
        match (op, &l, &r) {
            (BinaryOp::Add, Int(a), Int(b)) => Int(a.wrapping_add(*b)),
            (BinaryOp::Sub, Int(a), Int(b)) => Int(a.wrapping_sub(*b)),
            (BinaryOp::Mul, Int(a), Int(b)) => Int(a.wrapping_mul(*b)),
            (BinaryOp::Div, Int(a), Int(b)) => match a.checked_div(*b) {
                Some(v) => Int(v),
                // Division by zero stays symbolic; its behavior belongs to
                // the source language.
                None => Opaque(format!("({} / {})", a, b)),
            },
            (BinaryOp::Eq, Int(a), Int(b)) => Bool(a == b),
            (BinaryOp::Ne, Int(a), Int(b)) => Bool(a != b),
            (BinaryOp::Lt, Int(a), Int(b)) => Bool(a < b),
            (BinaryOp::Le, Int(a), Int(b)) => Bool(a <= b),
            (BinaryOp::Gt, Int(a), Int(b)) => Bool(a > b),
            (BinaryOp::Ge, Int(a), Int(b)) => Bool(a >= b),
            (BinaryOp::Eq, Bool(a), Bool(b)) => Bool(a == b),
            (BinaryOp::Ne, Bool(a), Bool(b)) => Bool(a != b),
            (BinaryOp::And, Bool(a), Bool(b)) => Bool(*a && *b),
            (BinaryOp::Or, Bool(a), Bool(b)) => Bool(*a || *b),
            _ => Opaque(format!("({} {} {})", l.term(), op.symbol(), r.term())),
        }
    }
}
