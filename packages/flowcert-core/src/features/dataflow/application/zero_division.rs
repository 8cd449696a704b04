//! Zero-division lint rule
//!
//! Solves the zero-ness lattice over a function's CFG, then replays each
//! block statement by statement so every division sees the state that holds
//! at its own program point. Findings go through the suppression oracle
//! before they are reported.

use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::features::cfg::domain::ControlFlowGraph;
use crate::features::dataflow::domain::{AbstractState, ValueKind};
use crate::features::dataflow::infrastructure::solver::solve;
use crate::features::dataflow::infrastructure::zeroness::{
    apply_statement, eval_expr_kind, zeroness_transfer,
};
use crate::shared::models::{
    rule_descriptor, BinaryOp, Expr, Finding, Severity, Span, Statement, StmtKind,
    RULE_ZERO_DIVISION,
};
use crate::shared::ports::SuppressionOracle;

/// Run the zero-division rule over one function's CFG
pub fn check_zero_division(
    cfg: &ControlFlowGraph,
    config: &AnalyzerConfig,
    oracle: &dyn SuppressionOracle,
) -> Vec<Finding> {
    if !config.rules.zero_division {
        return Vec::new();
    }

    let result = solve(cfg, AbstractState::reachable(), zeroness_transfer);
    let mut findings = Vec::new();

    for block in cfg.live_blocks() {
        let mut state = result.entry_state(block.id);
        for stmt in &block.statements {
            report_divisions_in_stmt(stmt, &state, &mut findings);
            apply_statement(&mut state, stmt);
        }
        if let Some(cond) = &block.branch_cond {
            report_divisions_in_expr(cond, &state, Span::zero(), &mut findings);
        }
    }

    findings.retain(|f| !oracle.is_suppressed(&f.rule_id, &finding_span(f)));
    debug!(
        function = %cfg.function_name,
        findings = findings.len(),
        "zero-division rule finished"
    );
    findings
}

fn finding_span(f: &Finding) -> Span {
    Span::new(f.start.line, f.start.column, f.end.line, f.end.column)
}

fn report_divisions_in_stmt(stmt: &Statement, state: &AbstractState, out: &mut Vec<Finding>) {
    match &stmt.kind {
        StmtKind::Assign { value, .. } => report_divisions_in_expr(value, state, stmt.span, out),
        StmtKind::Return(Some(value)) => report_divisions_in_expr(value, state, stmt.span, out),
        StmtKind::Call(expr) => report_divisions_in_expr(expr, state, stmt.span, out),
        _ => {}
    }
}

fn report_divisions_in_expr(expr: &Expr, state: &AbstractState, span: Span, out: &mut Vec<Finding>) {
    match expr {
        Expr::Binary { op, lhs, rhs } => {
            report_divisions_in_expr(lhs, state, span, out);
            report_divisions_in_expr(rhs, state, span, out);
            if *op == BinaryOp::Div {
                match eval_expr_kind(rhs, state) {
                    ValueKind::Zero => out.push(make_finding(
                        span,
                        format!("division by zero: divisor `{rhs}` is always zero"),
                        rule_descriptor(RULE_ZERO_DIVISION)
                            .map(|d| d.default_severity)
                            .unwrap_or(Severity::Error),
                    )),
                    ValueKind::MaybeZero => out.push(make_finding(
                        span,
                        format!("possible division by zero: divisor `{rhs}` may be zero"),
                        Severity::Warning,
                    )),
                    ValueKind::NonZero | ValueKind::Top | ValueKind::Bottom => {}
                }
            }
        }
        Expr::Unary { operand, .. } => report_divisions_in_expr(operand, state, span, out),
        Expr::Call { args, .. } => {
            for arg in args {
                report_divisions_in_expr(arg, state, span, out);
            }
        }
        Expr::IntLit(_) | Expr::BoolLit(_) | Expr::Var(_) => {}
    }
}

fn make_finding(span: Span, message: String, severity: Severity) -> Finding {
    Finding::new(
        RULE_ZERO_DIVISION,
        span.start(),
        span.end(),
        message,
        severity,
    )
}
