//! Restricted statement grammar
//!
//! The core models exactly the statement shapes that realistic automatic
//! rewrites touch: assignment, sequencing, conditionals (with an optional
//! scoped initializer), early termination, loops (recognized for CFG
//! construction only) and opaque calls. Anything else arrives pre-degraded
//! as an `Unsupported` placeholder instead of failing the whole build.
//!
//! Statements are immutable once constructed. Syntactic identity of
//! expressions (used for condition case-splitting and opaque-call
//! comparison) is defined by the canonical `Display` rendering.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::span::Span;

/// Binary operators of the modeled expression language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// Expression of the modeled language
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Expr {
    IntLit(i64),
    BoolLit(bool),
    Var(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Opaque call: internal effect is not modeled, only ordering and
    /// multiplicity
    Call {
        callee: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn var(name: impl Into<String>) -> Self {
        Expr::Var(name.into())
    }

    pub fn call(callee: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: callee.into(),
            args,
        }
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn not(operand: Expr) -> Self {
        Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        }
    }

    /// Canonical text of this expression. Two expressions are syntactically
    /// identical iff their canonical texts match.
    pub fn canonical(&self) -> String {
        self.to_string()
    }

    /// Whether any call appears in this expression tree
    pub fn contains_call(&self) -> bool {
        match self {
            Expr::IntLit(_) | Expr::BoolLit(_) | Expr::Var(_) => false,
            Expr::Unary { operand, .. } => operand.contains_call(),
            Expr::Binary { lhs, rhs, .. } => lhs.contains_call() || rhs.contains_call(),
            Expr::Call { .. } => true,
        }
    }

    /// Collect free variable names into `out`
    pub fn collect_vars(&self, out: &mut Vec<String>) {
        match self {
            Expr::IntLit(_) | Expr::BoolLit(_) => {}
            Expr::Var(name) => out.push(name.clone()),
            Expr::Unary { operand, .. } => operand.collect_vars(out),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.collect_vars(out);
                rhs.collect_vars(out);
            }
            Expr::Call { args, .. } => {
                for arg in args {
                    arg.collect_vars(out);
                }
            }
        }
    }

    pub fn references_var(&self, name: &str) -> bool {
        match self {
            Expr::IntLit(_) | Expr::BoolLit(_) => false,
            Expr::Var(v) => v == name,
            Expr::Unary { operand, .. } => operand.references_var(name),
            Expr::Binary { lhs, rhs, .. } => {
                lhs.references_var(name) || rhs.references_var(name)
            }
            Expr::Call { args, .. } => args.iter().any(|a| a.references_var(name)),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::IntLit(v) => write!(f, "{v}"),
            Expr::BoolLit(v) => write!(f, "{v}"),
            Expr::Var(name) => write!(f, "{name}"),
            Expr::Unary { op, operand } => write!(f, "({}{})", op.symbol(), operand),
            Expr::Binary { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op.symbol(), rhs),
            Expr::Call { callee, args } => {
                write!(f, "{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Statement kind (closed variant set; adding a kind is a compile-time
/// checked change everywhere it matters)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StmtKind {
    Assign {
        target: String,
        value: Expr,
    },
    /// Statement sequence with short-circuit semantics: once a statement
    /// produces a non-normal result, later statements are not evaluated
    Block(Vec<Statement>),
    If {
        /// Optional initializer whose bindings scope to cond + branches only
        init: Option<Box<Statement>>,
        cond: Expr,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    /// Loop header; recognized for CFG construction, inadmissible inside
    /// rewrite fragments
    While {
        cond: Expr,
        body: Box<Statement>,
    },
    Return(Option<Expr>),
    Break,
    Continue,
    /// Expression statement whose only modeled effect is the call itself
    Call(Expr),
    /// Placeholder for a construct outside the modeled grammar
    Unsupported {
        description: String,
    },
}

/// Position-annotated statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StmtKind,
    pub span: Span,
}

impl Statement {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Statement without a meaningful source position (synthesized fragments)
    pub fn synthetic(kind: StmtKind) -> Self {
        Self::new(kind, Span::zero())
    }

    pub fn assign(target: impl Into<String>, value: Expr) -> Self {
        Self::synthetic(StmtKind::Assign {
            target: target.into(),
            value,
        })
    }

    pub fn block(stmts: Vec<Statement>) -> Self {
        Self::synthetic(StmtKind::Block(stmts))
    }

    pub fn if_stmt(cond: Expr, then_branch: Statement, else_branch: Option<Statement>) -> Self {
        Self::synthetic(StmtKind::If {
            init: None,
            cond,
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        })
    }

    pub fn if_with_init(
        init: Statement,
        cond: Expr,
        then_branch: Statement,
        else_branch: Option<Statement>,
    ) -> Self {
        Self::synthetic(StmtKind::If {
            init: Some(Box::new(init)),
            cond,
            then_branch: Box::new(then_branch),
            else_branch: else_branch.map(Box::new),
        })
    }

    pub fn ret(value: Option<Expr>) -> Self {
        Self::synthetic(StmtKind::Return(value))
    }

    pub fn call(expr: Expr) -> Self {
        Self::synthetic(StmtKind::Call(expr))
    }

    /// Whether every reachable path through this statement ends in a
    /// terminator (`Return`/`Break`/`Continue`). Loops and opaque constructs
    /// conservatively do not terminate.
    pub fn always_terminates(&self) -> bool {
        match &self.kind {
            StmtKind::Return(_) | StmtKind::Break | StmtKind::Continue => true,
            StmtKind::Block(stmts) => stmts.iter().any(|s| s.always_terminates()),
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => match else_branch {
                Some(else_branch) => {
                    then_branch.always_terminates() && else_branch.always_terminates()
                }
                None => false,
            },
            StmtKind::Assign { .. }
            | StmtKind::While { .. }
            | StmtKind::Call(_)
            | StmtKind::Unsupported { .. } => false,
        }
    }

    /// Whether this subtree contains any `Break`/`Continue`
    pub fn contains_loop_exit(&self) -> bool {
        self.any(&mut |s| matches!(s.kind, StmtKind::Break | StmtKind::Continue))
    }

    /// Whether this subtree contains a loop
    pub fn contains_loop(&self) -> bool {
        self.any(&mut |s| matches!(s.kind, StmtKind::While { .. }))
    }

    /// Whether this subtree contains an `Unsupported` placeholder
    pub fn contains_unsupported(&self) -> bool {
        self.any(&mut |s| matches!(s.kind, StmtKind::Unsupported { .. }))
    }

    /// Whether this subtree contains an opaque call (statement or expression
    /// position)
    pub fn contains_call(&self) -> bool {
        self.any(&mut |s| match &s.kind {
            StmtKind::Assign { value, .. } => value.contains_call(),
            StmtKind::If { cond, .. } => cond.contains_call(),
            StmtKind::While { cond, .. } => cond.contains_call(),
            StmtKind::Return(Some(value)) => value.contains_call(),
            StmtKind::Call(_) => true,
            _ => false,
        })
    }

    /// One-line rendering for diagnostics and diagram export
    pub fn summary(&self) -> String {
        match &self.kind {
            StmtKind::Assign { target, value } => format!("{target} = {value}"),
            StmtKind::Block(stmts) => format!("{{ {} statements }}", stmts.len()),
            StmtKind::If { cond, .. } => format!("if {cond}"),
            StmtKind::While { cond, .. } => format!("while {cond}"),
            StmtKind::Return(Some(value)) => format!("return {value}"),
            StmtKind::Return(None) => "return".to_string(),
            StmtKind::Break => "break".to_string(),
            StmtKind::Continue => "continue".to_string(),
            StmtKind::Call(expr) => expr.to_string(),
            StmtKind::Unsupported { description } => format!("<unsupported: {description}>"),
        }
    }

    /// Pre-order predicate walk over this statement tree. Loop bodies and
    /// branches are visited; initializers too.
    pub fn any(&self, pred: &mut dyn FnMut(&Statement) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        match &self.kind {
            StmtKind::Block(stmts) => stmts.iter().any(|s| s.any(pred)),
            StmtKind::If {
                init,
                then_branch,
                else_branch,
                ..
            } => {
                init.as_ref().map(|s| s.any(pred)).unwrap_or(false)
                    || then_branch.any(pred)
                    || else_branch.as_ref().map(|s| s.any(pred)).unwrap_or(false)
            }
            StmtKind::While { body, .. } => body.any(pred),
            _ => false,
        }
    }

    /// Pre-order visitor over this statement tree
    pub fn walk(&self, visit: &mut dyn FnMut(&Statement)) {
        visit(self);
        match &self.kind {
            StmtKind::Block(stmts) => {
                for s in stmts {
                    s.walk(visit);
                }
            }
            StmtKind::If {
                init,
                then_branch,
                else_branch,
                ..
            } => {
                if let Some(init) = init {
                    init.walk(visit);
                }
                then_branch.walk(visit);
                if let Some(else_branch) = else_branch {
                    else_branch.walk(visit);
                }
            }
            StmtKind::While { body, .. } => body.walk(visit),
            _ => {}
        }
    }
}

/// Function body handed to the CFG builder: a named, ordered statement list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionBody {
    pub name: String,
    pub statements: Vec<Statement>,
    pub span: Span,
}

impl FunctionBody {
    pub fn new(name: impl Into<String>, statements: Vec<Statement>) -> Self {
        Self {
            name: name.into(),
            statements,
            span: Span::zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_text_is_stable() {
        let e = Expr::binary(
            BinaryOp::Gt,
            Expr::var("v"),
            Expr::IntLit(0),
        );
        assert_eq!(e.canonical(), "(v > 0)");

        let call = Expr::call("compute", vec![Expr::var("x"), Expr::IntLit(2)]);
        assert_eq!(call.canonical(), "compute(x, 2)");
    }

    #[test]
    fn test_negation_renders_inner() {
        let e = Expr::not(Expr::binary(BinaryOp::Lt, Expr::var("n"), Expr::IntLit(10)));
        assert_eq!(e.canonical(), "(!(n < 10))");
    }

    #[test]
    fn test_always_terminates_if_else() {
        let both = Statement::if_stmt(
            Expr::var("cond"),
            Statement::ret(Some(Expr::IntLit(1))),
            Some(Statement::ret(Some(Expr::IntLit(2)))),
        );
        assert!(both.always_terminates());

        let no_else = Statement::if_stmt(
            Expr::var("cond"),
            Statement::ret(Some(Expr::IntLit(1))),
            None,
        );
        assert!(!no_else.always_terminates());
    }

    #[test]
    fn test_always_terminates_block() {
        let b = Statement::block(vec![
            Statement::assign("x", Expr::IntLit(1)),
            Statement::ret(None),
        ]);
        assert!(b.always_terminates());

        let open = Statement::block(vec![Statement::assign("x", Expr::IntLit(1))]);
        assert!(!open.always_terminates());
    }

    #[test]
    fn test_contains_call_in_expression_position() {
        let s = Statement::assign("x", Expr::call("f", vec![]));
        assert!(s.contains_call());

        let plain = Statement::assign("x", Expr::IntLit(1));
        assert!(!plain.contains_call());
    }
}
