//! Shared models used across feature slices
//!
//! Types that more than one feature consumes live here to avoid circular
//! feature dependencies.

pub mod finding;
pub mod span;
pub mod stmt;

pub use finding::{rule_descriptor, Finding, RuleDescriptor, Severity, RULE_ZERO_DIVISION, RULES};
pub use span::{Location, Span};
pub use stmt::{BinaryOp, Expr, FunctionBody, Statement, StmtKind, UnaryOp};
