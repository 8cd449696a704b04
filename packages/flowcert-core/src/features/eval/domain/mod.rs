//! Evaluation domain
//!
//! Termination-tagged results and the fault taxonomy. Faults never cross
//! the crate boundary as errors; the soundness policy maps each one onto a
//! conservative verdict.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Symbolic or concrete value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Bool(bool),
    /// Canonical term of a value the evaluator cannot fold, expressed over
    /// initial variable values and indexed call results
    Opaque(String),
}

impl Value {
    /// Canonical term used when this value feeds a larger symbolic term
    pub fn term(&self) -> String {
        match self {
            Value::Int(v) => v.to_string(),
            Value::Bool(v) => v.to_string(),
            Value::Opaque(t) => t.clone(),
        }
    }
}

/// Variable environment
pub type Environment = FxHashMap<String, Value>;

/// Deterministic analysis fault
///
/// Every fault maps onto `Unknown` or `Rejected`; none of them is a crash.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum AnalysisFault {
    /// Statement shape outside the modeled grammar
    #[error("unsupported construct: {0}")]
    UnsupportedConstruct(String),

    /// An initializer identifier escapes its conditional
    #[error("initializer identifier `{0}` escapes its conditional")]
    ScopeViolation(String),

    /// A branch expected to terminate does not
    #[error("branch does not terminate on every path")]
    NonTerminatingBranch,

    /// Opaque-call sequences differ between the compared fragments
    #[error("opaque call sequences differ: {0}")]
    CallOrderViolation(String),

    /// `break`/`continue` outside a loop context
    #[error("break/continue outside loop context")]
    MalformedControlTransfer,
}

/// Tagged outcome of evaluating a statement
///
/// Once any statement in a sequence yields a non-`Continue` result, later
/// statements are not evaluated; that rule is the formal basis for early
/// return reasoning. Kind mismatches are never equivalent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TerminationResult {
    /// Normal fall-through with the resulting environment
    Continue(Environment),
    Return(Option<Value>),
    Break,
    ContinueLoop,
    /// Evaluation hit a fault; no behavioral claim can be made
    Undefined(AnalysisFault),
}

impl TerminationResult {
    pub fn is_continue(&self) -> bool {
        matches!(self, TerminationResult::Continue(_))
    }

    pub fn fault(&self) -> Option<&AnalysisFault> {
        match self {
            TerminationResult::Undefined(fault) => Some(fault),
            _ => None,
        }
    }

    /// Short tag for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            TerminationResult::Continue(_) => "continue",
            TerminationResult::Return(_) => "return",
            TerminationResult::Break => "break",
            TerminationResult::ContinueLoop => "continue-loop",
            TerminationResult::Undefined(_) => "undefined",
        }
    }
}
