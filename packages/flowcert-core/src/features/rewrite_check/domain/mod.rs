//! Rewrite verification domain
//!
//! A candidate pairs an original fragment with its proposed rewrite plus the
//! context the checker needs: the enclosing scope's visible identifiers and
//! whether the fragment sits inside a loop. The verdict is produced once and
//! never mutated.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::features::eval::domain::AnalysisFault;
use crate::shared::models::{Span, Statement};

/// Rewrite patterns recognized by the soundness policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewritePattern {
    /// `if cond { S1 } else { S2 }` → `if cond { S1 }; S2`
    IfElseFlatten,
    /// Guard inversion moving the terminating branch in front of the
    /// fall-through code
    EarlyReturnNormalize,
    /// `if c1 { t1 } else if c2 { t2 } else { t3 }` → sequential guarded
    /// terminators
    ElseIfChainFlatten,
}

/// A proposed rewrite awaiting certification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteCandidate {
    pub pattern: RewritePattern,
    pub original: Statement,
    pub rewritten: Statement,
    /// Identifiers visible in the enclosing scope, for scope-leak checks
    pub visible_idents: FxHashSet<String>,
    /// Whether the enclosing analysis context is inside a loop
    pub in_loop: bool,
    pub span: Span,
}

impl RewriteCandidate {
    pub fn new(pattern: RewritePattern, original: Statement, rewritten: Statement) -> Self {
        Self {
            pattern,
            original,
            rewritten,
            visible_idents: FxHashSet::default(),
            in_loop: false,
            span: Span::zero(),
        }
    }

    pub fn with_visible_idents(mut self, idents: impl IntoIterator<Item = String>) -> Self {
        self.visible_idents = idents.into_iter().collect();
        self
    }

    pub fn inside_loop(mut self) -> Self {
        self.in_loop = true;
        self
    }
}

/// Soundness verdict for one candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    /// The rewrite preserves observable behavior; safe to auto-apply
    Verified,
    /// Insufficient information; safe to suggest, unsafe to auto-apply
    Unknown { reason: String },
    /// Structurally inadmissible
    Rejected { reason: String },
}

impl Verdict {
    pub fn unknown(reason: impl Into<String>) -> Self {
        Verdict::Unknown {
            reason: reason.into(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Verdict::Rejected {
            reason: reason.into(),
        }
    }

    /// Deterministic fault mapping: malformed control transfer is a
    /// structural rejection, everything else is a conservative unknown.
    pub fn from_fault(fault: &AnalysisFault) -> Self {
        match fault {
            AnalysisFault::MalformedControlTransfer => Verdict::rejected(fault.to_string()),
            other => Verdict::unknown(other.to_string()),
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Verdict::Verified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_mapping() {
        assert!(matches!(
            Verdict::from_fault(&AnalysisFault::MalformedControlTransfer),
            Verdict::Rejected { .. }
        ));
        assert!(matches!(
            Verdict::from_fault(&AnalysisFault::NonTerminatingBranch),
            Verdict::Unknown { .. }
        ));
        assert!(matches!(
            Verdict::from_fault(&AnalysisFault::ScopeViolation("v".to_string())),
            Verdict::Unknown { .. }
        ));
    }

    #[test]
    fn test_verdict_serialization_tag() {
        let json = serde_json::to_string(&Verdict::Verified).unwrap();
        assert!(json.contains("verified"));
        let json = serde_json::to_string(&Verdict::unknown("why")).unwrap();
        assert!(json.contains("unknown"));
        assert!(json.contains("why"));
    }
}
