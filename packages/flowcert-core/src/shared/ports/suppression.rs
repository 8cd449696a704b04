//! Suppression oracle port
//!
//! Suppression-comment resolution happens outside the core. Rules only ask
//! whether a finding at a given position should be reported.

use crate::shared::models::Span;

/// External predicate deciding whether a finding is suppressed at a position
pub trait SuppressionOracle: Sync {
    fn is_suppressed(&self, rule_id: &str, span: &Span) -> bool;
}

/// Default oracle that never suppresses anything
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverSuppress;

impl SuppressionOracle for NeverSuppress {
    fn is_suppressed(&self, _rule_id: &str, _span: &Span) -> bool {
        false
    }
}
