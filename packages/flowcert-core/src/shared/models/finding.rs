//! Lint findings produced for collaborators
//!
//! A finding is a `{rule_id, start, end, message, severity}` tuple. The
//! descriptor registry maps rule ids to their default severity so the
//! reporting layer does not need per-rule knowledge.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::span::Location;

/// Finding severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A single lint finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub start: Location,
    pub end: Location,
    pub message: String,
    pub severity: Severity,
}

impl Finding {
    pub fn new(
        rule_id: impl Into<String>,
        start: Location,
        end: Location,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            start,
            end,
            message: message.into(),
            severity,
        }
    }
}

/// Static metadata for a lint rule
#[derive(Debug, Clone, Copy)]
pub struct RuleDescriptor {
    pub id: &'static str,
    pub default_severity: Severity,
    pub description: &'static str,
}

/// Rule id of the zero-division dataflow rule
pub const RULE_ZERO_DIVISION: &str = "zero-division";

/// Registry of rules shipped with the core
pub static RULES: Lazy<Vec<RuleDescriptor>> = Lazy::new(|| {
    vec![RuleDescriptor {
        id: RULE_ZERO_DIVISION,
        default_severity: Severity::Error,
        description: "division by a value that may be zero",
    }]
});

/// Look up a rule descriptor by id
pub fn rule_descriptor(id: &str) -> Option<&'static RuleDescriptor> {
    RULES.iter().find(|r| r.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        let d = rule_descriptor(RULE_ZERO_DIVISION).unwrap();
        assert_eq!(d.default_severity, Severity::Error);
        assert!(rule_descriptor("no-such-rule").is_none());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }
}
