//! Analyzer configuration
//!
//! Two axes drive the core: how control transfer is modeled
//! (`ControlFlowMode`) and how opaque calls are treated (`CallPolicy`).
//! Rule toggles and the case-split bound round out the knobs. Configuration
//! files are YAML; discovery of the file on disk belongs to the caller.

mod error;

pub use error::{ConfigError, ConfigResult};

use serde::{Deserialize, Serialize};

/// How early termination is modeled by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlFlowMode {
    /// Only normal fall-through is modeled; early exits are undefined
    NoTermination,
    /// `return`/`break`/`continue` produce tagged termination results
    EarlyReturnAware,
}

/// How opaque calls are treated by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallPolicy {
    /// Any fragment containing a call is inadmissible
    DisallowCalls,
    /// Calls are unmodeled effects; ordering and multiplicity must be
    /// preserved across compared fragments
    OpaqueCalls,
}

/// Rule on/off switches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleControl {
    pub zero_division: bool,
}

impl Default for RuleControl {
    fn default() -> Self {
        Self {
            zero_division: true,
        }
    }
}

/// Top-level analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    pub control_flow_mode: ControlFlowMode,
    pub call_policy: CallPolicy,
    /// Upper bound on distinct case-split conditions per candidate.
    /// Enumeration is 2^n, so this stays small.
    pub max_conditions: usize,
    pub rules: RuleControl,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            control_flow_mode: ControlFlowMode::EarlyReturnAware,
            call_policy: CallPolicy::OpaqueCalls,
            max_conditions: 12,
            rules: RuleControl::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Parse a YAML configuration string
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: AnalyzerConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate field ranges
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_conditions == 0 || self.max_conditions > 20 {
            return Err(ConfigError::Range {
                field: "max_conditions".to_string(),
                value: self.max_conditions.to_string(),
                min: "1".to_string(),
                max: "20".to_string(),
            });
        }
        Ok(())
    }

    /// Whether the configured axes enable rewrite-equivalence checking
    pub fn rewrite_checks_enabled(&self) -> bool {
        self.control_flow_mode == ControlFlowMode::EarlyReturnAware
            && self.call_policy == CallPolicy::OpaqueCalls
    }
}
