/*
 * Flowcert Core - Flow Analysis and Rewrite Verification
 *
 * Feature-First Architecture:
 * - shared/       : Common models (Span, statement grammar, findings) and ports
 * - features/     : Vertical slices (cfg → dataflow, eval → rewrite_check)
 * - config/       : Analyzer configuration (modes, policies, rule toggles)
 *
 * Every core operation is a pure function of its inputs: no ambient state,
 * no interior mutability, no blocking I/O. Independent functions and
 * candidates fan out across rayon workers in the application layers.
 */

#![allow(clippy::collapsible_if)] // Readability over brevity
#![allow(clippy::new_without_default)] // Default impl not always needed

/// Shared models and ports
pub mod shared;

/// Feature modules
pub mod features;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ───────────────────────────────────────────────────────────────────────────
// Re-exports for the public API
// ───────────────────────────────────────────────────────────────────────────

pub use config::{AnalyzerConfig, CallPolicy, ConfigError, ControlFlowMode};
pub use errors::{FlowcertError, Result};
pub use features::cfg::application::{build_cfg, build_cfgs};
pub use features::cfg::domain::{BasicBlock, BlockId, CfgEdge, ControlFlowGraph, EdgeKind};
pub use features::dataflow::application::{check_zero_division, lint_functions};
pub use features::dataflow::domain::{AbstractState, Lattice, ValueKind};
pub use features::dataflow::infrastructure::{solve, SolveResult, SolveStats};
pub use features::eval::domain::{AnalysisFault, Environment, TerminationResult, Value};
pub use features::eval::infrastructure::{EvalOutcome, Evaluator};
pub use features::rewrite_check::application::SoundnessPolicy;
pub use features::rewrite_check::domain::{RewriteCandidate, RewritePattern, Verdict};
pub use shared::models::{
    BinaryOp, Expr, Finding, FunctionBody, Location, Severity, Span, Statement, StmtKind, UnaryOp,
};
pub use shared::ports::{NeverSuppress, SuppressionOracle};
