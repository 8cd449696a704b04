//! Dataflow use cases

pub mod zero_division;

use rayon::prelude::*;

use crate::config::AnalyzerConfig;
use crate::features::cfg::application::build_cfg;
use crate::shared::models::{Finding, FunctionBody};
use crate::shared::ports::SuppressionOracle;

pub use zero_division::check_zero_division;

/// Run the dataflow lint rules over a batch of functions in parallel
pub fn lint_functions(
    funcs: &[FunctionBody],
    config: &AnalyzerConfig,
    oracle: &dyn SuppressionOracle,
) -> Vec<Finding> {
    funcs
        .par_iter()
        .flat_map(|func| {
            let cfg = build_cfg(func);
            check_zero_division(&cfg, config, oracle)
        })
        .collect()
}
