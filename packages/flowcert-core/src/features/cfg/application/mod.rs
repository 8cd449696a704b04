//! CFG use cases
//!
//! Each function body is independent, so batch construction fans out across
//! rayon workers. The builder itself holds no shared state.

use rayon::prelude::*;

use crate::features::cfg::domain::ControlFlowGraph;
use crate::features::cfg::infrastructure::builder::CfgBuilder;
use crate::shared::models::FunctionBody;

/// Build the CFG for a single function
pub fn build_cfg(func: &FunctionBody) -> ControlFlowGraph {
    CfgBuilder::build(func)
}

/// Build CFGs for a batch of functions in parallel
pub fn build_cfgs(funcs: &[FunctionBody]) -> Vec<ControlFlowGraph> {
    funcs.par_iter().map(CfgBuilder::build).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Expr, Statement};

    #[test]
    fn test_batch_build_preserves_order() {
        let funcs: Vec<FunctionBody> = (0..8)
            .map(|i| {
                FunctionBody::new(
                    format!("f{i}"),
                    vec![Statement::ret(Some(Expr::IntLit(i)))],
                )
            })
            .collect();

        let cfgs = build_cfgs(&funcs);
        assert_eq!(cfgs.len(), 8);
        for (i, cfg) in cfgs.iter().enumerate() {
            assert_eq!(cfg.function_name, format!("f{i}"));
        }
    }
}
