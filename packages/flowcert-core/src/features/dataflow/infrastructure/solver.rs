//! Monotone fixed-point solver
//!
//! Forward dataflow over a CFG: reverse-postorder sweeps, joining
//! predecessor exit states into each block's entry state, until nothing
//! changes. The solver is domain-agnostic; any bounded join-semilattice and
//! monotone transfer function plug in. Monotonicity is a caller obligation
//! and is not checked here.

use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::features::cfg::domain::{BasicBlock, BlockId, ControlFlowGraph};
use crate::features::dataflow::domain::Lattice;

/// Sweep multiplier guarding against non-monotone transfer functions. A
/// monotone transfer over a finite-height lattice converges well inside
/// this bound.
const MAX_SWEEP_FACTOR: usize = 64;

#[derive(Debug, Clone, Copy, Default)]
pub struct SolveStats {
    /// Full reverse-postorder sweeps until the fixed point
    pub iterations: usize,
    /// Live blocks visited per sweep
    pub visited_blocks: usize,
}

/// Stable per-block states
#[derive(Debug, Clone)]
pub struct SolveResult<S> {
    pub entry_states: FxHashMap<BlockId, S>,
    pub exit_states: FxHashMap<BlockId, S>,
    pub stats: SolveStats,
}

impl<S: Lattice> SolveResult<S> {
    /// State at block entry; `bottom` for dead or unvisited blocks
    pub fn entry_state(&self, id: BlockId) -> S {
        self.entry_states.get(&id).cloned().unwrap_or_else(S::bottom)
    }

    /// State at block exit; `bottom` for dead or unvisited blocks
    pub fn exit_state(&self, id: BlockId) -> S {
        self.exit_states.get(&id).cloned().unwrap_or_else(S::bottom)
    }
}

/// Compute the forward fixed point of `transfer` over `cfg`
///
/// The entry block's state is seeded from `initial`; every other block joins
/// its predecessors' exit states. Dead blocks never participate.
pub fn solve<S, F>(cfg: &ControlFlowGraph, initial: S, transfer: F) -> SolveResult<S>
where
    S: Lattice,
    F: Fn(&BasicBlock, &S) -> S,
{
    let order = cfg.reverse_postorder();
    let preds = cfg.predecessors();

    let mut entry_states: FxHashMap<BlockId, S> = FxHashMap::default();
    let mut exit_states: FxHashMap<BlockId, S> = FxHashMap::default();

    let max_sweeps = MAX_SWEEP_FACTOR * order.len().max(1);
    let mut sweeps = 0;

    loop {
        sweeps += 1;
        let mut changed = false;

        for &id in &order {
            let block = cfg.block(id);

            let mut incoming = if id == cfg.entry() {
                initial.clone()
            } else {
                S::bottom()
            };
            if let Some(block_preds) = preds.get(&id) {
                for &p in block_preds {
                    if let Some(exit) = exit_states.get(&p) {
                        incoming = incoming.join(exit);
                    }
                }
            }

            if entry_states.get(&id) != Some(&incoming) {
                changed = true;
            }
            let outgoing = transfer(block, &incoming);
            if exit_states.get(&id) != Some(&outgoing) {
                changed = true;
            }
            entry_states.insert(id, incoming);
            exit_states.insert(id, outgoing);
        }

        if !changed {
            break;
        }
        if sweeps >= max_sweeps {
            warn!(
                function = %cfg.function_name,
                sweeps,
                "fixed-point iteration hit the sweep cap; transfer function is likely non-monotone"
            );
            break;
        }
    }

    debug!(
        function = %cfg.function_name,
        sweeps,
        blocks = order.len(),
        "dataflow fixed point reached"
    );

    SolveResult {
        entry_states,
        exit_states,
        stats: SolveStats {
            iterations: sweeps,
            visited_blocks: order.len(),
        },
    }
}
