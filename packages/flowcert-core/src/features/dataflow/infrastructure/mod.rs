//! Dataflow algorithms

pub mod solver;
pub mod zeroness;

pub use solver::{solve, SolveResult, SolveStats};
pub use zeroness::zeroness_transfer;
