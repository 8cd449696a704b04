//! Evaluation algorithms

pub mod evaluator;

pub use evaluator::{EvalOutcome, Evaluator};
