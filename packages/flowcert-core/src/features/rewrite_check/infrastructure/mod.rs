//! Rewrite verification algorithms

pub mod equivalence;
pub mod precondition;
pub mod scope;

pub use equivalence::{CheckOutcome, EquivalenceChecker};
