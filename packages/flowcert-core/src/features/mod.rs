//! Feature modules
//!
//! Vertical slices: cfg → dataflow, eval → rewrite_check.

pub mod cfg;
pub mod dataflow;
pub mod eval;
pub mod rewrite_check;
