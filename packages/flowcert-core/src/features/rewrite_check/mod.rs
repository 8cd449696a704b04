//! Rewrite equivalence checking feature
//!
//! Decides whether a proposed rewrite of a control-flow fragment preserves
//! program behavior, and certifies it for the external auto-fixer.

pub mod application;
pub mod domain;
pub mod infrastructure;
