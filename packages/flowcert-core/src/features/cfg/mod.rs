//! Control flow graph feature
//!
//! Converts a function body into a basic-block graph with typed edges.

pub mod application;
pub mod domain;
pub mod infrastructure;
