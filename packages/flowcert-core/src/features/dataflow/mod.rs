//! Dataflow analysis feature
//!
//! A generic monotone fixed-point solver over an abstract lattice, the
//! zero-ness instantiation, and the lint rules built on top of it.

pub mod application;
pub mod domain;
pub mod infrastructure;
