//! Dataflow domain types

pub mod lattice;

pub use lattice::{AbstractState, Lattice, ValueKind};
