//! Termination-aware evaluation feature
//!
//! A denotational interpreter over the restricted grammar that produces a
//! termination-tagged result instead of a bare environment.

pub mod domain;
pub mod infrastructure;
