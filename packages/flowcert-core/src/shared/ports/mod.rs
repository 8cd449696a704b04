//! Consumer-supplied interfaces
//!
//! The core queries these as pure predicates; implementations live with the
//! orchestration layer.

pub mod suppression;

pub use suppression::{NeverSuppress, SuppressionOracle};
