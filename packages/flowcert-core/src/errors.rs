//! Error types for flowcert-core
//!
//! Analysis outcomes never surface here: every fault inside the rewrite
//! checks maps onto a `Verdict`, and lattice rules degrade to conservative
//! answers. This error type covers caller-facing misuse only, configuration
//! and serialization.

use thiserror::Error;

/// Main error type for flowcert-core operations
#[derive(Debug, Error)]
pub enum FlowcertError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for flowcert operations
pub type Result<T> = std::result::Result<T, FlowcertError>;
