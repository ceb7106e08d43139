//! Runtime error types

use thiserror::Error;

/// Runtime error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// The record identifier field could not be determined
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
