//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Rule table error
    #[error("Parser error: {0}")]
    ParseError(#[from] clinalert_parser::ParseError),

    /// Runtime error
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] clinalert_runtime::RuntimeError),

    /// Failure reported by a project source
    #[error("Project source error: {0}")]
    Source(#[from] anyhow::Error),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
