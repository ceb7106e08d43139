//! Error types for clinalert Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid number literal: {0}")]
    InvalidNumber(String),

    #[error("Invalid operator: {0}")]
    InvalidOperator(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
