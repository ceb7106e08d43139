//! clinalert Core - Core types and definitions for the clinical alert engine
//!
//! This crate provides the fundamental types used across the clinalert crates:
//! - Value and record types for study data
//! - Alert definitions (operators, atomic tests, condition specs)
//! - Error types

pub mod ast;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use ast::{
    Alert, AlertSet, AtomicTest, CompareOp, ConditionMap, ConditionSpec, Literal, NumberLiteral,
};
pub use error::{CoreError, Result};
pub use types::{Record, Value};
