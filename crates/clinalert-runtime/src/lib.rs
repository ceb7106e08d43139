//! clinalert Runtime - Deviation evaluation for compiled alerts
//!
//! This crate applies compiled alert conditions to study records and
//! reports which fields of which records deviate.

pub mod error;
pub mod evaluator;
pub mod identifier;
pub mod result;

// Re-export main types
pub use error::{Result, RuntimeError};
pub use evaluator::{DeviationEvaluator, InactiveAlertPolicy};
pub use identifier::{require_identifier_field, resolve_identifier_field};
pub use result::{DetailedReport, DeviationReport, VariableDeviation};
