//! clinalert SDK
//!
//! High-level API for compiling alert rule tables and reporting deviating
//! study records.

pub mod builder;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod source;

// Re-export main types
pub use builder::AlertEngineBuilder;
pub use config::{EngineConfig, InactiveAlertPolicy, DEFAULT_LOG_FILTER};
pub use engine::{AlertEngine, RuleWarning};
pub use error::{Result, SdkError};
pub use logging::init_tracing;
pub use source::{ProjectSource, StaticProjectSource};

// Re-export commonly used types from dependencies
pub use clinalert_core::{Alert, AlertSet, Record, Value};
pub use clinalert_parser::{RuleRow, RuleTable};
pub use clinalert_runtime::{DetailedReport, DeviationReport, VariableDeviation};
