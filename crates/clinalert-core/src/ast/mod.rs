//! Alert definitions
//!
//! Types produced by compiling rule text and consumed by the evaluator.

pub mod alert;
pub mod condition;
pub mod operator;

pub use alert::{Alert, AlertSet};
pub use condition::{
    pair_key, AtomicTest, ConditionMap, ConditionSpec, Literal, NumberLiteral, PAIR_SEPARATOR,
};
pub use operator::CompareOp;
