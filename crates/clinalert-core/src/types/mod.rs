//! Data types for study records

pub mod record;
pub mod value;

pub use record::Record;
pub use value::{format_number, parse_decimal, Value};
