//! Field value types for study records
//!
//! The `Value` enum represents everything a record field can hold once it has
//! been exported from the study database: a number, a string, or nothing.
//! "Missing" covers absent keys, explicit nulls, blank strings and NaN-like
//! sentinels, and every condition test treats them identically.

use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Record field value
///
/// Deserializes from any self-describing format through the same mapping as
/// `From<serde_json::Value>`: booleans and nested values become strings.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// No value (null or absent)
    #[default]
    Missing,
    /// Number value (f64 handles both int and decimal exports)
    Number(f64),
    /// String value, possibly holding a number that still needs coercion
    String(String),
}

impl Value {
    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Returns true if this value counts as missing.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Missing => true,
            Value::Number(n) => n.is_nan(),
            Value::String(s) => {
                let s = s.trim();
                s.is_empty() || s.eq_ignore_ascii_case("nan")
            }
        }
    }

    /// Coerce to a number.
    ///
    /// Strings coerce only when they are a clean integer or decimal
    /// (`"12"`, `"-0.5"`); anything else, including missing values, is `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(*n),
            Value::String(s) => parse_decimal(s),
            _ => None,
        }
    }

    /// Coerce to text for string equality tests.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        if self.is_missing() {
            return None;
        }
        match self {
            Value::String(s) => Some(Cow::Borrowed(s.trim())),
            Value::Number(n) => Some(Cow::Owned(format_number(*n))),
            Value::Missing => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Missing,
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or_default(),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Bool(b) => Value::String(b.to_string()),
            other => Value::String(other.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

/// Parse a clean integer or decimal literal (`12`, `-3.5`, `+0.1`).
///
/// Exponents, `inf` and `NaN` are rejected even though `f64::from_str`
/// accepts them.
pub fn parse_decimal(text: &str) -> Option<f64> {
    let text = text.trim();
    let unsigned = text.strip_prefix(['-', '+']).unwrap_or(text);

    let mut digits = 0usize;
    let mut dots = 0usize;
    for c in unsigned.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return None,
        }
    }

    if digits == 0 || dots > 1 {
        return None;
    }
    text.parse::<f64>().ok()
}

/// Format a number the way exports show it: `30` rather than `30.0`.
pub fn format_number(n: f64) -> String {
    format!("{}", n)
}
