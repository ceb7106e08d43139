//! Comparison operators for alert conditions

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Comparison operator of a single atomic test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    /// Equal (=)
    Eq,
    /// Not equal (<> or !=)
    Ne,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,
}

impl CompareOp {
    /// Parse an operator from its source spelling
    pub fn from_symbol(symbol: &str) -> Result<Self> {
        match symbol {
            "=" => Ok(CompareOp::Eq),
            "<>" | "!=" => Ok(CompareOp::Ne),
            ">" => Ok(CompareOp::Gt),
            ">=" => Ok(CompareOp::Ge),
            "<" => Ok(CompareOp::Lt),
            "<=" => Ok(CompareOp::Le),
            other => Err(CoreError::InvalidOperator(other.to_string())),
        }
    }

    /// Canonical spelling used in condition descriptions
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
        }
    }

    /// Returns true for ordering operators (`<`, `<=`, `>`, `>=`), the only
    /// ones that contribute to a reference interval
    pub fn is_bound(&self) -> bool {
        matches!(
            self,
            CompareOp::Gt | CompareOp::Ge | CompareOp::Lt | CompareOp::Le
        )
    }

    /// Apply the operator to two numbers
    pub fn compare_numbers(&self, left: f64, right: f64) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
            CompareOp::Gt => left > right,
            CompareOp::Ge => left >= right,
            CompareOp::Lt => left < right,
            CompareOp::Le => left <= right,
        }
    }

    /// Apply the operator to two strings; only equality operators are
    /// defined for text
    pub fn compare_text(&self, left: &str, right: &str) -> Result<bool> {
        match self {
            CompareOp::Eq => Ok(left == right),
            CompareOp::Ne => Ok(left != right),
            other => Err(CoreError::InvalidOperation(format!(
                "'{}' is not defined for strings",
                other.symbol()
            ))),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_symbol() {
        assert_eq!(CompareOp::from_symbol("<>").unwrap(), CompareOp::Ne);
        assert_eq!(CompareOp::from_symbol("!=").unwrap(), CompareOp::Ne);
        assert_eq!(CompareOp::from_symbol(">=").unwrap(), CompareOp::Ge);
        assert!(matches!(
            CompareOp::from_symbol("=="),
            Err(CoreError::InvalidOperator(_))
        ));
    }

    #[test]
    fn test_is_bound() {
        assert!(CompareOp::Lt.is_bound());
        assert!(CompareOp::Ge.is_bound());
        assert!(!CompareOp::Eq.is_bound());
        assert!(!CompareOp::Ne.is_bound());
    }

    #[test]
    fn test_compare_numbers() {
        assert!(CompareOp::Lt.compare_numbers(2.0, 3.5));
        assert!(!CompareOp::Gt.compare_numbers(12.0, 12.0));
        assert!(CompareOp::Ge.compare_numbers(12.0, 12.0));
        assert!(CompareOp::Ne.compare_numbers(1.0, 2.0));
    }

    #[test]
    fn test_compare_text() {
        assert!(CompareOp::Eq.compare_text("yes", "yes").unwrap());
        assert!(CompareOp::Ne.compare_text("yes", "no").unwrap());
        assert!(CompareOp::Lt.compare_text("a", "b").is_err());
    }
}
