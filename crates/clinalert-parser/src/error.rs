//! Parser error types

use thiserror::Error;

/// Parser error
///
/// `Lexical`, `UnmatchedFragment` and `CrossVariableAnd` are diagnostics:
/// compilation collects them alongside its output instead of failing. The
/// remaining variants are returned as errors when decoding rule tables.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Unrecognized character in rule text
    #[error("Illegal character '{character}' at position {position}")]
    Lexical { position: usize, character: char },

    /// Rule text that matches no known condition shape
    #[error("Unrecognized condition fragment at position {position}: {fragment}")]
    UnmatchedFragment { position: usize, fragment: String },

    /// `and` joining tests on different variables; each side is kept as
    /// its own trigger
    #[error("'and' across variables at position {position} cannot be kept: {fragment}")]
    CrossVariableAnd { position: usize, fragment: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Missing required field
    #[error("Missing required field '{field}' in row {row}")]
    MissingField { row: usize, field: String },

    /// Invalid field value
    #[error("Invalid value for field '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ParseError {
    /// Returns true for non-fatal compile diagnostics
    pub fn is_diagnostic(&self) -> bool {
        matches!(
            self,
            ParseError::Lexical { .. }
                | ParseError::UnmatchedFragment { .. }
                | ParseError::CrossVariableAnd { .. }
        )
    }
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_error_message() {
        let error = ParseError::Lexical {
            position: 4,
            character: '#',
        };
        assert_eq!(error.to_string(), "Illegal character '#' at position 4");
        assert!(error.is_diagnostic());
    }

    #[test]
    fn test_missing_field_message() {
        let error = ParseError::MissingField {
            row: 2,
            field: "alert-condition".to_string(),
        };
        assert!(error.to_string().contains("alert-condition"));
        assert!(error.to_string().contains("row 2"));
        assert!(!error.is_diagnostic());
    }

    #[test]
    fn test_cross_variable_and_is_diagnostic() {
        let error = ParseError::CrossVariableAnd {
            position: 8,
            fragment: "[a] = 1 and [b] = 2".to_string(),
        };
        assert!(error.is_diagnostic());
        assert!(error.to_string().contains("[a] = 1 and [b] = 2"));
    }
}
