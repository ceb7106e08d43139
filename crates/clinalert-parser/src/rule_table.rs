//! Rule table decoding
//!
//! A rule table is the list of alert definitions exported from the study's
//! alert configuration. Only three columns matter:
//!
//! | column              | alias         | meaning                          |
//! |---------------------|---------------|----------------------------------|
//! | `alert-title`       | `title`       | display name of the alert        |
//! | `alert-condition`   | `condition`   | rule text in the condition language |
//! | `alert-deactivated` | `deactivated` | `"Y"` / `"N"` or a boolean       |
//!
//! Tables are decoded from YAML or JSON text: either a top-level list of rows
//! or a mapping with an `alerts` list.

use crate::error::{ParseError, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::Value as YamlValue;

const TITLE_FIELDS: [&str; 2] = ["alert-title", "title"];
const CONDITION_FIELDS: [&str; 2] = ["alert-condition", "condition"];
const DEACTIVATED_FIELDS: [&str; 2] = ["alert-deactivated", "deactivated"];

/// One alert definition row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleRow {
    pub title: String,
    pub condition: String,
    pub deactivated: bool,
}

impl RuleRow {
    /// Create a row from the raw table cells
    pub fn new(title: impl Into<String>, condition: impl Into<String>, deactivated: &str) -> Self {
        Self {
            title: title.into(),
            condition: condition.into(),
            deactivated: is_deactivated(deactivated),
        }
    }

    pub fn is_active(&self) -> bool {
        !self.deactivated
    }
}

/// Interpret a deactivation flag: `Y`, `yes`, `true` and `1` mean
/// deactivated; anything else (including `N` and blank) means active
pub fn is_deactivated(flag: &str) -> bool {
    matches!(
        flag.trim().to_ascii_lowercase().as_str(),
        "y" | "yes" | "true" | "1"
    )
}

/// Rule table decoder
pub struct RuleTable;

impl RuleTable {
    /// Decode a rule table from YAML text
    pub fn from_yaml_str(yaml_str: &str) -> Result<Vec<RuleRow>> {
        let value: YamlValue = serde_yaml::from_str(yaml_str)?;
        Self::from_value(&value)
    }

    /// Decode a rule table from JSON text
    pub fn from_json_str(json_str: &str) -> Result<Vec<RuleRow>> {
        let value: YamlValue = serde_json::from_str(json_str)?;
        Self::from_value(&value)
    }

    /// Decode a rule table from a parsed document
    pub fn from_value(value: &YamlValue) -> Result<Vec<RuleRow>> {
        let rows = match value {
            YamlValue::Sequence(rows) => rows,
            YamlValue::Mapping(_) => value
                .get("alerts")
                .and_then(YamlValue::as_sequence)
                .ok_or_else(|| ParseError::MissingField {
                    row: 0,
                    field: "alerts".to_string(),
                })?,
            YamlValue::Null => return Ok(Vec::new()),
            _ => {
                return Err(ParseError::InvalidValue {
                    field: "alerts".to_string(),
                    message: "expected a list of alert rows".to_string(),
                })
            }
        };

        rows.iter()
            .enumerate()
            .map(|(index, row)| Self::parse_row(index + 1, row))
            .collect()
    }

    fn parse_row(row: usize, obj: &YamlValue) -> Result<RuleRow> {
        let title = Self::get_string(row, obj, &TITLE_FIELDS)?;
        let condition = Self::get_string(row, obj, &CONDITION_FIELDS)?;
        let deactivated = match Self::get_field(obj, &DEACTIVATED_FIELDS) {
            None | Some(YamlValue::Null) => false,
            Some(YamlValue::Bool(b)) => *b,
            Some(YamlValue::String(s)) => is_deactivated(s),
            Some(YamlValue::Number(n)) => n.as_i64() == Some(1),
            Some(_) => {
                return Err(ParseError::InvalidValue {
                    field: DEACTIVATED_FIELDS[0].to_string(),
                    message: format!("row {}: expected Y/N or a boolean", row),
                })
            }
        };

        Ok(RuleRow {
            title,
            condition,
            deactivated,
        })
    }

    fn get_field<'v>(obj: &'v YamlValue, names: &[&str]) -> Option<&'v YamlValue> {
        names.iter().find_map(|name| obj.get(*name))
    }

    fn get_string(row: usize, obj: &YamlValue, names: &[&str]) -> Result<String> {
        Self::get_field(obj, names)
            .and_then(YamlValue::as_str)
            .map(str::to_string)
            .ok_or_else(|| ParseError::MissingField {
                row,
                field: names[0].to_string(),
            })
    }
}
