//! Study record type
//!
//! A record is one exported row: a mapping from field name to [`Value`].
//! Looking up an absent field yields [`Value::Missing`], so absent keys and
//! empty cells behave the same way in every condition test.

use super::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

static MISSING: Value = Value::Missing;

/// A single exported study record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: HashMap<String, Value>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field (builder style)
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a field value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Get a field value; absent fields read as [`Value::Missing`]
    pub fn get(&self, name: &str) -> &Value {
        self.fields.get(name).unwrap_or(&MISSING)
    }

    /// Returns true if the field is absent or holds a missing value
    pub fn is_missing(&self, name: &str) -> bool {
        self.get(name).is_missing()
    }

    /// Numeric view of a field, if it coerces
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).as_number()
    }

    /// Returns true if the record has an entry for this field
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Iterate over all fields
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl From<HashMap<String, Value>> for Record {
    fn from(fields: HashMap<String, Value>) -> Self {
        Self { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_field_is_missing() {
        let record = Record::new().with_field("wbc_109l", 2.0);
        assert_eq!(record.get("plt_109l"), &Value::Missing);
        assert!(record.is_missing("plt_109l"));
        assert!(!record.contains("plt_109l"));
        assert!(!record.is_missing("wbc_109l"));
    }

    #[test]
    fn test_numeric_lookup() {
        let record = Record::new()
            .with_field("bp_right_sys", "130")
            .with_field("bp_left_sys", 100.0)
            .with_field("comment", "n/a");

        assert_eq!(record.number("bp_right_sys"), Some(130.0));
        assert_eq!(record.number("bp_left_sys"), Some(100.0));
        assert_eq!(record.number("comment"), None);
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn test_record_from_json() {
        let record: Record =
            serde_json::from_str(r#"{"record_id": "MD1003", "wbc_109l": 2.0, "hgb_gl": null}"#)
                .unwrap();

        assert_eq!(record.get("record_id"), &Value::string("MD1003"));
        assert_eq!(record.number("wbc_109l"), Some(2.0));
        assert!(record.contains("hgb_gl"));
        assert!(record.is_missing("hgb_gl"));
    }

    #[test]
    fn test_from_iterator() {
        let record: Record = vec![("a", 1.0), ("b", 2.0)].into_iter().collect();
        assert_eq!(record.number("b"), Some(2.0));
    }
}
