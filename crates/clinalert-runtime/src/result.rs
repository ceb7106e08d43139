//! Deviation report types

use clinalert_core::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Deviating variables per record identifier
///
/// Only records with at least one deviating variable appear.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviationReport {
    records: BTreeMap<String, BTreeSet<String>>,
}

impl DeviationReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Add deviating variables for a record.
    ///
    /// Empty sets are ignored; records sharing an identifier are merged.
    pub fn insert(&mut self, record_id: impl Into<String>, variables: BTreeSet<String>) {
        if variables.is_empty() {
            return;
        }
        self.records
            .entry(record_id.into())
            .or_default()
            .extend(variables);
    }

    /// Deviating variables of one record
    pub fn get(&self, record_id: &str) -> Option<&BTreeSet<String>> {
        self.records.get(record_id)
    }

    /// Returns true if the record has any deviation
    pub fn contains(&self, record_id: &str) -> bool {
        self.records.contains_key(record_id)
    }

    /// Returns true if `variable` deviates for the record
    pub fn is_deviating(&self, record_id: &str, variable: &str) -> bool {
        self.records
            .get(record_id)
            .is_some_and(|vars| vars.contains(variable))
    }

    pub fn record_ids(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of deviating records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One deviating variable of a record, with display context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeviation {
    /// Value found in the record
    pub value: Value,

    /// Reference intervals of the conditions that fired
    pub reference_intervals: Vec<String>,

    /// Titles of the alerts that fired
    pub alerts: Vec<String>,
}

impl VariableDeviation {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            reference_intervals: Vec::new(),
            alerts: Vec::new(),
        }
    }

    /// Record one firing condition (deduplicated)
    pub fn add_hit(&mut self, alert: &str, interval: Option<&str>) {
        if !self.alerts.iter().any(|a| a == alert) {
            self.alerts.push(alert.to_string());
        }
        if let Some(interval) = interval {
            if !self.reference_intervals.iter().any(|i| i == interval) {
                self.reference_intervals.push(interval.to_string());
            }
        }
    }
}

/// Deviations per record and variable, with values and intervals
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DetailedReport {
    records: BTreeMap<String, BTreeMap<String, VariableDeviation>>,
}

impl DetailedReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the deviations found for one record; empty maps are ignored
    pub fn insert(&mut self, record_id: impl Into<String>, deviations: BTreeMap<String, VariableDeviation>) {
        if deviations.is_empty() {
            return;
        }
        let entry = self.records.entry(record_id.into()).or_default();
        for (variable, deviation) in deviations {
            match entry.get_mut(&variable) {
                Some(existing) => {
                    for alert in &deviation.alerts {
                        existing.add_hit(alert, None);
                    }
                    for interval in &deviation.reference_intervals {
                        if !existing.reference_intervals.contains(interval) {
                            existing.reference_intervals.push(interval.clone());
                        }
                    }
                }
                None => {
                    entry.insert(variable, deviation);
                }
            }
        }
    }

    /// Deviations of one record
    pub fn get(&self, record_id: &str) -> Option<&BTreeMap<String, VariableDeviation>> {
        self.records.get(record_id)
    }

    /// Deviation of one variable in one record
    pub fn deviation(&self, record_id: &str, variable: &str) -> Option<&VariableDeviation> {
        self.records.get(record_id)?.get(variable)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, VariableDeviation>)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Collapse to the plain report
    pub fn to_summary(&self) -> DeviationReport {
        let mut report = DeviationReport::new();
        for (record_id, deviations) in &self.records {
            report.insert(record_id.clone(), deviations.keys().cloned().collect());
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_sets_are_dropped() {
        let mut report = DeviationReport::new();
        report.insert("1", BTreeSet::new());
        report.insert("2", vars(&["wbc"]));

        assert_eq!(report.len(), 1);
        assert!(!report.contains("1"));
        assert!(report.is_deviating("2", "wbc"));
    }

    #[test]
    fn test_same_identifier_merges() {
        let mut report = DeviationReport::new();
        report.insert("1", vars(&["wbc"]));
        report.insert("1", vars(&["plt", "wbc"]));

        assert_eq!(report.get("1"), Some(&vars(&["plt", "wbc"])));
    }

    #[test]
    fn test_report_serializes_as_map() {
        let mut report = DeviationReport::new();
        report.insert("P-01", vars(&["bp_r", "bp_l"]));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, serde_json::json!({"P-01": ["bp_l", "bp_r"]}));
    }

    #[test]
    fn test_detailed_summary_matches_keys() {
        let mut deviation = VariableDeviation::new(Value::Number(2.0));
        deviation.add_hit("Lab", Some("3.5 < x < 12"));
        deviation.add_hit("Lab", Some("3.5 < x < 12"));

        let mut detailed = DetailedReport::new();
        detailed.insert("7", BTreeMap::from([("wbc".to_string(), deviation)]));
        detailed.insert("8", BTreeMap::new());

        let entry = detailed.deviation("7", "wbc").unwrap();
        assert_eq!(entry.alerts, vec!["Lab".to_string()]);
        assert_eq!(entry.reference_intervals.len(), 1);
        assert_eq!(detailed.to_summary().get("7"), Some(&vars(&["wbc"])));
        assert_eq!(detailed.len(), 1);
    }
}
