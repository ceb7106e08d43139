//! Alert definitions
//!
//! An [`Alert`] is one rule-table row compiled into per-variable conditions.
//! Alerts are immutable once built; an [`AlertSet`] collects them for one
//! evaluation session and only grows.

use super::condition::{ConditionMap, ConditionSpec};
use serde::{Deserialize, Serialize};

/// A named alert rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    title: String,
    conditions: ConditionMap,
    active: bool,
}

impl Alert {
    pub fn new(title: impl Into<String>, conditions: ConditionMap, active: bool) -> Self {
        Self {
            title: title.into(),
            conditions,
            active,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Per-variable conditions
    pub fn conditions(&self) -> &ConditionMap {
        &self.conditions
    }

    /// Condition for one variable key
    pub fn condition(&self, variable: &str) -> Option<&ConditionSpec> {
        self.conditions.get(variable)
    }

    /// Variable keys referenced by this alert
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.conditions.keys().map(String::as_str)
    }

    /// Returns true if the alert is active
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Returns true if no condition could be compiled from the rule text
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Ordered, append-only collection of alerts for one session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertSet {
    alerts: Vec<Alert>,
}

impl AlertSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an alert
    pub fn register(&mut self, alert: Alert) {
        log::debug!(
            "Registering alert '{}' ({} variables, active={})",
            alert.title(),
            alert.conditions().len(),
            alert.is_active()
        );
        self.alerts.push(alert);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Alert> {
        self.alerts.iter()
    }

    /// Active alerts only
    pub fn active(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| a.is_active())
    }

    /// All alerts with the given title
    pub fn alerts_by_title(&self, title: &str) -> Vec<&Alert> {
        self.alerts.iter().filter(|a| a.title() == title).collect()
    }

    /// All alerts holding a condition for the given variable
    pub fn alerts_by_variable(&self, variable: &str) -> Vec<&Alert> {
        self.alerts
            .iter()
            .filter(|a| a.condition(variable).is_some())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}

impl<'a> IntoIterator for &'a AlertSet {
    type Item = &'a Alert;
    type IntoIter = std::slice::Iter<'a, Alert>;

    fn into_iter(self) -> Self::IntoIter {
        self.alerts.iter()
    }
}

impl FromIterator<Alert> for AlertSet {
    fn from_iter<I: IntoIterator<Item = Alert>>(iter: I) -> Self {
        let mut set = AlertSet::new();
        for alert in iter {
            set.register(alert);
        }
        set
    }
}
