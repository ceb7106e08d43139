//! Alert builder
//!
//! Turns rule-table rows into [`Alert`]s and registers them with an
//! [`AlertSet`].
//!
//! Paired keys produced by absolute-difference tests (`"a,b"`) are fanned out
//! so that `a` and `b` each carry the shared condition. A variable that
//! already has a condition of its own gets the paired clause appended with
//! `OR`; otherwise it receives a copy whose reference interval is the abs
//! condition text. The synthetic pair key itself is not kept in the alert.

use crate::condition_parser::ConditionParser;
use crate::error::ParseError;
use crate::interval::ReferenceInterval;
use crate::rule_table::{is_deactivated, RuleRow};
use clinalert_core::ast::{Alert, AlertSet, ConditionMap, ConditionSpec};

/// Alert builder
pub struct AlertParser;

impl AlertParser {
    /// Build one alert from raw row cells
    pub fn build(title: &str, condition: &str, deactivated: &str) -> Alert {
        let row = RuleRow {
            title: title.to_string(),
            condition: condition.to_string(),
            deactivated: is_deactivated(deactivated),
        };
        Self::compile_row(&row).0
    }

    /// Build one alert from a row, keeping the compile diagnostics
    pub fn compile_row(row: &RuleRow) -> (Alert, Vec<ParseError>) {
        let compiled = ConditionParser::compile(&row.condition);

        if !compiled.is_clean() {
            log::warn!(
                "Alert '{}': {} condition fragment(s) could not be compiled",
                row.title,
                compiled.warnings.len()
            );
        }
        if compiled.conditions.is_empty() {
            log::warn!("Alert '{}' has no recognizable condition", row.title);
        }

        let conditions = Self::fan_out(compiled.conditions);
        let alert = Alert::new(row.title.clone(), conditions, row.is_active());
        (alert, compiled.warnings)
    }

    /// Build alerts for all rows, registering each with `set`.
    ///
    /// Returns the built alerts in row order.
    pub fn build_all(rows: &[RuleRow], set: &mut AlertSet) -> Vec<Alert> {
        let alerts: Vec<Alert> = rows
            .iter()
            .map(|row| Self::compile_row(row).0)
            .collect();

        for alert in &alerts {
            set.register(alert.clone());
        }

        log::info!("Built {} alert(s) from rule table", alerts.len());
        alerts
    }

    /// Distribute paired-key conditions onto their member variables
    pub fn fan_out(conditions: ConditionMap) -> ConditionMap {
        let mut paired = Vec::new();
        let mut result = ConditionMap::new();

        for (key, spec) in conditions {
            if spec.is_paired() {
                paired.push(spec);
            } else {
                result.insert(key, spec);
            }
        }

        for shared in &paired {
            let mut variables: Vec<&str> = shared.variables();
            variables.dedup();

            for &variable in &variables {
                let partners = variables.iter().filter(|&&v| v != variable);

                match result.get_mut(variable) {
                    Some(existing) => {
                        existing.merge(shared);
                        for partner in partners {
                            existing.add_partner(partner);
                        }
                    }
                    None => {
                        let mut spec = ConditionSpec {
                            key: variable.to_string(),
                            reference_interval: shared
                                .reference_interval
                                .clone()
                                .or_else(|| ReferenceInterval::for_condition(shared)),
                            ..shared.clone()
                        };
                        for partner in partners {
                            spec.add_partner(partner);
                        }
                        result.insert(variable.to_string(), spec);
                    }
                }
            }
        }

        result
    }
}
