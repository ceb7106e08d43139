//! Deviation evaluation
//!
//! Applies every alert condition to every record. A condition is a
//! disjunction of AND-groups; each group that holds marks its variables as
//! deviating for the record:
//!
//! - the variable(s) owning the condition
//! - both sides of any absolute-difference test in the group
//!
//! Missing values fail every test. Values that do not coerce to the
//! literal's type fail `Compare` and `AbsDifference` tests. The only error
//! raised here is an unresolvable identifier pattern.

use crate::error::Result;
use crate::identifier::require_identifier_field;
use crate::result::{DetailedReport, DeviationReport, VariableDeviation};
use clinalert_core::ast::{Alert, AlertSet, AtomicTest, Literal, PAIR_SEPARATOR};
use clinalert_core::Record;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How alerts flagged as deactivated are treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InactiveAlertPolicy {
    /// Only active alerts are evaluated
    #[default]
    Skip,
    /// Every registered alert is evaluated
    Evaluate,
}

/// Why a variable was marked
enum Cause<'a> {
    /// A group of the variable's condition held; carries the reference
    /// interval when that group tests a bound
    Condition(Option<&'a str>),
    /// The variable is the partner side of an absolute-difference test
    Paired(&'a AtomicTest),
}

struct Hit<'a> {
    variable: &'a str,
    alert: &'a Alert,
    cause: Cause<'a>,
}

/// Deviation evaluator
///
/// Holds only its policy; the alert set and records are borrowed per call.
#[derive(Debug, Clone, Default)]
pub struct DeviationEvaluator {
    policy: InactiveAlertPolicy,
}

impl DeviationEvaluator {
    /// Create an evaluator that skips inactive alerts
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: InactiveAlertPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> InactiveAlertPolicy {
        self.policy
    }

    /// Evaluate records against the alert set.
    ///
    /// Records whose identifier field is missing are skipped.
    pub fn evaluate<'r>(
        &self,
        alerts: &AlertSet,
        records: impl IntoIterator<Item = &'r Record>,
        identifier_field: &str,
    ) -> DeviationReport {
        let mut report = DeviationReport::new();
        let mut evaluated = 0usize;

        for record in records {
            evaluated += 1;
            if let Some((record_id, variables)) = self.evaluate_one(alerts, record, identifier_field)
            {
                report.insert(record_id, variables);
            }
        }

        tracing::info!(
            "Evaluated {} record(s): {} with deviations",
            evaluated,
            report.len()
        );
        report
    }

    /// Resolve the identifier field from a label pattern, then evaluate
    pub fn evaluate_with_label_pattern<'r>(
        &self,
        alerts: &AlertSet,
        records: impl IntoIterator<Item = &'r Record>,
        label_pattern: &str,
    ) -> Result<DeviationReport> {
        let identifier_field = require_identifier_field(label_pattern)?;
        Ok(self.evaluate(alerts, records, &identifier_field))
    }

    /// Evaluate records in parallel; the result equals [`Self::evaluate`]
    #[cfg(feature = "parallel")]
    pub fn evaluate_parallel(
        &self,
        alerts: &AlertSet,
        records: &[Record],
        identifier_field: &str,
    ) -> DeviationReport {
        use rayon::prelude::*;

        let rows: Vec<(String, BTreeSet<String>)> = records
            .par_iter()
            .filter_map(|record| self.evaluate_one(alerts, record, identifier_field))
            .collect();

        let mut report = DeviationReport::new();
        for (record_id, variables) in rows {
            report.insert(record_id, variables);
        }

        tracing::info!(
            "Evaluated {} record(s) in parallel: {} with deviations",
            records.len(),
            report.len()
        );
        report
    }

    /// Evaluate records, keeping values, intervals and alert titles
    pub fn evaluate_detailed<'r>(
        &self,
        alerts: &AlertSet,
        records: impl IntoIterator<Item = &'r Record>,
        identifier_field: &str,
    ) -> DetailedReport {
        let mut report = DetailedReport::new();

        for record in records {
            let Some(record_id) = Self::record_id(record, identifier_field) else {
                continue;
            };

            let mut deviations: BTreeMap<String, VariableDeviation> = BTreeMap::new();
            self.for_each_hit(alerts, record, |hit| {
                let interval = match hit.cause {
                    Cause::Condition(interval) => interval.map(str::to_string),
                    Cause::Paired(test) => Some(test.to_string()),
                };
                deviations
                    .entry(hit.variable.to_string())
                    .or_insert_with(|| VariableDeviation::new(record.get(hit.variable).clone()))
                    .add_hit(hit.alert.title(), interval.as_deref());
            });

            report.insert(record_id, deviations);
        }

        report
    }

    /// Variables of one record that deviate under the alert set
    pub fn deviating_variables(&self, alerts: &AlertSet, record: &Record) -> BTreeSet<String> {
        let mut variables = BTreeSet::new();
        self.for_each_hit(alerts, record, |hit| {
            variables.insert(hit.variable.to_string());
        });
        variables
    }

    fn evaluate_one(
        &self,
        alerts: &AlertSet,
        record: &Record,
        identifier_field: &str,
    ) -> Option<(String, BTreeSet<String>)> {
        let record_id = Self::record_id(record, identifier_field)?;
        let variables = self.deviating_variables(alerts, record);
        if variables.is_empty() {
            return None;
        }

        tracing::debug!(
            "Record {} deviates on {} variable(s): {:?}",
            record_id,
            variables.len(),
            variables
        );
        Some((record_id, variables))
    }

    fn record_id(record: &Record, identifier_field: &str) -> Option<String> {
        let id = record.get(identifier_field).as_text().map(|id| id.into_owned());
        if id.is_none() {
            tracing::warn!(
                "Skipping record without a value for identifier field '{}'",
                identifier_field
            );
        }
        id
    }

    fn alerts<'a>(&self, alerts: &'a AlertSet) -> impl Iterator<Item = &'a Alert> {
        let policy = self.policy;
        alerts
            .iter()
            .filter(move |alert| policy == InactiveAlertPolicy::Evaluate || alert.is_active())
    }

    fn for_each_hit<'a>(
        &self,
        alerts: &'a AlertSet,
        record: &Record,
        mut on_hit: impl FnMut(Hit<'a>),
    ) {
        for alert in self.alerts(alerts) {
            for (key, spec) in alert.conditions() {
                for group in &spec.groups {
                    let tests: Vec<&AtomicTest> =
                        group.iter().filter_map(|&i| spec.tests.get(i)).collect();
                    if tests.is_empty() || !tests.iter().all(|test| Self::check(test, key, record)) {
                        continue;
                    }

                    let bounded = tests.iter().any(
                        |test| matches!(test, AtomicTest::Compare { op, .. } if op.is_bound()),
                    );
                    let interval = if bounded {
                        spec.reference_interval.as_deref()
                    } else {
                        None
                    };
                    for variable in key.split(PAIR_SEPARATOR).map(str::trim) {
                        on_hit(Hit {
                            variable,
                            alert,
                            cause: Cause::Condition(interval),
                        });
                    }
                    for test in tests {
                        if let AtomicTest::AbsDifference { left, right, .. } = test {
                            for variable in [left.as_str(), right.as_str()] {
                                on_hit(Hit {
                                    variable,
                                    alert,
                                    cause: Cause::Paired(test),
                                });
                            }
                        }
                    }
                }
            }
        }
    }

    /// Evaluate one atomic test for the variable owning it
    fn check(test: &AtomicTest, variable: &str, record: &Record) -> bool {
        match test {
            AtomicTest::NotEmpty => !record.is_missing(variable),
            AtomicTest::Compare { op, literal } => {
                let value = record.get(variable);
                match literal {
                    Literal::Number(n) => value
                        .as_number()
                        .is_some_and(|v| op.compare_numbers(v, n.value())),
                    Literal::Text(s) => value
                        .as_text()
                        .is_some_and(|v| op.compare_text(&v, s).unwrap_or(false)),
                }
            }
            AtomicTest::AbsDifference {
                left,
                right,
                threshold,
            } => match (record.number(left), record.number(right)) {
                (Some(l), Some(r)) => (l - r).abs() > threshold.value(),
                _ => false,
            },
        }
    }
}
