//! AlertEngine - compiled alerts ready for evaluation
//!
//! The engine is created by [`AlertEngineBuilder`](crate::AlertEngineBuilder)
//! once every rule row has been compiled and registered. From then on the
//! alert set is shared read-only behind an `Arc`, so one engine can serve
//! concurrent evaluations.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::source::ProjectSource;
use clinalert_core::ast::AlertSet;
use clinalert_core::Record;
use clinalert_parser::ParseError;
use clinalert_runtime::{require_identifier_field, DetailedReport, DeviationEvaluator, DeviationReport};
use std::sync::Arc;

/// A compile diagnostic for one rule row
#[derive(Debug)]
pub struct RuleWarning {
    /// Title of the alert the row produced
    pub alert: String,
    pub error: ParseError,
}

/// Alert engine
#[derive(Debug, Clone)]
pub struct AlertEngine {
    alerts: Arc<AlertSet>,
    warnings: Arc<Vec<RuleWarning>>,
    evaluator: DeviationEvaluator,
    config: EngineConfig,
}

impl AlertEngine {
    pub(crate) fn new(alerts: AlertSet, warnings: Vec<RuleWarning>, config: EngineConfig) -> Self {
        tracing::info!(
            "Alert engine ready: {} alert(s), {} active, {} compile warning(s)",
            alerts.len(),
            alerts.active().count(),
            warnings.len()
        );

        Self {
            alerts: Arc::new(alerts),
            warnings: Arc::new(warnings),
            evaluator: DeviationEvaluator::with_policy(config.inactive_alerts),
            config,
        }
    }

    /// Registered alerts
    pub fn alerts(&self) -> &AlertSet {
        &self.alerts
    }

    /// Shared handle to the registered alerts
    pub fn shared_alerts(&self) -> Arc<AlertSet> {
        Arc::clone(&self.alerts)
    }

    /// Diagnostics collected while compiling rule rows
    pub fn warnings(&self) -> &[RuleWarning] {
        &self.warnings
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Identifier field to use: the configured one, else the field named by
    /// the label pattern
    pub fn resolve_identifier(&self, label_pattern: &str) -> Result<String> {
        match &self.config.identifier_field {
            Some(field) => Ok(field.clone()),
            None => Ok(require_identifier_field(label_pattern)?),
        }
    }

    /// Evaluate materialized records
    pub fn evaluate(&self, records: &[Record], identifier_field: &str) -> DeviationReport {
        self.evaluate_records(records, identifier_field)
    }

    /// Evaluate materialized records with values and intervals
    pub fn evaluate_detailed(&self, records: &[Record], identifier_field: &str) -> DetailedReport {
        self.evaluator
            .evaluate_detailed(&self.alerts, records, identifier_field)
    }

    /// Fetch records from a project source and evaluate them
    pub async fn run(&self, source: &dyn ProjectSource) -> Result<DeviationReport> {
        let (records, identifier_field) = self.fetch(source).await?;
        Ok(self.evaluate_records(&records, &identifier_field))
    }

    /// Like [`Self::run`], returning the detailed report
    pub async fn run_detailed(&self, source: &dyn ProjectSource) -> Result<DetailedReport> {
        let (records, identifier_field) = self.fetch(source).await?;
        Ok(self.evaluate_detailed(&records, &identifier_field))
    }

    async fn fetch(&self, source: &dyn ProjectSource) -> Result<(Vec<Record>, String)> {
        let identifier_field = match &self.config.identifier_field {
            Some(field) => field.clone(),
            None => {
                let pattern = source.record_label_pattern().await?;
                self.resolve_identifier(&pattern)?
            }
        };

        let records = source.export_records().await?;
        tracing::debug!(
            "Fetched {} record(s), identifier field '{}'",
            records.len(),
            identifier_field
        );
        Ok((records, identifier_field))
    }

    #[cfg(feature = "parallel")]
    fn evaluate_records(&self, records: &[Record], identifier_field: &str) -> DeviationReport {
        if self.config.parallel {
            self.evaluator
                .evaluate_parallel(&self.alerts, records, identifier_field)
        } else {
            self.evaluator.evaluate(&self.alerts, records, identifier_field)
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_records(&self, records: &[Record], identifier_field: &str) -> DeviationReport {
        if self.config.parallel {
            tracing::warn!("Parallel evaluation requested but the `parallel` feature is disabled");
        }
        self.evaluator.evaluate(&self.alerts, records, identifier_field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AlertEngineBuilder;

    #[test]
    fn test_configured_identifier_wins() {
        let engine = AlertEngineBuilder::new()
            .with_identifier_field("subject")
            .build()
            .unwrap();

        assert_eq!(engine.resolve_identifier("Study [record_id]").unwrap(), "subject");
    }

    #[test]
    fn test_identifier_from_pattern() {
        let engine = AlertEngineBuilder::new().build().unwrap();

        assert_eq!(engine.resolve_identifier("Study [record_id]").unwrap(), "record_id");
        assert!(engine.resolve_identifier("Study").is_err());
    }

    #[test]
    fn test_clones_share_alerts() {
        let engine = AlertEngineBuilder::new()
            .add_rule("CMR", "[cmr_notification] = 1", "N")
            .build()
            .unwrap();
        let clone = engine.clone();

        assert!(Arc::ptr_eq(&engine.shared_alerts(), &clone.shared_alerts()));
    }
}
