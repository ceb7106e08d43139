//! Builder pattern for AlertEngine

use crate::config::{EngineConfig, InactiveAlertPolicy};
use crate::engine::{AlertEngine, RuleWarning};
use crate::error::Result;
use clinalert_core::ast::AlertSet;
use clinalert_parser::{AlertParser, RuleRow, RuleTable};

/// Rule rows waiting to be compiled
enum RuleSource {
    Row(RuleRow),
    Yaml(String),
    Json(String),
}

/// Builder for AlertEngine
///
/// # Example
///
/// ```rust,ignore
/// use clinalert_sdk::AlertEngineBuilder;
///
/// let engine = AlertEngineBuilder::new()
///     .add_rule("Lab", r#"([wbc] <> "" and ([wbc] < 3.5 or [wbc] > 12))"#, "N")
///     .add_rule_table_yaml(rule_table_yaml)
///     .enable_parallel(true)
///     .build()?;
///
/// let report = engine.run(&project).await?;
/// ```
pub struct AlertEngineBuilder {
    config: EngineConfig,
    sources: Vec<RuleSource>,
}

impl AlertEngineBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            config: EngineConfig::new(),
            sources: Vec::new(),
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    // ========== Rules ==========

    /// Add one rule from raw row cells
    pub fn add_rule(
        mut self,
        title: impl Into<String>,
        condition: impl Into<String>,
        deactivated: &str,
    ) -> Self {
        self.sources
            .push(RuleSource::Row(RuleRow::new(title, condition, deactivated)));
        self
    }

    /// Add decoded rule rows
    pub fn add_rows(mut self, rows: impl IntoIterator<Item = RuleRow>) -> Self {
        self.sources.extend(rows.into_iter().map(RuleSource::Row));
        self
    }

    /// Add a rule table in YAML; decoded at build time
    pub fn add_rule_table_yaml(mut self, content: impl Into<String>) -> Self {
        self.sources.push(RuleSource::Yaml(content.into()));
        self
    }

    /// Add a rule table in JSON; decoded at build time
    pub fn add_rule_table_json(mut self, content: impl Into<String>) -> Self {
        self.sources.push(RuleSource::Json(content.into()));
        self
    }

    // ========== Evaluation ==========

    /// Set the inactive alert policy
    pub fn with_inactive_alerts(mut self, policy: InactiveAlertPolicy) -> Self {
        self.config.inactive_alerts = policy;
        self
    }

    /// Use a fixed record identifier field instead of the label pattern
    pub fn with_identifier_field(mut self, field: impl Into<String>) -> Self {
        self.config.identifier_field = Some(field.into());
        self
    }

    /// Enable parallel evaluation
    pub fn enable_parallel(mut self, enable: bool) -> Self {
        self.config.parallel = enable;
        self
    }

    /// Compile every rule row, register the alerts and freeze the set
    pub fn build(self) -> Result<AlertEngine> {
        let mut rows = Vec::new();
        for source in self.sources {
            match source {
                RuleSource::Row(row) => rows.push(row),
                RuleSource::Yaml(content) => rows.extend(RuleTable::from_yaml_str(&content)?),
                RuleSource::Json(content) => rows.extend(RuleTable::from_json_str(&content)?),
            }
        }

        let mut alerts = AlertSet::new();
        let mut warnings = Vec::new();
        for row in &rows {
            let (alert, errors) = AlertParser::compile_row(row);
            warnings.extend(errors.into_iter().map(|error| RuleWarning {
                alert: row.title.clone(),
                error,
            }));
            alerts.register(alert);
        }

        Ok(AlertEngine::new(alerts, warnings, self.config))
    }
}

impl Default for AlertEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
