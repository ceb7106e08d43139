//! Configuration types for AlertEngine

use crate::error::{Result, SdkError};
use serde::{Deserialize, Serialize};

pub use clinalert_runtime::InactiveAlertPolicy;

/// Default log filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "clinalert_sdk=info,clinalert_runtime=info,clinalert_parser=warn";

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether deactivated alerts take part in evaluation
    pub inactive_alerts: InactiveAlertPolicy,

    /// Record identifier field; resolved from the source's label pattern
    /// when unset
    pub identifier_field: Option<String>,

    /// Evaluate records in parallel (needs the `parallel` feature)
    pub parallel: bool,

    /// Log filter used by [`crate::logging::init_tracing`]
    pub log_filter: String,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            inactive_alerts: InactiveAlertPolicy::Skip,
            identifier_field: None,
            parallel: false,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }

    /// Decode a configuration from YAML; missing keys take their defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| SdkError::ConfigError(e.to_string()))
    }

    /// Decode a configuration from JSON; missing keys take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SdkError::ConfigError(e.to_string()))
    }

    /// Set the inactive alert policy
    pub fn with_inactive_alerts(mut self, policy: InactiveAlertPolicy) -> Self {
        self.inactive_alerts = policy;
        self
    }

    /// Set the record identifier field explicitly
    pub fn with_identifier_field(mut self, field: impl Into<String>) -> Self {
        self.identifier_field = Some(field.into());
        self
    }

    /// Enable parallel evaluation
    pub fn enable_parallel(mut self, enable: bool) -> Self {
        self.parallel = enable;
        self
    }

    /// Set the log filter
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.inactive_alerts, InactiveAlertPolicy::Skip);
        assert!(config.identifier_field.is_none());
        assert!(!config.parallel);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_builder_setters() {
        let config = EngineConfig::new()
            .with_inactive_alerts(InactiveAlertPolicy::Evaluate)
            .with_identifier_field("record_id")
            .enable_parallel(true)
            .with_log_filter("debug");

        assert_eq!(config.inactive_alerts, InactiveAlertPolicy::Evaluate);
        assert_eq!(config.identifier_field.as_deref(), Some("record_id"));
        assert!(config.parallel);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = EngineConfig::from_yaml_str("inactive_alerts: evaluate\nparallel: true\n").unwrap();

        assert_eq!(config.inactive_alerts, InactiveAlertPolicy::Evaluate);
        assert!(config.parallel);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_from_json() {
        let config = EngineConfig::from_json_str(r#"{"identifier_field": "subject_id"}"#).unwrap();
        assert_eq!(config.identifier_field.as_deref(), Some("subject_id"));
        assert_eq!(config.inactive_alerts, InactiveAlertPolicy::Skip);
    }

    #[test]
    fn test_invalid_policy() {
        let err = EngineConfig::from_yaml_str("inactive_alerts: sometimes").unwrap_err();
        assert!(matches!(err, SdkError::ConfigError(_)));
    }
}
