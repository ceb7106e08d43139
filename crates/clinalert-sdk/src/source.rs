//! Project data source
//!
//! The engine reads study data through [`ProjectSource`]: the record label
//! pattern from project metadata and the exported records. Network clients
//! and file readers implement it outside this crate.

use async_trait::async_trait;
use clinalert_core::Record;

/// Capability interface for a study project
#[async_trait]
pub trait ProjectSource: Send + Sync {
    /// Label pattern naming the record identifier, e.g. `"Study [record_id]"`
    async fn record_label_pattern(&self) -> anyhow::Result<String>;

    /// All records of the project
    async fn export_records(&self) -> anyhow::Result<Vec<Record>>;
}

/// Source over already materialized data
#[derive(Debug, Clone, Default)]
pub struct StaticProjectSource {
    label_pattern: String,
    records: Vec<Record>,
}

impl StaticProjectSource {
    pub fn new(label_pattern: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            label_pattern: label_pattern.into(),
            records,
        }
    }

    /// Add a record
    pub fn with_record(mut self, record: Record) -> Self {
        self.records.push(record);
        self
    }
}

#[async_trait]
impl ProjectSource for StaticProjectSource {
    async fn record_label_pattern(&self) -> anyhow::Result<String> {
        Ok(self.label_pattern.clone())
    }

    async fn export_records(&self) -> anyhow::Result<Vec<Record>> {
        Ok(self.records.clone())
    }
}
