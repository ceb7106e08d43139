//! Common test utilities for SDK integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use clinalert_sdk::{ProjectSource, Record};

/// Rule table in the layout exported by study alert configurations
pub const RULE_TABLE_YAML: &str = r#"
alerts:
  - alert-title: Hematology
    alert-condition: '([wbc_109l] <> "" and ([wbc_109l] < 3.5 or [wbc_109l] > 12)) or ([plt_109l] <> "" and ([plt_109l] < 145 or [plt_109l] > 387))'
    alert-deactivated: N
  - alert-title: Blood pressure
    alert-condition: '([bp_right_sys] <> "" and ([bp_right_sys] < 80 or [bp_right_sys] > 180)) or (abs([bp_right_sys] - [bp_left_sys]) > 20)'
    alert-deactivated: N
  - alert-title: Retired CMR alert
    alert-condition: '[cmr_notification] = 1'
    alert-deactivated: Y
"#;

/// Helper to create a record from key-value pairs
#[macro_export]
macro_rules! record {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut record = clinalert_sdk::Record::new();
        $(
            record.insert($key, $value);
        )*
        record
    }};
}

/// Source whose calls always fail, as an unreachable server would
pub struct FailingSource;

#[async_trait]
impl ProjectSource for FailingSource {
    async fn record_label_pattern(&self) -> anyhow::Result<String> {
        anyhow::bail!("project metadata unavailable")
    }

    async fn export_records(&self) -> anyhow::Result<Vec<Record>> {
        anyhow::bail!("record export unavailable")
    }
}
