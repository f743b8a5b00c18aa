//! Defect records as resolved by the external tracker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tracker record. Multi-valued fields keep the tracker's shape; only their
/// first value is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedDefect {
    pub id: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub target_release: Vec<String>,
    #[serde(default)]
    pub version: Vec<String>,
    #[serde(default)]
    pub component: Vec<String>,
    #[serde(default)]
    pub last_change_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub failure_count: i32,
    #[serde(default)]
    pub flake_count: i32,
}

impl TrackedDefect {
    pub fn first_target_release(&self) -> Option<String> {
        self.target_release.first().cloned()
    }

    pub fn first_version(&self) -> Option<String> {
        self.version.first().cloned()
    }

    pub fn first_component(&self) -> Option<String> {
        self.component.first().cloned()
    }
}
