//! Defect resolution through an external tracker.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::error::AppResult;
use crate::models::TrackedDefect;

/// Result of a tracker lookup. A partial failure keeps what resolved and
/// carries the error alongside.
#[derive(Debug, Clone, Default)]
pub struct DefectLookup {
    /// Name -> defects applying to it
    pub defects: HashMap<String, Vec<TrackedDefect>>,
    pub error: Option<String>,
}

/// Resolves open defects for tests and blocking defects for jobs.
#[async_trait]
pub trait DefectTracker: Send + Sync {
    async fn defects_for_tests(&self, test_names: &[String]) -> DefectLookup;

    async fn blockers_for_jobs(&self, job_names: &[String]) -> DefectLookup;
}

/// On-disk shape of a resolved defect mapping.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefectMapping {
    #[serde(default)]
    pub tests: HashMap<String, Vec<TrackedDefect>>,
    #[serde(default)]
    pub jobs: HashMap<String, Vec<TrackedDefect>>,
}

/// Tracker answering from a pre-resolved mapping.
///
/// Names absent from the mapping simply have no defects; names in the mapping
/// that were not asked about are not returned.
#[derive(Debug, Clone, Default)]
pub struct StaticDefectTracker {
    mapping: DefectMapping,
}

impl StaticDefectTracker {
    pub fn new(mapping: DefectMapping) -> Self {
        Self { mapping }
    }

    /// A tracker that knows no defects.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read a mapping document from disk.
    pub async fn from_path(path: &Path) -> AppResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let mapping: DefectMapping = serde_json::from_str(&content)?;
        info!(
            "Loaded defect mapping from {:?} ({} tests, {} jobs)",
            path,
            mapping.tests.len(),
            mapping.jobs.len()
        );
        Ok(Self::new(mapping))
    }
}

fn select(source: &HashMap<String, Vec<TrackedDefect>>, names: &[String]) -> DefectLookup {
    let defects = names
        .iter()
        .filter_map(|name| source.get(name).map(|d| (name.clone(), d.clone())))
        .collect();
    DefectLookup {
        defects,
        error: None,
    }
}

#[async_trait]
impl DefectTracker for StaticDefectTracker {
    async fn defects_for_tests(&self, test_names: &[String]) -> DefectLookup {
        select(&self.mapping.tests, test_names)
    }

    async fn blockers_for_jobs(&self, job_names: &[String]) -> DefectLookup {
        select(&self.mapping.jobs, job_names)
    }
}
