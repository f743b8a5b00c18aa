//! Raw job results as materialized from the upstream test grid.
//!
//! These are the input of one ingestion pass. They are plain serde documents;
//! fetching them is someone else's job.

use serde::{Deserialize, Serialize};

use super::TestStatus;

/// A batch of raw job results for one reporting window.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawJobResults {
    #[serde(default)]
    pub jobs: Vec<RawJobResult>,
}

impl RawJobResults {
    /// Total number of structured test results across all runs.
    pub fn test_result_count(&self) -> usize {
        self.jobs
            .iter()
            .flat_map(|j| j.job_run_results.iter())
            .map(|r| r.test_results.len())
            .sum()
    }
}

/// All runs of one job seen in the reporting window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawJobResult {
    pub job_name: String,
    #[serde(default)]
    pub test_grid_job_url: String,
    #[serde(default)]
    pub job_run_results: Vec<RawJobRunResult>,
}

/// One execution of a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawJobRunResult {
    pub job_run_url: String,
    /// Milliseconds since the epoch
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub failed: bool,
    #[serde(default)]
    pub succeeded: bool,
    #[serde(default)]
    pub test_failures: i32,
    #[serde(default)]
    pub overall_result: String,
    #[serde(default)]
    pub install_status: InstallStatus,
    /// Set upstream when every failure of the run is already explained
    #[serde(default)]
    pub known_failure: bool,
    #[serde(default)]
    pub test_results: Vec<RawTestResult>,
    /// Failed tests that are not part of `test_results`
    #[serde(default)]
    pub failed_test_names: Vec<String>,
    #[serde(default)]
    pub upgrades: Vec<UpgradeHistory>,
}

/// A single structured test result of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTestResult {
    pub name: String,
    pub status: TestStatus,
}

/// Upgrade edge reported for a set of runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeHistory {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub run_urls: Vec<String>,
}

/// Status of the install/setup probe of a run.
///
/// - `Success`: the setup test passed (or the whole job succeeded)
/// - `Failure` / `InfraFailure`: the setup test failed
/// - `Unknown`: the job has no setup test and did not succeed
/// - `Missing`: a setup test was expected but never reported
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum InstallStatus {
    Success,
    Failure,
    InfraFailure,
    Unknown,
    #[default]
    Missing,
    Other(String),
}

impl InstallStatus {
    /// Anything but a confirmed success or a known-absent probe counts as infra failure.
    pub fn is_infra_failure(&self) -> bool {
        !matches!(self, Self::Success | Self::Unknown)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "Success",
            Self::Failure => "Failure",
            Self::InfraFailure => "InfraFailure",
            Self::Unknown => "Unknown",
            Self::Missing => "",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for InstallStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Success" => Self::Success,
            "Failure" => Self::Failure,
            "InfraFailure" => Self::InfraFailure,
            "Unknown" => Self::Unknown,
            "" => Self::Missing,
            _ => Self::Other(s),
        }
    }
}

impl From<InstallStatus> for String {
    fn from(status: InstallStatus) -> Self {
        status.as_str().to_string()
    }
}
