//! Domain models for the CI telemetry loader.

pub mod defect;
pub mod ingest_summary;
pub mod raw_job;
pub mod test_result;

// Re-export commonly used types
pub use defect::TrackedDefect;
pub use ingest_summary::{DefectMergeReport, IngestSummary, JobFailure, JobIngestReport, RunFailure};
pub use raw_job::{
    InstallStatus, RawJobResult, RawJobResults, RawJobRunResult, RawTestResult, UpgradeHistory,
};
pub use test_result::TestStatus;
