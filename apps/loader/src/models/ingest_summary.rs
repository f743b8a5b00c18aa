//! Outcome reports of an ingestion pass and a defect merge.

use serde::Serialize;

/// A job whose identity upsert or run preparation failed.
#[derive(Debug, Clone, Serialize)]
pub struct JobFailure {
    pub job_name: String,
    pub error: String,
}

/// A run that could not be persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RunFailure {
    pub job_name: String,
    pub run_id: i64,
    pub error: String,
}

/// Per-batch ingestion counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestSummary {
    pub jobs_total: usize,
    pub jobs_failed: Vec<JobFailure>,
    pub runs_created: usize,
    pub runs_skipped_known: usize,
    pub runs_malformed: usize,
    pub runs_failed: Vec<RunFailure>,
    pub tests_created: usize,
}

impl IngestSummary {
    /// True when nothing failed; skipped known runs do not count as failures.
    pub fn is_clean(&self) -> bool {
        self.jobs_failed.is_empty() && self.runs_failed.is_empty() && self.runs_malformed == 0
    }

    /// Fold the counters of one job into the batch summary.
    pub fn absorb(&mut self, job: JobIngestReport) {
        self.runs_created += job.runs_created;
        self.runs_skipped_known += job.runs_skipped_known;
        self.runs_malformed += job.runs_malformed;
        self.runs_failed.extend(job.runs_failed);
    }
}

/// Counters of one job's run ingestion.
#[derive(Debug, Clone, Default)]
pub struct JobIngestReport {
    pub runs_created: usize,
    pub runs_skipped_known: usize,
    pub runs_malformed: usize,
    pub runs_failed: Vec<RunFailure>,
}

/// Counters of one defect merge pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DefectMergeReport {
    pub defects_upserted: usize,
    pub test_links_added: usize,
    pub test_links_removed: usize,
    pub job_links_added: usize,
    pub job_links_removed: usize,
    /// Warnings from partial tracker failures
    pub degraded: Vec<String>,
}
