//! Ingestion pass over a batch of raw job results.
//!
//! Phase one makes sure every job of the batch exists; phase two reconciles
//! the runs of each job. Both phases fan out over jobs with a bounded number
//! of workers, while the runs of a single job are handled sequentially.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::db::DbPool;
use crate::db::test_jobs::JobAttributes;
use crate::error::AppResult;
use crate::models::{IngestSummary, JobFailure, RawJobResult, RawJobResults};

use super::identity_cache::{JobCache, TestCache, load_job_cache, load_test_cache};
use super::reconciler::JobRunReconciler;
use super::suite_resolver::SuiteResolver;
use super::upsert::UpsertService;
use super::variants::VariantManager;

/// Per-pass settings.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Reporting-release label stamped on every job
    pub release: String,
    /// Jobs processed concurrently, at least one
    pub workers: usize,
}

impl IngestOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            release: config.release.clone(),
            workers: config.ingest_workers,
        }
    }
}

/// Result of one pass. The caches are handed on to the defect merge.
pub struct IngestRun {
    pub summary: IngestSummary,
    pub jobs: Arc<JobCache>,
    pub tests: Arc<TestCache>,
}

/// Merge results that share a job name, keeping first-seen order. Runs are
/// concatenated in input order; the first non-empty test grid URL wins.
pub fn coalesce_jobs(jobs: Vec<RawJobResult>) -> Vec<RawJobResult> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<RawJobResult> = Vec::with_capacity(jobs.len());

    for job in jobs {
        match index.get(&job.job_name) {
            Some(&i) => {
                let target = &mut merged[i];
                if target.test_grid_job_url.is_empty() {
                    target.test_grid_job_url = job.test_grid_job_url;
                }
                target.job_run_results.extend(job.job_run_results);
            }
            None => {
                index.insert(job.job_name.clone(), merged.len());
                merged.push(job);
            }
        }
    }

    merged
}

pub struct IngestPipeline {
    pool: DbPool,
    variants: Arc<dyn VariantManager>,
    options: IngestOptions,
}

impl IngestPipeline {
    pub fn new(pool: DbPool, variants: Arc<dyn VariantManager>, options: IngestOptions) -> Self {
        Self {
            pool,
            variants,
            options,
        }
    }

    /// Ingest a whole batch.
    ///
    /// Only failures to load the identity caches or suites are returned as
    /// `Err`; job and run failures are collected in the summary.
    pub async fn run(&self, batch: RawJobResults) -> AppResult<IngestRun> {
        debug!("Batch carries {} test results", batch.test_result_count());

        let raw_jobs = coalesce_jobs(batch.jobs);
        let workers = self.options.workers;

        let jobs = Arc::new(load_job_cache(&self.pool).await?);
        let tests = Arc::new(load_test_cache(&self.pool).await?);
        let suites = SuiteResolver::load(&self.pool).await?;
        info!(
            "Starting ingestion of {} jobs ({} jobs, {} tests, {} suites known)",
            raw_jobs.len(),
            jobs.len(),
            tests.len(),
            suites.len()
        );

        let upserts = UpsertService::new(self.pool.clone(), jobs.clone(), tests.clone());
        let mut summary = IngestSummary {
            jobs_total: raw_jobs.len(),
            ..Default::default()
        };

        let upserts_ref = &upserts;
        let mut ensured: Vec<_> = stream::iter(raw_jobs.iter().enumerate())
            .map(|(i, raw)| {
                let attrs = JobAttributes {
                    release: self.options.release.clone(),
                    variants: self.variants.identify_variants(&raw.job_name),
                    test_grid_url: raw.test_grid_job_url.clone(),
                };
                async move { (i, raw, upserts_ref.ensure_job(&raw.job_name, &attrs).await) }
            })
            .buffer_unordered(workers)
            .collect()
            .await;
        ensured.sort_by_key(|(i, _, _)| *i);

        let mut ready = Vec::with_capacity(ensured.len());
        for (_, raw, result) in ensured {
            match result {
                Ok(job) => ready.push((job, raw)),
                Err(e) => {
                    error!(job = %raw.job_name, "Failed to create job: {}", e);
                    summary.jobs_failed.push(JobFailure {
                        job_name: raw.job_name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let reconciler = JobRunReconciler::new(&self.pool, &upserts, &suites);
        let reconciler = &reconciler;
        let total = ready.len();
        let reports: Vec<_> = stream::iter(ready.iter().enumerate())
            .map(|(i, (job, raw))| {
                let status = format!("{}/{}", i + 1, total);
                async move { (raw, reconciler.reconcile_job(job, raw, &status).await) }
            })
            .buffer_unordered(workers)
            .collect()
            .await;

        for (raw, result) in reports {
            match result {
                Ok(report) => summary.absorb(report),
                Err(e) => {
                    error!(job = %raw.job_name, "Failed to ingest job runs: {}", e);
                    summary.jobs_failed.push(JobFailure {
                        job_name: raw.job_name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        summary.tests_created = upserts.tests_created();
        info!(
            "Ingestion finished: {} jobs ({} failed), {} runs created, {} known runs skipped, \
             {} malformed, {} runs failed, {} new tests",
            summary.jobs_total,
            summary.jobs_failed.len(),
            summary.runs_created,
            summary.runs_skipped_known,
            summary.runs_malformed,
            summary.runs_failed.len(),
            summary.tests_created
        );

        Ok(IngestRun {
            summary,
            jobs,
            tests,
        })
    }
}
