//! Job run reconciliation.
//!
//! For one job, every raw run goes `Unseen -> Classified -> Persisted`, or
//! `Unseen -> Skipped` when its id is already recorded or unusable. A run and
//! all of its test outcomes are written in one transaction.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::db::DbPool;
use crate::db::job_runs::{NewJobRun, NewJobRunTest};
use crate::entity::test_job;
use crate::error::{AppError, AppResult};
use crate::models::{
    JobIngestReport, RawJobResult, RawJobRunResult, RunFailure, TestStatus, UpgradeHistory,
};

use super::suite_resolver::SuiteResolver;
use super::upsert::UpsertService;

/// Extract the numeric run id from the last path segment of a run URL.
///
/// Query strings, fragments and trailing slashes are ignored. Zero and
/// anything that is not a positive 63-bit integer is rejected.
pub fn run_id_from_url(url: &str) -> Option<i64> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segment = path.trim_end_matches('/').rsplit('/').next()?;
    let id: u64 = segment.parse().ok()?;
    if id == 0 {
        return None;
    }
    i64::try_from(id).ok()
}

/// Convert an upstream millisecond timestamp to whole seconds.
pub fn run_timestamp(millis: u64) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(millis / 1000).ok()?;
    DateTime::from_timestamp(secs, 0)
}

/// Mark runs referenced by upgrade history. Entries that match no run built
/// in this pass are dropped.
pub fn apply_upgrade_history(runs: &mut [NewJobRun], history: &[UpgradeHistory]) {
    let index: HashMap<i64, usize> = runs.iter().enumerate().map(|(i, r)| (r.id, i)).collect();

    for upgrade in history {
        for url in &upgrade.run_urls {
            let Some(&i) = run_id_from_url(url).and_then(|id| index.get(&id)) else {
                continue;
            };
            let run = &mut runs[i];
            run.upgrade = true;
            run.upgrades_from = Some(upgrade.from.clone());
            run.upgrades_to = Some(upgrade.to.clone());
        }
    }
}

/// Ingests the runs of one job at a time.
pub struct JobRunReconciler<'a> {
    pool: &'a DbPool,
    upserts: &'a UpsertService,
    suites: &'a SuiteResolver,
}

impl<'a> JobRunReconciler<'a> {
    pub fn new(pool: &'a DbPool, upserts: &'a UpsertService, suites: &'a SuiteResolver) -> Self {
        Self {
            pool,
            upserts,
            suites,
        }
    }

    /// Record every not-yet-known run of `raw` under `job`.
    ///
    /// Returns `Err` only when the job cannot be processed at all (known run
    /// ids or a test identity could not be read or written). Individual run
    /// persistence failures are collected in the report instead.
    pub async fn reconcile_job(
        &self,
        job: &test_job::Model,
        raw: &RawJobResult,
        job_status: &str,
    ) -> AppResult<JobIngestReport> {
        let mut report = JobIngestReport::default();

        let mut known = self.pool.known_run_ids(job.id).await?;
        info!(
            job = %job.name,
            "Found {} known job runs for {}",
            known.len(),
            job.name
        );

        let mut pending = Vec::new();
        let mut upgrades = Vec::new();
        for run in &raw.job_run_results {
            let Some(run_id) = run_id_from_url(&run.job_run_url) else {
                warn!(
                    job = %job.name,
                    url = %run.job_run_url,
                    "Skipping job run with unparseable id"
                );
                report.runs_malformed += 1;
                continue;
            };

            if !known.insert(run_id) {
                report.runs_skipped_known += 1;
                continue;
            }

            match self.build_run(job, run_id, run).await {
                Ok(new_run) => pending.push(new_run),
                Err(AppError::MalformedInput(msg)) => {
                    warn!(job = %job.name, run_id, "Skipping job run: {}", msg);
                    report.runs_malformed += 1;
                    continue;
                }
                Err(e) => return Err(e),
            }
            upgrades.extend(run.upgrades.iter().cloned());
        }

        apply_upgrade_history(&mut pending, &upgrades);

        let total = pending.len();
        for (i, new_run) in pending.into_iter().enumerate() {
            let run_id = new_run.id;
            match self.pool.insert_job_run(new_run).await {
                Ok(_) => {
                    report.runs_created += 1;
                    info!(
                        job = %job.name,
                        run_id,
                        "Created job run {}/{} of job {}",
                        i + 1,
                        total,
                        job_status
                    );
                }
                Err(e) => {
                    error!(job = %job.name, run_id, "Failed to persist job run: {}", e);
                    report.runs_failed.push(RunFailure {
                        job_name: job.name.clone(),
                        run_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Classify a raw run and resolve its test outcomes.
    async fn build_run(
        &self,
        job: &test_job::Model,
        run_id: i64,
        run: &RawJobRunResult,
    ) -> AppResult<NewJobRun> {
        let timestamp = run_timestamp(run.timestamp).ok_or_else(|| {
            AppError::MalformedInput(format!("timestamp {} out of range", run.timestamp))
        })?;

        // Structured results first, then failed names not already covered.
        let mut seen = HashSet::new();
        let mut tests =
            Vec::with_capacity(run.test_results.len() + run.failed_test_names.len());
        let reported = run
            .test_results
            .iter()
            .map(|tr| (tr.name.as_str(), tr.status))
            .chain(
                run.failed_test_names
                    .iter()
                    .map(|name| (name.as_str(), TestStatus::Fail)),
            );
        for (raw_name, status) in reported {
            let (suite_id, test_name) = self.suites.resolve(raw_name);
            let test = self.upserts.ensure_test(test_name).await?;
            if seen.insert(test.id) {
                tests.push(NewJobRunTest {
                    test_case_id: test.id,
                    suite_id,
                    status,
                });
            }
        }

        Ok(NewJobRun {
            id: run_id,
            job_id: job.id,
            url: run.job_run_url.clone(),
            test_failures: run.test_failures,
            failed: run.failed,
            succeeded: run.succeeded,
            infrastructure_failure: run.install_status.is_infra_failure(),
            known_failure: run.failed && run.known_failure,
            overall_result: run.overall_result.clone(),
            timestamp,
            upgrade: false,
            upgrades_from: None,
            upgrades_to: None,
            tests,
        })
    }
}
