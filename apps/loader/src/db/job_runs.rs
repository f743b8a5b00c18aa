//! Database queries for job runs and their per-test outcomes.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entity::job_run::{self, ActiveModel as JobRunActiveModel, Entity as JobRun};
use crate::entity::job_run_test::{self, ActiveModel as JobRunTestActiveModel, Entity as JobRunTest};
use crate::error::{AppError, AppResult};
use crate::models::TestStatus;

use super::DbPool;

/// Outcome rows per `INSERT`. Each row binds four parameters, so this stays
/// well below the SQLite and PostgreSQL bind limits.
const OUTCOME_INSERT_CHUNK: usize = 1000;

/// A job run ready to be written, together with all of its outcomes.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJobRun {
    pub id: i64,
    pub job_id: i64,
    pub url: String,
    pub test_failures: i32,
    pub failed: bool,
    pub succeeded: bool,
    pub infrastructure_failure: bool,
    pub known_failure: bool,
    pub overall_result: String,
    pub timestamp: DateTime<Utc>,
    pub upgrade: bool,
    pub upgrades_from: Option<String>,
    pub upgrades_to: Option<String>,
    pub tests: Vec<NewJobRunTest>,
}

/// One test outcome row of a [`NewJobRun`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewJobRunTest {
    pub test_case_id: i64,
    pub suite_id: Option<i64>,
    pub status: TestStatus,
}

impl DbPool {
    /// Ids of every run already recorded for a job.
    pub async fn known_run_ids(&self, job_id: i64) -> AppResult<HashSet<i64>> {
        let ids: Vec<i64> = JobRun::find()
            .select_only()
            .column(job_run::Column::Id)
            .filter(job_run::Column::TestJobId.eq(job_id))
            .into_tuple()
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load known job runs: {}", e)))?;

        Ok(ids.into_iter().collect())
    }

    /// Write a run and all of its outcomes in one transaction.
    ///
    /// Either the run and every outcome row become visible, or nothing does.
    pub async fn insert_job_run(&self, run: NewJobRun) -> AppResult<job_run::Model> {
        let txn = self.begin().await?;

        let run_id = run.id;
        let model = JobRunActiveModel {
            id: Set(run.id),
            test_job_id: Set(run.job_id),
            url: Set(run.url),
            test_failures: Set(run.test_failures),
            failed: Set(run.failed),
            succeeded: Set(run.succeeded),
            infrastructure_failure: Set(run.infrastructure_failure),
            known_failure: Set(run.known_failure),
            overall_result: Set(run.overall_result),
            timestamp: Set(run.timestamp),
            upgrade: Set(run.upgrade),
            upgrades_from: Set(run.upgrades_from),
            upgrades_to: Set(run.upgrades_to),
            created_at: Set(Utc::now()),
        };

        let inserted = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert job run {}: {}", run_id, e)))?;

        for chunk in run.tests.chunks(OUTCOME_INSERT_CHUNK) {
            let rows = chunk.iter().map(|t| JobRunTestActiveModel {
                job_run_id: Set(run_id),
                test_case_id: Set(t.test_case_id),
                test_suite_id: Set(t.suite_id),
                status: Set(t.status.as_str().to_string()),
            });

            JobRunTest::insert_many(rows)
                .exec_without_returning(&txn)
                .await
                .map_err(|e| {
                    AppError::Database(format!(
                        "Failed to insert test outcomes for job run {}: {}",
                        run_id, e
                    ))
                })?;
        }

        txn.commit().await.map_err(|e| {
            AppError::Database(format!("Failed to commit job run {}: {}", run_id, e))
        })?;

        Ok(inserted)
    }

    /// Get a job run by id.
    pub async fn get_job_run(&self, id: i64) -> AppResult<Option<job_run::Model>> {
        let result = JobRun::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get job run: {}", e)))?;

        Ok(result)
    }

    /// All runs of a job, oldest first.
    pub async fn list_job_runs_for_job(&self, job_id: i64) -> AppResult<Vec<job_run::Model>> {
        let result = JobRun::find()
            .filter(job_run::Column::TestJobId.eq(job_id))
            .order_by_asc(job_run::Column::Timestamp)
            .order_by_asc(job_run::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list job runs: {}", e)))?;

        Ok(result)
    }

    /// Count stored job runs.
    pub async fn count_job_runs(&self) -> AppResult<u64> {
        let count = JobRun::find()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count job runs: {}", e)))?;

        Ok(count)
    }

    /// Outcome rows of one run, ordered by test id.
    pub async fn get_job_run_tests(&self, run_id: i64) -> AppResult<Vec<job_run_test::Model>> {
        let result = JobRunTest::find()
            .filter(job_run_test::Column::JobRunId.eq(run_id))
            .order_by_asc(job_run_test::Column::TestCaseId)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get job run tests: {}", e)))?;

        Ok(result)
    }

    /// Count stored outcome rows across all runs.
    pub async fn count_job_run_tests(&self) -> AppResult<u64> {
        let count = JobRunTest::find()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count job run tests: {}", e)))?;

        Ok(count)
    }
}
