//! Database queries for defects and their test/job links.

use std::collections::BTreeSet;

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter, QuerySelect, Set,
};

use crate::entity::defect::{self, ActiveModel as DefectActiveModel, Entity as Defect};
use crate::entity::defect_job::{self, ActiveModel as DefectJobActiveModel, Entity as DefectJob};
use crate::entity::defect_test_case::{
    self, ActiveModel as DefectTestCaseActiveModel, Entity as DefectTestCase,
};
use crate::error::{AppError, AppResult};
use crate::models::TrackedDefect;

use super::DbPool;

/// Link changes applied for one defect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkChanges {
    pub tests_added: usize,
    pub tests_removed: usize,
    pub jobs_added: usize,
    pub jobs_removed: usize,
}

/// Split the move from `current` to `desired` into additions and removals.
pub(crate) fn diff_links(
    current: &BTreeSet<i64>,
    desired: &BTreeSet<i64>,
) -> (Vec<i64>, Vec<i64>) {
    let added = desired.difference(current).copied().collect();
    let removed = current.difference(desired).copied().collect();
    (added, removed)
}

impl DbPool {
    /// Upsert a defect and make its link sets equal to `test_ids` and `job_ids`.
    ///
    /// The attribute write and both link diffs run in one transaction.
    pub async fn replace_defect(
        &self,
        tracked: &TrackedDefect,
        test_ids: &BTreeSet<i64>,
        job_ids: &BTreeSet<i64>,
    ) -> AppResult<LinkChanges> {
        let txn = self.begin().await?;

        upsert_defect_row(&txn, tracked).await?;

        let current_tests = current_test_links(&txn, tracked.id).await?;
        let (tests_added, tests_removed) = diff_links(&current_tests, test_ids);

        if !tests_removed.is_empty() {
            DefectTestCase::delete_many()
                .filter(defect_test_case::Column::DefectId.eq(tracked.id))
                .filter(defect_test_case::Column::TestCaseId.is_in(tests_removed.clone()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to unlink defect tests: {}", e)))?;
        }
        if !tests_added.is_empty() {
            let rows = tests_added.iter().map(|id| DefectTestCaseActiveModel {
                defect_id: Set(tracked.id),
                test_case_id: Set(*id),
            });
            DefectTestCase::insert_many(rows)
                .exec_without_returning(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to link defect tests: {}", e)))?;
        }

        let current_jobs = current_job_links(&txn, tracked.id).await?;
        let (jobs_added, jobs_removed) = diff_links(&current_jobs, job_ids);

        if !jobs_removed.is_empty() {
            DefectJob::delete_many()
                .filter(defect_job::Column::DefectId.eq(tracked.id))
                .filter(defect_job::Column::TestJobId.is_in(jobs_removed.clone()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to unlink defect jobs: {}", e)))?;
        }
        if !jobs_added.is_empty() {
            let rows = jobs_added.iter().map(|id| DefectJobActiveModel {
                defect_id: Set(tracked.id),
                test_job_id: Set(*id),
            });
            DefectJob::insert_many(rows)
                .exec_without_returning(&txn)
                .await
                .map_err(|e| AppError::Database(format!("Failed to link defect jobs: {}", e)))?;
        }

        txn.commit().await.map_err(|e| {
            AppError::Database(format!("Failed to commit defect {}: {}", tracked.id, e))
        })?;

        Ok(LinkChanges {
            tests_added: tests_added.len(),
            tests_removed: tests_removed.len(),
            jobs_added: jobs_added.len(),
            jobs_removed: jobs_removed.len(),
        })
    }

    /// Get a defect by tracker id.
    pub async fn get_defect(&self, id: i64) -> AppResult<Option<defect::Model>> {
        let result = Defect::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get defect: {}", e)))?;

        Ok(result)
    }

    /// Test case ids currently linked to a defect.
    pub async fn get_defect_test_ids(&self, id: i64) -> AppResult<BTreeSet<i64>> {
        current_test_links(self.connection(), id).await
    }

    /// Job ids currently linked to a defect.
    pub async fn get_defect_job_ids(&self, id: i64) -> AppResult<BTreeSet<i64>> {
        current_job_links(self.connection(), id).await
    }
}

async fn upsert_defect_row(txn: &DatabaseTransaction, tracked: &TrackedDefect) -> AppResult<()> {
    let now = Utc::now();

    let model = DefectActiveModel {
        id: Set(tracked.id),
        status: Set(tracked.status.clone()),
        summary: Set(tracked.summary.clone()),
        url: Set(tracked.url.clone()),
        target_release: Set(tracked.first_target_release()),
        version: Set(tracked.first_version()),
        component: Set(tracked.first_component()),
        last_change_time: Set(tracked.last_change_time),
        failure_count: Set(tracked.failure_count),
        flake_count: Set(tracked.flake_count),
        created_at: Set(now),
        updated_at: Set(now),
    };

    Defect::insert(model)
        .on_conflict(
            OnConflict::column(defect::Column::Id)
                .update_columns([
                    defect::Column::Status,
                    defect::Column::Summary,
                    defect::Column::Url,
                    defect::Column::TargetRelease,
                    defect::Column::Version,
                    defect::Column::Component,
                    defect::Column::LastChangeTime,
                    defect::Column::FailureCount,
                    defect::Column::FlakeCount,
                    defect::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(txn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to upsert defect {}: {}", tracked.id, e)))?;

    Ok(())
}

async fn current_test_links<C: ConnectionTrait>(conn: &C, defect_id: i64) -> AppResult<BTreeSet<i64>> {
    let ids: Vec<i64> = DefectTestCase::find()
        .select_only()
        .column(defect_test_case::Column::TestCaseId)
        .filter(defect_test_case::Column::DefectId.eq(defect_id))
        .into_tuple()
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load defect tests: {}", e)))?;

    Ok(ids.into_iter().collect())
}

async fn current_job_links<C: ConnectionTrait>(conn: &C, defect_id: i64) -> AppResult<BTreeSet<i64>> {
    let ids: Vec<i64> = DefectJob::find()
        .select_only()
        .column(defect_job::Column::TestJobId)
        .filter(defect_job::Column::DefectId.eq(defect_id))
        .into_tuple()
        .all(conn)
        .await
        .map_err(|e| AppError::Database(format!("Failed to load defect jobs: {}", e)))?;

    Ok(ids.into_iter().collect())
}
