//! Create-or-fetch of job and test identities.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info};

use crate::db::DbPool;
use crate::db::test_jobs::JobAttributes;
use crate::entity::{test_case, test_job};
use crate::error::AppResult;

use super::identity_cache::{JobCache, TestCache};

/// Guarantees a single stored record per job name and per test name.
///
/// Storage writes happen without holding any cache lock; the cache is
/// updated with the row read back after the write.
pub struct UpsertService {
    pool: DbPool,
    jobs: Arc<JobCache>,
    tests: Arc<TestCache>,
    tests_created: AtomicUsize,
}

impl UpsertService {
    pub fn new(pool: DbPool, jobs: Arc<JobCache>, tests: Arc<TestCache>) -> Self {
        Self {
            pool,
            jobs,
            tests,
            tests_created: AtomicUsize::new(0),
        }
    }

    /// Return the stored job for `name`, creating it or refreshing its
    /// attributes as needed.
    pub async fn ensure_job(
        &self,
        name: &str,
        attrs: &JobAttributes,
    ) -> AppResult<Arc<test_job::Model>> {
        if let Some(existing) = self.jobs.get(name) {
            if attrs.matches(&existing) {
                return Ok(existing);
            }
            debug!(job = name, "Refreshing job attributes");
            let updated = self.pool.update_job_attributes(&existing, attrs).await?;
            let (record, _) = self.jobs.put(name.to_string(), updated);
            return Ok(record);
        }

        info!(job = name, "Creating new job row");
        let stored = self.pool.upsert_job(name, attrs).await?;
        let (record, _) = self.jobs.put(name.to_string(), stored);
        Ok(record)
    }

    /// Return the stored test for a canonical `name`, creating it if needed.
    pub async fn ensure_test(&self, name: &str) -> AppResult<Arc<test_case::Model>> {
        if let Some(existing) = self.tests.get(name) {
            return Ok(existing);
        }

        debug!(test = name, "Creating new test row");
        let stored = self.pool.upsert_test_case(name).await?;
        let (record, fresh) = self.tests.put(name.to_string(), stored);
        if fresh {
            self.tests_created.fetch_add(1, Ordering::Relaxed);
        }
        Ok(record)
    }

    /// Number of test names first seen during this pass.
    pub fn tests_created(&self) -> usize {
        self.tests_created.load(Ordering::Relaxed)
    }
}
