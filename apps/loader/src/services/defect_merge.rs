//! Merge of tracker defects onto the ingested tests and jobs.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{info, warn};

use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{DefectMergeReport, TrackedDefect};

use super::defect_tracker::{DefectLookup, DefectTracker};
use super::identity_cache::{JobCache, TestCache};

/// Desired state of one defect after this pass.
#[derive(Debug, Clone)]
pub struct DefectLinks {
    pub defect: TrackedDefect,
    pub test_ids: BTreeSet<i64>,
    pub job_ids: BTreeSet<i64>,
}

fn entry<'a>(plan: &'a mut BTreeMap<i64, DefectLinks>, defect: &TrackedDefect) -> &'a mut DefectLinks {
    plan.entry(defect.id).or_insert_with(|| DefectLinks {
        defect: defect.clone(),
        test_ids: BTreeSet::new(),
        job_ids: BTreeSet::new(),
    })
}

/// Fold both lookups into one entry per defect id, resolving names through
/// the caches.
///
/// Fails with [`AppError::InvariantViolation`] on the first name the caches
/// do not know; nothing has been written at that point.
pub fn plan_defect_links(
    tests_lookup: &DefectLookup,
    jobs_lookup: &DefectLookup,
    tests: &TestCache,
    jobs: &JobCache,
) -> AppResult<BTreeMap<i64, DefectLinks>> {
    let mut plan: BTreeMap<i64, DefectLinks> = BTreeMap::new();

    for (name, defects) in &tests_lookup.defects {
        let test = tests.get(name).ok_or_else(|| {
            AppError::InvariantViolation(format!(
                "defect mapping references unknown test '{}'",
                name
            ))
        })?;
        for defect in defects {
            entry(&mut plan, defect).test_ids.insert(test.id);
        }
    }

    for (name, defects) in &jobs_lookup.defects {
        let job = jobs.get(name).ok_or_else(|| {
            AppError::InvariantViolation(format!(
                "defect mapping references unknown job '{}'",
                name
            ))
        })?;
        for defect in defects {
            entry(&mut plan, defect).job_ids.insert(job.id);
        }
    }

    Ok(plan)
}

/// Refresh every defect the tracker reports for the cached tests and jobs and
/// replace its link sets with exactly what this pass computed.
///
/// Defects not reported in this pass are left untouched.
pub async fn merge_defects(
    pool: &DbPool,
    tracker: &dyn DefectTracker,
    tests: &TestCache,
    jobs: &JobCache,
) -> AppResult<DefectMergeReport> {
    let mut report = DefectMergeReport::default();

    let test_names = tests.names();
    let job_names = jobs.names();
    info!(
        "Resolving defects for {} tests and {} jobs",
        test_names.len(),
        job_names.len()
    );

    let tests_lookup = tracker.defects_for_tests(&test_names).await;
    let jobs_lookup = tracker.blockers_for_jobs(&job_names).await;
    for (source, lookup) in [("test", &tests_lookup), ("job", &jobs_lookup)] {
        if let Some(err) = &lookup.error {
            let degraded = AppError::UpstreamLookupDegraded(format!("{} defects: {}", source, err));
            warn!("{}", degraded);
            report.degraded.push(degraded.to_string());
        }
    }

    let plan = plan_defect_links(&tests_lookup, &jobs_lookup, tests, jobs)?;

    for links in plan.values() {
        let changes = pool
            .replace_defect(&links.defect, &links.test_ids, &links.job_ids)
            .await?;
        report.defects_upserted += 1;
        report.test_links_added += changes.tests_added;
        report.test_links_removed += changes.tests_removed;
        report.job_links_added += changes.jobs_added;
        report.job_links_removed += changes.jobs_removed;
    }

    info!(
        "Merged {} defects (tests +{}/-{}, jobs +{}/-{})",
        report.defects_upserted,
        report.test_links_added,
        report.test_links_removed,
        report.job_links_added,
        report.job_links_removed
    );

    Ok(report)
}
