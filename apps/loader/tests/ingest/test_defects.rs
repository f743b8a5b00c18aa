//! Defect merge scenarios.

use std::collections::BTreeSet;
use std::io::Write;

use ci_telemetry_lib::services::{DefectLookup, StaticDefectTracker, merge_defects};

use super::test_helpers::*;

async fn ingest_universe(pool: &ci_telemetry_lib::db::DbPool) -> ci_telemetry_lib::services::IngestRun {
    ingest(
        pool,
        batch(vec![
            job("e2e-aws", vec![run("e2e-aws", 1, &[("X", "fail"), ("Y", "fail")], &["Z"])]),
            job("e2e-gcp", vec![run("e2e-gcp", 2, &[("Y", "pass")], &[])]),
        ]),
    )
    .await
}

async fn test_ids(pool: &ci_telemetry_lib::db::DbPool, names: &[&str]) -> BTreeSet<i64> {
    let mut ids = BTreeSet::new();
    for name in names {
        ids.insert(pool.get_test_case_by_name(name).await.unwrap().unwrap().id);
    }
    ids
}

#[tokio::test]
async fn test_defect_links_are_replaced_not_merged() {
    let pool = create_test_pool().await;
    let universe = ingest_universe(&pool).await;

    let first = ScriptedTracker {
        tests: lookup(&[("X", vec![defect(100, "old")]), ("Y", vec![defect(100, "old")])]),
        jobs: DefectLookup::default(),
    };
    let report = merge_defects(&pool, &first, &universe.tests, &universe.jobs)
        .await
        .unwrap();
    assert_eq!(report.defects_upserted, 1);
    assert_eq!(report.test_links_added, 2);
    assert_eq!(
        pool.get_defect_test_ids(100).await.unwrap(),
        test_ids(&pool, &["X", "Y"]).await
    );

    let second = ScriptedTracker {
        tests: lookup(&[("Y", vec![defect(100, "new")]), ("Z", vec![defect(100, "new")])]),
        jobs: DefectLookup::default(),
    };
    let report = merge_defects(&pool, &second, &universe.tests, &universe.jobs)
        .await
        .unwrap();
    assert_eq!(report.test_links_added, 1);
    assert_eq!(report.test_links_removed, 1);
    assert_eq!(
        pool.get_defect_test_ids(100).await.unwrap(),
        test_ids(&pool, &["Y", "Z"]).await
    );

    let stored = pool.get_defect(100).await.unwrap().unwrap();
    assert_eq!(stored.summary, "new");
    assert_eq!(stored.component.as_deref(), Some("Networking"));
    assert_eq!(stored.target_release.as_deref(), Some("4.10.0"));
}

#[tokio::test]
async fn test_job_blockers_are_linked() {
    let pool = create_test_pool().await;
    let universe = ingest_universe(&pool).await;

    let tracker = ScriptedTracker {
        tests: DefectLookup::default(),
        jobs: lookup(&[("e2e-aws", vec![defect(7, "blocker")]), ("e2e-gcp", vec![defect(7, "blocker")])]),
    };
    let report = merge_defects(&pool, &tracker, &universe.tests, &universe.jobs)
        .await
        .unwrap();
    assert_eq!(report.job_links_added, 2);

    let aws = pool.get_job_by_name("e2e-aws").await.unwrap().unwrap();
    let gcp = pool.get_job_by_name("e2e-gcp").await.unwrap().unwrap();
    assert_eq!(
        pool.get_defect_job_ids(7).await.unwrap(),
        BTreeSet::from([aws.id, gcp.id])
    );
    assert!(pool.get_defect_test_ids(7).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_name_is_an_invariant_violation() {
    let pool = create_test_pool().await;
    let universe = ingest_universe(&pool).await;

    let tracker = ScriptedTracker {
        tests: lookup(&[("X", vec![defect(1, "ok")]), ("ghost", vec![defect(2, "stale")])]),
        jobs: DefectLookup::default(),
    };
    let err = merge_defects(&pool, &tracker, &universe.tests, &universe.jobs)
        .await
        .unwrap_err();

    assert!(err.is_invariant_violation());
    assert!(pool.get_defect(1).await.unwrap().is_none());
    assert!(pool.get_defect(2).await.unwrap().is_none());
}

#[tokio::test]
async fn test_degraded_lookup_merges_resolved_subset() {
    let pool = create_test_pool().await;
    let universe = ingest_universe(&pool).await;

    let mut tests = lookup(&[("X", vec![defect(5, "partial")])]);
    tests.error = Some("tracker timed out for 2 of 3 queries".to_string());
    let tracker = ScriptedTracker {
        tests,
        jobs: DefectLookup::default(),
    };
    let report = merge_defects(&pool, &tracker, &universe.tests, &universe.jobs)
        .await
        .unwrap();

    assert_eq!(report.degraded.len(), 1);
    assert!(report.degraded[0].contains("timed out"));
    assert_eq!(report.defects_upserted, 1);
    assert_eq!(
        pool.get_defect_test_ids(5).await.unwrap(),
        test_ids(&pool, &["X"]).await
    );
}

#[tokio::test]
async fn test_defects_absent_from_pass_keep_their_links() {
    let pool = create_test_pool().await;
    let universe = ingest_universe(&pool).await;

    let tracker = ScriptedTracker {
        tests: lookup(&[("X", vec![defect(8, "a")])]),
        jobs: DefectLookup::default(),
    };
    merge_defects(&pool, &tracker, &universe.tests, &universe.jobs)
        .await
        .unwrap();

    let empty = ScriptedTracker {
        tests: DefectLookup::default(),
        jobs: DefectLookup::default(),
    };
    let report = merge_defects(&pool, &empty, &universe.tests, &universe.jobs)
        .await
        .unwrap();
    assert_eq!(report.defects_upserted, 0);
    assert_eq!(pool.get_defect_test_ids(8).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_static_tracker_from_file() {
    let pool = create_test_pool().await;
    let universe = ingest_universe(&pool).await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "tests": {{"Z": [{{"id": 300, "status": "ASSIGNED", "summary": "z flakes"}}],
                       "not-ingested": [{{"id": 301}}]}},
            "jobs": {{"e2e-gcp": [{{"id": 300, "summary": "z flakes"}}]}}
        }}"#
    )
    .unwrap();

    let tracker = StaticDefectTracker::from_path(file.path()).await.unwrap();
    let report = merge_defects(&pool, &tracker, &universe.tests, &universe.jobs)
        .await
        .unwrap();

    assert_eq!(report.defects_upserted, 1);
    assert!(report.degraded.is_empty());
    assert_eq!(
        pool.get_defect_test_ids(300).await.unwrap(),
        test_ids(&pool, &["Z"]).await
    );
    assert_eq!(pool.get_defect_job_ids(300).await.unwrap().len(), 1);
    assert!(pool.get_defect(301).await.unwrap().is_none());
}
