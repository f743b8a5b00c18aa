//! Ingestion pipeline scenarios.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;

use super::test_helpers::*;

#[tokio::test]
async fn test_reingesting_batch_is_idempotent() {
    let pool = create_test_pool().await;
    let input = batch(vec![
        job(
            "e2e-aws-upgrade",
            vec![
                run("e2e-aws-upgrade", 101, &[("openshift-tests.[sig-api] a", "pass")], &["b"]),
                run("e2e-aws-upgrade", 102, &[("openshift-tests.[sig-api] a", "fail")], &[]),
            ],
        ),
        job("e2e-gcp", vec![run("e2e-gcp", 201, &[("c", "flake")], &[])]),
    ]);

    let first = ingest_summary(&pool, input.clone()).await;
    assert_eq!(first.runs_created, 3);
    assert_eq!(first.tests_created, 3);
    assert!(first.is_clean());

    let jobs_before = pool.list_jobs().await.unwrap();
    let runs_before = pool.count_job_runs().await.unwrap();
    let outcomes_before = pool.count_job_run_tests().await.unwrap();
    let tests_before = pool.count_test_cases().await.unwrap();

    let second = ingest_summary(&pool, input).await;
    assert_eq!(second.runs_created, 0);
    assert_eq!(second.runs_skipped_known, 3);
    assert_eq!(second.tests_created, 0);

    assert_eq!(pool.count_job_runs().await.unwrap(), runs_before);
    assert_eq!(pool.count_job_run_tests().await.unwrap(), outcomes_before);
    assert_eq!(pool.count_test_cases().await.unwrap(), tests_before);
    assert_eq!(pool.list_jobs().await.unwrap(), jobs_before);
}

#[tokio::test]
async fn test_names_stay_unique_under_concurrent_discovery() {
    let pool = create_test_pool().await;
    let shared = [("openshift-tests.[sig-node] shared", "pass"), ("plain", "fail")];
    let jobs = (0..8)
        .map(|j| {
            let name = format!("job-{}", j);
            let runs = (0..3)
                .map(|r| run(&name, (j * 10 + r + 1) as u64, &shared, &["plain"]))
                .collect();
            job(&name, runs)
        })
        .collect();

    let summary = ingest_summary(&pool, batch(jobs)).await;
    assert_eq!(summary.runs_created, 24);
    assert_eq!(summary.tests_created, 2);

    let tests = pool.list_test_cases().await.unwrap();
    let names: HashSet<_> = tests.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tests.len(), 2);
    assert!(names.contains("[sig-node] shared"));
    assert!(names.contains("plain"));
    assert_eq!(pool.list_jobs().await.unwrap().len(), 8);
    assert_eq!(pool.count_job_run_tests().await.unwrap(), 48);
}

#[tokio::test]
async fn test_repeated_job_name_in_batch_is_coalesced() {
    let pool = create_test_pool().await;
    let summary = ingest_summary(
        &pool,
        batch(vec![
            job("e2e-metal", vec![run("e2e-metal", 1, &[], &[])]),
            job("e2e-metal", vec![run("e2e-metal", 2, &[], &[]), run("e2e-metal", 1, &[], &[])]),
        ]),
    )
    .await;

    assert_eq!(summary.jobs_total, 1);
    assert_eq!(summary.runs_created, 2);
    assert_eq!(summary.runs_skipped_known, 1);
    assert_eq!(pool.list_jobs().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_suite_prefix_is_stripped() {
    let pool = create_test_pool().await;
    ingest(
        &pool,
        batch(vec![job(
            "e2e-aws",
            vec![run(
                "e2e-aws",
                7,
                &[
                    ("openshift-tests.[sig-api] foo", "pass"),
                    ("openshift-tests-upgrade.[sig-upgrade] bar", "pass"),
                    ("unknown-suite.baz", "pass"),
                ],
                &[],
            )],
        )]),
    )
    .await;

    let suites = pool.load_suites().await.unwrap();
    let suite_id = |name: &str| suites.iter().find(|s| s.name == name).map(|s| s.id);

    let foo = pool.get_test_case_by_name("[sig-api] foo").await.unwrap().unwrap();
    let bar = pool.get_test_case_by_name("[sig-upgrade] bar").await.unwrap().unwrap();
    let baz = pool.get_test_case_by_name("unknown-suite.baz").await.unwrap().unwrap();
    assert!(pool.get_test_case_by_name("openshift-tests.[sig-api] foo").await.unwrap().is_none());

    let outcomes = pool.get_job_run_tests(7).await.unwrap();
    let suite_of = |test_id: i64| {
        outcomes
            .iter()
            .find(|o| o.test_case_id == test_id)
            .map(|o| o.test_suite_id)
            .unwrap()
    };
    assert_eq!(suite_of(foo.id), suite_id("openshift-tests"));
    assert_eq!(suite_of(bar.id), suite_id("openshift-tests-upgrade"));
    assert_eq!(suite_of(baz.id), None);
}

#[tokio::test]
async fn test_result_and_failed_name_union_to_one_outcome() {
    let pool = create_test_pool().await;
    ingest(
        &pool,
        batch(vec![job(
            "e2e-azure",
            vec![run(
                "e2e-azure",
                9,
                &[("openshift-tests.A", "fail")],
                &["A", "openshift-tests.A", "B"],
            )],
        )]),
    )
    .await;

    let a = pool.get_test_case_by_name("A").await.unwrap().unwrap();
    let b = pool.get_test_case_by_name("B").await.unwrap().unwrap();
    let outcomes = pool.get_job_run_tests(9).await.unwrap();
    assert_eq!(outcomes.len(), 2);

    let a_outcome = outcomes.iter().find(|o| o.test_case_id == a.id).unwrap();
    assert_eq!(a_outcome.status, "fail");
    assert!(a_outcome.test_suite_id.is_some());
    let b_outcome = outcomes.iter().find(|o| o.test_case_id == b.id).unwrap();
    assert_eq!(b_outcome.status, "fail");
}

#[tokio::test]
async fn test_infrastructure_failure_classification() {
    let pool = create_test_pool().await;
    let mut unknown = run("e2e-vsphere", 1, &[], &[]);
    unknown["install_status"] = json!("Unknown");
    unknown["overall_result"] = json!("Failed");
    let mut infra = run("e2e-vsphere", 2, &[], &[]);
    infra["install_status"] = json!("InfraFailure");
    infra["overall_result"] = json!("Failed");
    let mut missing = run("e2e-vsphere", 3, &[], &[]);
    missing["install_status"] = json!("");
    let mut known = run("e2e-vsphere", 4, &[], &[]);
    known["known_failure"] = json!(true);

    ingest(&pool, batch(vec![job("e2e-vsphere", vec![unknown, infra, missing, known])])).await;

    let get = |id| {
        let pool = pool.clone();
        async move { pool.get_job_run(id).await.unwrap().unwrap() }
    };
    assert!(!get(1).await.infrastructure_failure);
    assert!(get(2).await.infrastructure_failure);
    assert!(get(3).await.infrastructure_failure);
    let known = get(4).await;
    assert!(!known.infrastructure_failure);
    assert!(known.known_failure);
    assert!(!get(1).await.known_failure);
}

#[tokio::test]
async fn test_run_timestamp_is_truncated_to_seconds() {
    let pool = create_test_pool().await;
    let mut r = run("e2e-ovn", 5, &[], &[]);
    r["timestamp"] = json!(1_635_465_600_789u64);
    ingest(&pool, batch(vec![job("e2e-ovn", vec![r])])).await;

    let stored = pool.get_job_run(5).await.unwrap().unwrap();
    assert_eq!(stored.timestamp.timestamp(), 1_635_465_600);
    assert_eq!(stored.timestamp.timestamp_subsec_millis(), 0);
}

#[tokio::test]
async fn test_malformed_run_url_is_skipped() {
    let pool = create_test_pool().await;
    let mut bad = run("e2e-gcp", 1, &[("t", "pass")], &[]);
    bad["job_run_url"] = json!("https://prow.ci.example/view/gs/origin-ci-test/logs/e2e-gcp/latest");
    let good = run("e2e-gcp", 2, &[("t", "pass")], &[]);

    let summary = ingest_summary(&pool, batch(vec![job("e2e-gcp", vec![bad, good])])).await;

    assert_eq!(summary.runs_malformed, 1);
    assert_eq!(summary.runs_created, 1);
    assert!(!summary.is_clean());
    assert_eq!(pool.count_job_runs().await.unwrap(), 1);
    assert!(pool.get_job_run(2).await.unwrap().is_some());
}

#[tokio::test]
async fn test_known_runs_are_skipped_across_batches() {
    let pool = create_test_pool().await;
    ingest(
        &pool,
        batch(vec![job("e2e-aws", vec![run("e2e-aws", 1, &[], &[]), run("e2e-aws", 2, &[], &[])])]),
    )
    .await;

    let summary = ingest_summary(
        &pool,
        batch(vec![job("e2e-aws", vec![run("e2e-aws", 2, &[], &["late"]), run("e2e-aws", 3, &[], &[])])]),
    )
    .await;

    assert_eq!(summary.runs_created, 1);
    assert_eq!(summary.runs_skipped_known, 1);
    // Known runs are never rewritten.
    assert!(pool.get_job_run_tests(2).await.unwrap().is_empty());
    let job = pool.get_job_by_name("e2e-aws").await.unwrap().unwrap();
    assert_eq!(pool.list_job_runs_for_job(job.id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_job_attributes_are_refreshed_on_reingest() {
    let pool = create_test_pool().await;
    let first = pipeline_with_variants(&pool, Arc::new(FixedVariants(vec!["aws".to_string()])));
    first
        .run(to_batch(batch(vec![job("e2e-aws", vec![run("e2e-aws", 1, &[], &[])])])))
        .await
        .unwrap();
    let before = pool.get_job_by_name("e2e-aws").await.unwrap().unwrap();
    assert_eq!(before.variant_labels(), vec!["aws"]);

    let mut moved = job("e2e-aws", vec![run("e2e-aws", 2, &[], &[])]);
    moved["test_grid_job_url"] = json!("https://testgrid.example/moved");
    let second = pipeline_with_variants(
        &pool,
        Arc::new(FixedVariants(vec!["aws".to_string(), "ovn".to_string()])),
    );
    let outcome = second.run(to_batch(batch(vec![moved]))).await.unwrap();
    assert!(outcome.summary.is_clean());

    let after = pool.get_job_by_name("e2e-aws").await.unwrap().unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.variant_labels(), vec!["aws", "ovn"]);
    assert_eq!(after.test_grid_url, "https://testgrid.example/moved");
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(pool.list_jobs().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_keyword_variants_are_stored() {
    let pool = create_test_pool().await;
    ingest(
        &pool,
        batch(vec![job("periodic-e2e-azure-ovn-upgrade", vec![])]),
    )
    .await;

    let stored = pool
        .get_job_by_name("periodic-e2e-azure-ovn-upgrade")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.variant_labels(), vec!["azure", "ovn", "upgrade"]);
    assert_eq!(stored.release, "4.10");
}

#[tokio::test]
async fn test_upgrade_history_annotates_sibling_run() {
    let pool = create_test_pool().await;
    let mut first = run("e2e-upgrade", 11, &[], &[]);
    first["upgrades"] = json!([{
        "from": "4.9.12",
        "to": "4.10.0",
        "run_urls": [run_url("e2e-upgrade", 12), run_url("e2e-upgrade", 999)],
    }]);
    let second = run("e2e-upgrade", 12, &[], &[]);

    let summary = ingest_summary(&pool, batch(vec![job("e2e-upgrade", vec![first, second])])).await;
    assert_eq!(summary.runs_created, 2);

    let annotated = pool.get_job_run(12).await.unwrap().unwrap();
    assert!(annotated.upgrade);
    assert_eq!(annotated.upgrades_from.as_deref(), Some("4.9.12"));
    assert_eq!(annotated.upgrades_to.as_deref(), Some("4.10.0"));

    let plain = pool.get_job_run(11).await.unwrap().unwrap();
    assert!(!plain.upgrade);
    assert!(pool.get_job_run(999).await.unwrap().is_none());
}

#[tokio::test]
async fn test_failed_run_does_not_block_sibling_runs() {
    let pool = create_test_pool().await;
    // Run 5 is claimed by both jobs; only one of them can store it.
    let summary = ingest_summary(
        &pool,
        batch(vec![
            job("job-a", vec![run("job-a", 5, &[("t", "pass")], &[]), run("job-a", 6, &[], &[])]),
            job("job-b", vec![run("job-b", 5, &[("t", "fail")], &[]), run("job-b", 7, &[], &[])]),
        ]),
    )
    .await;

    assert_eq!(summary.runs_created, 3);
    assert_eq!(summary.runs_failed.len(), 1);
    assert_eq!(summary.runs_failed[0].run_id, 5);
    assert!(summary.jobs_failed.is_empty());
    assert!(!summary.is_clean());

    assert!(pool.get_job_run(6).await.unwrap().is_some());
    assert!(pool.get_job_run(7).await.unwrap().is_some());
    let stored = pool.get_job_run(5).await.unwrap().unwrap();
    assert_eq!(pool.get_job_run_tests(5).await.unwrap().len(), 1);
    let failed_job = pool
        .get_job_by_name(&summary.runs_failed[0].job_name)
        .await
        .unwrap()
        .unwrap();
    assert_ne!(stored.test_job_id, failed_job.id);
}

#[tokio::test]
async fn test_failed_test_upsert_stops_only_that_job() {
    let pool = create_test_pool().await;
    reject_name(&pool, "test_cases", "poisoned").await;

    let summary = ingest_summary(
        &pool,
        batch(vec![
            job(
                "job-bad",
                vec![
                    run("job-bad", 1, &[("fine", "pass")], &[]),
                    run("job-bad", 2, &[], &["poisoned"]),
                ],
            ),
            job("job-good", vec![run("job-good", 3, &[("fine", "pass")], &["other"])]),
        ]),
    )
    .await;

    assert_eq!(summary.jobs_failed.len(), 1);
    assert_eq!(summary.jobs_failed[0].job_name, "job-bad");
    assert_eq!(summary.runs_created, 1);
    assert!(summary.runs_failed.is_empty());

    // Nothing of the failed job's runs is written, not even the healthy one.
    let bad = pool.get_job_by_name("job-bad").await.unwrap().unwrap();
    assert!(pool.list_job_runs_for_job(bad.id).await.unwrap().is_empty());
    assert_eq!(pool.get_job_run_tests(3).await.unwrap().len(), 2);
    assert!(pool.get_test_case_by_name("poisoned").await.unwrap().is_none());
}

#[tokio::test]
async fn test_failed_job_upsert_skips_its_runs() {
    let pool = create_test_pool().await;
    reject_name(&pool, "test_jobs", "job-rejected").await;

    let summary = ingest_summary(
        &pool,
        batch(vec![
            job("job-rejected", vec![run("job-rejected", 1, &[], &[])]),
            job("job-ok", vec![run("job-ok", 2, &[], &[])]),
        ]),
    )
    .await;

    assert_eq!(summary.jobs_total, 2);
    assert_eq!(summary.jobs_failed.len(), 1);
    assert_eq!(summary.jobs_failed[0].job_name, "job-rejected");
    assert_eq!(summary.runs_created, 1);
    assert!(pool.get_job_by_name("job-rejected").await.unwrap().is_none());
    assert!(pool.get_job_run(1).await.unwrap().is_none());
    assert!(pool.get_job_run(2).await.unwrap().is_some());
}
