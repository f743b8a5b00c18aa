//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_test_suites;
mod m20261001_000002_create_test_jobs;
mod m20261001_000003_create_test_cases;
mod m20261001_000004_create_job_runs;
mod m20261001_000006_create_defects;
mod m20261001_000007_create_defect_links;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_test_suites::Migration),
            Box::new(m20261001_000002_create_test_jobs::Migration),
            Box::new(m20261001_000003_create_test_cases::Migration),
            Box::new(m20261001_000004_create_job_runs::Migration),
            Box::new(m20261001_000005_create_job_run_tests::Migration),
            Box::new(m20261001_000006_create_defects::Migration),
            Box::new(m20261001_000007_create_defect_links::Migration),
        ]
    }
}
