//! Create job_runs table.
//!
//! The id is the numeric run id taken from the run URL, not a generated key.

use sea_orm_migration::prelude::*;

use super::m20261001_000002_create_test_jobs::TestJob;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JobRun::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobRun::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobRun::TestJobId).big_integer().not_null())
                    .col(ColumnDef::new(JobRun::Url).string().not_null())
                    .col(ColumnDef::new(JobRun::TestFailures).integer().not_null())
                    .col(ColumnDef::new(JobRun::Failed).boolean().not_null())
                    .col(ColumnDef::new(JobRun::Succeeded).boolean().not_null())
                    .col(
                        ColumnDef::new(JobRun::InfrastructureFailure)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(JobRun::KnownFailure).boolean().not_null())
                    .col(ColumnDef::new(JobRun::OverallResult).string().not_null())
                    .col(
                        ColumnDef::new(JobRun::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(JobRun::Upgrade).boolean().not_null())
                    .col(ColumnDef::new(JobRun::UpgradesFrom).string())
                    .col(ColumnDef::new(JobRun::UpgradesTo).string())
                    .col(
                        ColumnDef::new(JobRun::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(JobRun::Table, JobRun::TestJobId)
                            .to(TestJob::Table, TestJob::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_job_runs_test_job_id")
                    .table(JobRun::Table)
                    .col(JobRun::TestJobId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_job_runs_timestamp")
                    .table(JobRun::Table)
                    .col(JobRun::Timestamp)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobRun::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum JobRun {
    #[sea_orm(iden = "job_runs")]
    Table,
    Id,
    TestJobId,
    Url,
    TestFailures,
    Failed,
    Succeeded,
    InfrastructureFailure,
    KnownFailure,
    OverallResult,
    Timestamp,
    Upgrade,
    UpgradesFrom,
    UpgradesTo,
    CreatedAt,
}
