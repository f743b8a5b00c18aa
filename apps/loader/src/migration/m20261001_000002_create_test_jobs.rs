//! Create test_jobs table.
//!
//! One row per CI job name. Variants and the test-grid URL are refreshed on
//! every ingestion.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestJob::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestJob::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestJob::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(TestJob::Release).string().not_null())
                    .col(ColumnDef::new(TestJob::Variants).json().not_null())
                    .col(ColumnDef::new(TestJob::TestGridUrl).string().not_null())
                    .col(
                        ColumnDef::new(TestJob::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TestJob::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_test_jobs_release")
                    .table(TestJob::Table)
                    .col(TestJob::Release)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestJob::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TestJob {
    #[sea_orm(iden = "test_jobs")]
    Table,
    Id,
    Name,
    Release,
    Variants,
    TestGridUrl,
    CreatedAt,
    UpdatedAt,
}
