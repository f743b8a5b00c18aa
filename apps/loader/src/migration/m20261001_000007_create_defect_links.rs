//! Create defect_test_cases and defect_jobs link tables.

use sea_orm_migration::prelude::*;

use super::m20261001_000002_create_test_jobs::TestJob;
use super::m20261001_000003_create_test_cases::TestCase;
use super::m20261001_000006_create_defects::Defect;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(DefectTestCase::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DefectTestCase::DefectId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DefectTestCase::TestCaseId)
                            .big_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_defect_test_cases")
                            .col(DefectTestCase::DefectId)
                            .col(DefectTestCase::TestCaseId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(DefectTestCase::Table, DefectTestCase::DefectId)
                            .to(Defect::Table, Defect::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(DefectTestCase::Table, DefectTestCase::TestCaseId)
                            .to(TestCase::Table, TestCase::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DefectJob::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DefectJob::DefectId).big_integer().not_null())
                    .col(ColumnDef::new(DefectJob::TestJobId).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_defect_jobs")
                            .col(DefectJob::DefectId)
                            .col(DefectJob::TestJobId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(DefectJob::Table, DefectJob::DefectId)
                            .to(Defect::Table, Defect::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(DefectJob::Table, DefectJob::TestJobId)
                            .to(TestJob::Table, TestJob::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DefectJob::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DefectTestCase::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum DefectTestCase {
    #[sea_orm(iden = "defect_test_cases")]
    Table,
    DefectId,
    TestCaseId,
}

#[derive(DeriveIden)]
pub enum DefectJob {
    #[sea_orm(iden = "defect_jobs")]
    Table,
    DefectId,
    TestJobId,
}
