//! Create test_suites table.
//!
//! Suites are reference data used to strip known prefixes from raw test names.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestSuite::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestSuite::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TestSuite::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(TestSuite::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestSuite::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TestSuite {
    #[sea_orm(iden = "test_suites")]
    Table,
    Id,
    Name,
    CreatedAt,
}
