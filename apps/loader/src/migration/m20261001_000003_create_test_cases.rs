//! Create test_cases table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TestCase::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TestCase::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TestCase::Name).text().not_null().unique_key())
                    .col(
                        ColumnDef::new(TestCase::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TestCase::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TestCase {
    #[sea_orm(iden = "test_cases")]
    Table,
    Id,
    Name,
    CreatedAt,
}
