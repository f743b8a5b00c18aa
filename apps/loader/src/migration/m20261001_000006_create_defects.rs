//! Create defects table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Defect::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Defect::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Defect::Status).string().not_null())
                    .col(ColumnDef::new(Defect::Summary).text().not_null())
                    .col(ColumnDef::new(Defect::Url).string().not_null())
                    .col(ColumnDef::new(Defect::TargetRelease).string())
                    .col(ColumnDef::new(Defect::Version).string())
                    .col(ColumnDef::new(Defect::Component).string())
                    .col(ColumnDef::new(Defect::LastChangeTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(Defect::FailureCount).integer().not_null())
                    .col(ColumnDef::new(Defect::FlakeCount).integer().not_null())
                    .col(
                        ColumnDef::new(Defect::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Defect::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Defect::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Defect {
    #[sea_orm(iden = "defects")]
    Table,
    Id,
    Status,
    Summary,
    Url,
    TargetRelease,
    Version,
    Component,
    LastChangeTime,
    FailureCount,
    FlakeCount,
    CreatedAt,
    UpdatedAt,
}
