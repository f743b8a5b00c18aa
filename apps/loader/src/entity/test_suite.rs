//! TestSuite entity for SeaORM.
//!
//! Reference data only: suites are seeded before ingestion and never created
//! by the pipeline.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_suites")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::job_run_test::Entity")]
    JobRunTests,
}

impl Related<super::job_run_test::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobRunTests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
