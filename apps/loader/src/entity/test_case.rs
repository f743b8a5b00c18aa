//! TestCase entity for SeaORM.
//!
//! One row per canonical test name (suite prefix already stripped).

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_cases")]
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

impl Related<super::defect::Entity> for Entity {
    fn to() -> RelationDef {
        super::defect_test_case::Relation::Defect.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::defect_test_case::Relation::TestCase.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
