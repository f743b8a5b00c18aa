//! Defect entity for SeaORM.
//!
//! Keyed by the external tracker id.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "defects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub status: String,
    pub summary: String,
    pub url: String,
    pub target_release: Option<String>,
    pub version: Option<String>,
    pub component: Option<String>,
    pub last_change_time: Option<DateTimeUtc>,
    pub failure_count: i32,
    pub flake_count: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::test_case::Entity> for Entity {
    fn to() -> RelationDef {
        super::defect_test_case::Relation::TestCase.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::defect_test_case::Relation::Defect.def().rev())
    }
}

impl Related<super::test_job::Entity> for Entity {
    fn to() -> RelationDef {
        super::defect_job::Relation::Job.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::defect_job::Relation::Defect.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
