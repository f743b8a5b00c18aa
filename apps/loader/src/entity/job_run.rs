//! JobRun entity for SeaORM.
//!
//! The primary key is the numeric id taken from the run URL, so a run is
//! recorded at most once no matter how many batches mention it.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "job_runs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub test_job_id: i64,
    pub url: String,
    pub test_failures: i32,
    pub failed: bool,
    pub succeeded: bool,
    pub infrastructure_failure: bool,
    pub known_failure: bool,
    pub overall_result: String,
    /// Run start, truncated to whole seconds
    pub timestamp: DateTimeUtc,
    pub upgrade: bool,
    pub upgrades_from: Option<String>,
    pub upgrades_to: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::test_job::Entity",
        from = "Column::TestJobId",
        to = "super::test_job::Column::Id",
        on_delete = "Cascade"
    )]
    Job,
    #[sea_orm(has_many = "super::job_run_test::Entity")]
    Tests,
}

impl Related<super::test_job::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Job.def()
    }
}

impl Related<super::job_run_test::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tests.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
