//! Defect <-> job link table (defects known to explain a job's blocking failures).

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "defect_jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub defect_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub test_job_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::defect::Entity",
        from = "Column::DefectId",
        to = "super::defect::Column::Id",
        on_delete = "Cascade"
    )]
    Defect,
    #[sea_orm(
        belongs_to = "super::test_job::Entity",
        from = "Column::TestJobId",
        to = "super::test_job::Column::Id",
        on_delete = "Cascade"
    )]
    Job,
}

impl ActiveModelBehavior for ActiveModel {}
