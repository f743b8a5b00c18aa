//! Defect <-> test case link table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "defect_test_cases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub defect_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub test_case_id: i64,
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
        belongs_to = "super::test_case::Entity",
        from = "Column::TestCaseId",
        to = "super::test_case::Column::Id",
        on_delete = "Cascade"
    )]
    TestCase,
}

impl ActiveModelBehavior for ActiveModel {}
