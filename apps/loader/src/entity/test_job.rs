//! Job entity for SeaORM.

use sea_orm::entity::prelude::*;
use serde_json::Value as JsonValue;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "test_jobs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    /// Reporting-release label, e.g. "4.10"
    pub release: String,
    /// Sorted variant labels, recomputed on every ingestion
    #[sea_orm(column_type = "Json")]
    pub variants: JsonValue,
    pub test_grid_url: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Variant labels as strings; anything that is not a JSON string array reads as empty.
    pub fn variant_labels(&self) -> Vec<String> {
        serde_json::from_value(self.variants.clone()).unwrap_or_default()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::job_run::Entity")]
    JobRuns,
}

impl Related<super::job_run::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JobRuns.def()
    }
}

impl Related<super::defect::Entity> for Entity {
    fn to() -> RelationDef {
        super::defect_job::Relation::Defect.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::defect_job::Relation::Job.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
