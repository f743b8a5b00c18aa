//! Database queries for jobs.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entity::test_job::{self as job, ActiveModel, Entity as Job};
use crate::error::{AppError, AppResult};

use super::DbPool;

/// Attributes of a job as computed for the current ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct JobAttributes {
    pub release: String,
    pub variants: Vec<String>,
    pub test_grid_url: String,
}

impl JobAttributes {
    fn variants_json(&self) -> serde_json::Value {
        serde_json::Value::from(self.variants.clone())
    }

    /// True when `model` already carries these attributes.
    pub fn matches(&self, model: &job::Model) -> bool {
        model.release == self.release
            && model.test_grid_url == self.test_grid_url
            && model.variant_labels() == self.variants
    }
}

impl DbPool {
    /// Load every known job.
    pub async fn load_jobs(&self) -> AppResult<Vec<job::Model>> {
        let result = Job::find()
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load jobs: {}", e)))?;

        Ok(result)
    }

    /// Insert a job, or overwrite the attributes of the row with the same name.
    ///
    /// The write is conditioned on the unique name, so concurrent discoveries of
    /// the same job converge on one row. The stored row is read back by name.
    pub async fn upsert_job(&self, name: &str, attrs: &JobAttributes) -> AppResult<job::Model> {
        let now = Utc::now();

        let model = ActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            release: Set(attrs.release.clone()),
            variants: Set(attrs.variants_json()),
            test_grid_url: Set(attrs.test_grid_url.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Job::insert(model)
            .on_conflict(
                OnConflict::column(job::Column::Name)
                    .update_columns([
                        job::Column::Release,
                        job::Column::Variants,
                        job::Column::TestGridUrl,
                        job::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to upsert job {}: {}", name, e)))?;

        self.get_job_by_name(name)
            .await?
            .ok_or_else(|| AppError::Database(format!("Job {} missing after upsert", name)))
    }

    /// Persist refreshed attributes of an existing job.
    pub async fn update_job_attributes(
        &self,
        existing: &job::Model,
        attrs: &JobAttributes,
    ) -> AppResult<job::Model> {
        let mut active: ActiveModel = existing.clone().into();
        active.release = Set(attrs.release.clone());
        active.variants = Set(attrs.variants_json());
        active.test_grid_url = Set(attrs.test_grid_url.clone());
        active.updated_at = Set(Utc::now());

        let result = active.update(self.connection()).await.map_err(|e| {
            AppError::Database(format!("Failed to update job {}: {}", existing.name, e))
        })?;

        Ok(result)
    }

    /// Get a job by its name.
    pub async fn get_job_by_name(&self, name: &str) -> AppResult<Option<job::Model>> {
        let result = Job::find()
            .filter(job::Column::Name.eq(name))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get job: {}", e)))?;

        Ok(result)
    }

    /// List jobs ordered by name.
    pub async fn list_jobs(&self) -> AppResult<Vec<job::Model>> {
        let result = Job::find()
            .order_by_asc(job::Column::Name)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list jobs: {}", e)))?;

        Ok(result)
    }
}
