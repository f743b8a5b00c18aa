//! Database queries for test cases and test suites.

use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::entity::test_case::{self, ActiveModel as TestCaseActiveModel, Entity as TestCase};
use crate::entity::test_suite::{self, ActiveModel as TestSuiteActiveModel, Entity as TestSuite};
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    /// Load every known test case.
    pub async fn load_test_cases(&self) -> AppResult<Vec<test_case::Model>> {
        let result = TestCase::find()
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load test cases: {}", e)))?;

        Ok(result)
    }

    /// Insert a test case unless one with the same name exists, then read it back.
    pub async fn upsert_test_case(&self, name: &str) -> AppResult<test_case::Model> {
        let model = TestCaseActiveModel {
            id: NotSet,
            name: Set(name.to_string()),
            created_at: Set(Utc::now()),
        };

        TestCase::insert(model)
            .on_conflict(
                OnConflict::column(test_case::Column::Name)
                    .update_column(test_case::Column::Name)
                    .to_owned(),
            )
            .exec_without_returning(self.connection())
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to upsert test case {}: {}", name, e))
            })?;

        self.get_test_case_by_name(name)
            .await?
            .ok_or_else(|| AppError::Database(format!("Test {} missing after upsert", name)))
    }

    /// Get a test case by its canonical name.
    pub async fn get_test_case_by_name(&self, name: &str) -> AppResult<Option<test_case::Model>> {
        let result = TestCase::find()
            .filter(test_case::Column::Name.eq(name))
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get test case: {}", e)))?;

        Ok(result)
    }

    /// List test cases ordered by name.
    pub async fn list_test_cases(&self) -> AppResult<Vec<test_case::Model>> {
        let result = TestCase::find()
            .order_by_asc(test_case::Column::Name)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list test cases: {}", e)))?;

        Ok(result)
    }

    /// Count stored test cases.
    pub async fn count_test_cases(&self) -> AppResult<u64> {
        let count = TestCase::find()
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count test cases: {}", e)))?;

        Ok(count)
    }

    /// Load every known suite.
    pub async fn load_suites(&self) -> AppResult<Vec<test_suite::Model>> {
        let result = TestSuite::find()
            .order_by_asc(test_suite::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to load suites: {}", e)))?;

        Ok(result)
    }

    /// Insert the named suites that are not stored yet. Returns how many were added.
    pub async fn seed_suites(&self, names: &[String]) -> AppResult<u64> {
        let mut inserted = 0;

        for name in names {
            let model = TestSuiteActiveModel {
                id: NotSet,
                name: Set(name.clone()),
                created_at: Set(Utc::now()),
            };

            inserted += TestSuite::insert(model)
                .on_conflict(
                    OnConflict::column(test_suite::Column::Name)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(self.connection())
                .await
                .map_err(|e| AppError::Database(format!("Failed to seed suite {}: {}", name, e)))?;
        }

        Ok(inserted)
    }
}
