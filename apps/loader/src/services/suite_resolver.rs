//! Recovers canonical test names from raw names carrying a known suite prefix.

use crate::db::DbPool;
use crate::entity::test_suite;
use crate::error::AppResult;

/// Known suites, tried longest name first so that nested prefixes such as
/// `openshift-tests-upgrade` and `openshift-tests` resolve the same way on
/// every run.
#[derive(Debug, Clone, Default)]
pub struct SuiteResolver {
    suites: Vec<(String, i64)>,
}

impl SuiteResolver {
    /// Build a resolver from `(name, id)` pairs.
    pub fn new(suites: impl IntoIterator<Item = (String, i64)>) -> Self {
        let mut suites: Vec<(String, i64)> = suites.into_iter().collect();
        suites.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
        suites.dedup_by(|a, b| a.0 == b.0);
        Self { suites }
    }

    pub fn from_models(models: Vec<test_suite::Model>) -> Self {
        Self::new(models.into_iter().map(|s| (s.name, s.id)))
    }

    /// Load the suite reference data from storage.
    pub async fn load(pool: &DbPool) -> AppResult<Self> {
        Ok(Self::from_models(pool.load_suites().await?))
    }

    /// Split `raw` into `(suite id, canonical name)`.
    ///
    /// A raw name matches a suite when it starts with `"<suite>."`. Without a
    /// match the suite is absent and the name is returned unchanged.
    pub fn resolve<'a>(&self, raw: &'a str) -> (Option<i64>, &'a str) {
        for (name, id) in &self.suites {
            if let Some(rest) = raw
                .strip_prefix(name.as_str())
                .and_then(|r| r.strip_prefix('.'))
            {
                return (Some(*id), rest);
            }
        }
        (None, raw)
    }

    pub fn len(&self) -> usize {
        self.suites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.suites.is_empty()
    }
}
