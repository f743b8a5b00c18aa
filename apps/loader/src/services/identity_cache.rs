//! In-memory name -> record caches for jobs and tests.
//!
//! A cache lives for one ingestion pass. It is loaded from storage up front
//! and updated by the upsert service after each successful write; the cache
//! itself never touches the database.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::db::DbPool;
use crate::entity::{test_case, test_job};
use crate::error::AppResult;

/// Cache of stored jobs keyed by job name.
pub type JobCache = IdentityCache<test_job::Model>;

/// Cache of stored tests keyed by canonical test name.
pub type TestCache = IdentityCache<test_case::Model>;

/// Thread-safe natural-key cache. Locks are held only for the map access.
pub struct IdentityCache<M> {
    kind: &'static str,
    entries: RwLock<HashMap<String, Arc<M>>>,
}

impl<M> IdentityCache<M> {
    /// Create an empty cache.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Build a cache from `(name, record)` pairs. The first record for a name wins.
    pub fn from_records(kind: &'static str, records: impl IntoIterator<Item = (String, M)>) -> Self {
        let mut entries = HashMap::new();
        for (name, record) in records {
            entries.entry(name).or_insert_with(|| Arc::new(record));
        }
        debug!("{} cache created with {} entries", kind, entries.len());
        Self {
            kind,
            entries: RwLock::new(entries),
        }
    }

    /// Look up a record by name.
    pub fn get(&self, name: &str) -> Option<Arc<M>> {
        self.entries
            .read()
            .expect("identity cache lock poisoned")
            .get(name)
            .cloned()
    }

    /// Store the freshly persisted record for `name`, replacing any previous one.
    /// Returns true when the name was not cached before.
    pub fn put(&self, name: String, record: M) -> (Arc<M>, bool) {
        let record = Arc::new(record);
        let mut entries = self.entries.write().expect("identity cache lock poisoned");
        let fresh = !entries.contains_key(&name);
        if fresh {
            debug!("{} cache: added '{}'", self.kind, name);
        }
        entries.insert(name, record.clone());
        (record, fresh)
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("identity cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All cached names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .entries
            .read()
            .expect("identity cache lock poisoned")
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}

/// Load every stored job into a fresh cache.
pub async fn load_job_cache(pool: &DbPool) -> AppResult<JobCache> {
    let jobs = pool.load_jobs().await?;
    Ok(IdentityCache::from_records(
        "job",
        jobs.into_iter().map(|j| (j.name.clone(), j)),
    ))
}

/// Load every stored test into a fresh cache.
pub async fn load_test_cache(pool: &DbPool) -> AppResult<TestCache> {
    let tests = pool.load_test_cases().await?;
    Ok(IdentityCache::from_records(
        "test",
        tests.into_iter().map(|t| (t.name.clone(), t)),
    ))
}
