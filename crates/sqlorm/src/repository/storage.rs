//! Cache storage backends for [`CacheRepository`](super::CacheRepository).

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use sqlorm_core::{CacheError, CacheErrorKind, Error, Result, Row};

/// Key/value storage for cached query results.
pub trait CacheStorage: Send + Sync {
    fn exists(&self, key: &str) -> bool;

    /// Rows stored under `key`; a missing key is a `Cache(Missing)` error.
    fn load(&self, key: &str) -> Result<Vec<Row>>;

    fn save(&self, key: &str, rows: &[Row]) -> Result<()>;

    /// Drop `key`; returns whether anything was stored under it.
    fn invalidate(&self, key: &str) -> Result<bool>;
}

/// Build a cache error for `key`.
pub fn cache_error(kind: CacheErrorKind, key: &str, message: impl Into<String>) -> Error {
    Error::Cache(CacheError {
        kind,
        key: key.to_string(),
        message: message.into(),
    })
}

/// In-process storage behind a mutex.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    entries: Mutex<HashMap<String, Vec<Row>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Vec<Row>>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl CacheStorage for MemoryCacheStorage {
    fn exists(&self, key: &str) -> bool {
        self.entries().contains_key(key)
    }

    fn load(&self, key: &str) -> Result<Vec<Row>> {
        self.entries()
            .get(key)
            .cloned()
            .ok_or_else(|| cache_error(CacheErrorKind::Missing, key, "cache entry does not exist"))
    }

    fn save(&self, key: &str, rows: &[Row]) -> Result<()> {
        self.entries().insert(key.to_string(), rows.to_vec());
        Ok(())
    }

    fn invalidate(&self, key: &str) -> Result<bool> {
        Ok(self.entries().remove(key).is_some())
    }
}
