//! Class-scoped metadata caches.
//!
//! Column descriptors, field shapes, table names and schemas are structural: they
//! depend on the model type, never on one instance's data. Each lives in a
//! [`ClassCache`] keyed by the model's `TypeId`, populated lazily and never
//! mutated after publication.

use std::any::TypeId;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, LazyLock, RwLock};

use crate::Result;
use crate::column::Column;
use crate::schema::TableSchema;

/// A write-once map from a type key to shared, immutable metadata.
///
/// Values are computed outside the lock; when two threads race on the same
/// key the first published value wins and both callers receive it.
#[derive(Debug)]
pub struct ClassCache<K, V> {
    slots: RwLock<HashMap<K, Arc<V>>>,
}

impl<K: Eq + Hash, V> ClassCache<K, V> {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Get the published value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.get(key).cloned()
    }

    /// Get the value for `key`, computing and publishing it on first use.
    pub fn get_or_try_init<F>(&self, key: K, init: F) -> Result<Arc<V>>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(found) = self.get(&key) {
            return Ok(found);
        }

        let value = Arc::new(init()?);
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(slots.entry(key).or_insert(value)))
    }

    pub fn contains(&self, key: &K) -> bool {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.contains_key(key)
    }

    pub fn len(&self) -> usize {
        let slots = self.slots.read().unwrap_or_else(|e| e.into_inner());
        slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached value.
    pub fn clear(&self) {
        let mut slots = self.slots.write().unwrap_or_else(|e| e.into_inner());
        slots.clear();
    }
}

impl<K: Eq + Hash, V> Default for ClassCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Column descriptors, one per (model type, column name).
pub(crate) static COLUMNS: LazyLock<ClassCache<(TypeId, String), Column>> =
    LazyLock::new(ClassCache::new);

/// Ordered column names per model type, derived from its validated schema.
pub(crate) static FIELD_SHAPES: LazyLock<ClassCache<TypeId, Vec<String>>> =
    LazyLock::new(ClassCache::new);

/// Table name per model type.
pub(crate) static TABLE_NAMES: LazyLock<ClassCache<TypeId, String>> =
    LazyLock::new(ClassCache::new);

/// Table schema per model type.
pub(crate) static SCHEMAS: LazyLock<ClassCache<TypeId, TableSchema>> =
    LazyLock::new(ClassCache::new);

/// Forget every cached column, field shape, table name and schema.
///
/// Only meant for test isolation: models built before the reset keep their
/// old `Arc<Column>` handles.
#[doc(hidden)]
pub fn reset_class_caches() {
    COLUMNS.clear();
    FIELD_SHAPES.clear();
    TABLE_NAMES.clear();
    SCHEMAS.clear();
}
