//! Cache-aside reads on top of [`Repository`].

use sha2::{Digest, Sha256};
use sqlorm_core::{CacheErrorKind, Connection, Error, Model, Result, Row, Value};
use sqlorm_query::{Dialect, SelectStatement, Statement};

use super::raw::NOT_FOUND;
use super::storage::{CacheStorage, cache_error};
use super::Repository;

/// A [`Repository`] whose reads go through a [`CacheStorage`].
///
/// Entries are keyed by the SELECT text plus its binds in order; single-row
/// reads use a separate `<key>:one` entry. A hit returns the stored rows; a miss, or `force`, runs the query and
/// overwrites the entry. Storage failures are cache errors and are never
/// papered over with a direct query.
#[derive(Debug)]
pub struct CacheRepository<'c, M: Model, C: Connection, S: CacheStorage> {
    repository: Repository<'c, M, C>,
    storage: &'c S,
    namespace: Option<String>,
}

impl<'c, M: Model, C: Connection, S: CacheStorage> CacheRepository<'c, M, C, S> {
    pub fn new(conn: &'c C, dialect: Dialect, storage: &'c S) -> Self {
        Self {
            repository: Repository::new(conn, dialect),
            storage,
            namespace: None,
        }
    }

    /// Prefix every key with `namespace` so repositories can share storage.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn repository(&self) -> &Repository<'c, M, C> {
        &self.repository
    }

    pub fn storage(&self) -> &'c S {
        self.storage
    }

    /// Hex SHA-256 of the JSON array `[text, [[name, value], ...]]`.
    ///
    /// Values keep their type tag, so `Text("1")` and `Int(1)` hash apart.
    pub fn generate_cache_key(&self, select: &SelectStatement) -> Result<String> {
        let text = select.statement_text()?;
        let binds = select.bound_values();
        let pairs: Vec<(&str, &Value)> = binds.iter().map(|(n, v)| (n.as_str(), v)).collect();
        let material = serde_json::to_string(&(&text, &pairs))
            .map_err(|e| Error::Custom(format!("failed to encode cache key: {}", e)))?;

        let digest = Sha256::digest(material.as_bytes());
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        Ok(match &self.namespace {
            Some(ns) => format!("{}:{}", ns, hex),
            None => hex,
        })
    }

    pub fn fetch_all_cache(&self, select: &SelectStatement, force: bool) -> Result<Vec<Row>> {
        let key = self.generate_cache_key(select)?;
        if !force && self.storage.exists(&key) {
            tracing::debug!(key = %key, "Cache hit");
            return self.load(&key);
        }

        tracing::debug!(key = %key, force, "Cache miss");
        let rows = self.repository.fetch_all(select)?;
        self.save(&key, &rows)?;
        Ok(rows)
    }

    /// Like [`fetch_all_cache`](Self::fetch_all_cache) for a single row;
    /// not-found results are not cached.
    pub fn fetch_one_cache(&self, select: &SelectStatement, force: bool) -> Result<Row> {
        let key = one_key(&self.generate_cache_key(select)?);
        if !force && self.storage.exists(&key) {
            tracing::debug!(key = %key, "Cache hit");
            return self
                .load(&key)?
                .into_iter()
                .next()
                .ok_or_else(|| Error::not_found(NOT_FOUND, None));
        }

        tracing::debug!(key = %key, force, "Cache miss");
        let row = self.repository.fetch_one(select)?;
        self.save(&key, std::slice::from_ref(&row))?;
        Ok(row)
    }

    pub fn find_all_cache(&self, select: &SelectStatement, force: bool) -> Result<Vec<M>> {
        M::new_from_rows(&self.fetch_all_cache(select, force)?)
    }

    pub fn find_one_cache(&self, select: &SelectStatement, force: bool) -> Result<M> {
        M::new_from_row(&self.fetch_one_cache(select, force)?)
    }

    /// Drop the cached results of `select`, both the row list and the
    /// single row; returns whether either existed.
    pub fn invalidate(&self, select: &SelectStatement) -> Result<bool> {
        let key = self.generate_cache_key(select)?;
        let all = self.invalidate_key(&key)?;
        let one = self.invalidate_key(&one_key(&key))?;
        Ok(all || one)
    }

    fn invalidate_key(&self, key: &str) -> Result<bool> {
        tracing::debug!(key = %key, "Invalidating cache entry");
        self.storage
            .invalidate(key)
            .map_err(|e| as_cache_error(e, CacheErrorKind::Invalidate, key))
    }

    fn load(&self, key: &str) -> Result<Vec<Row>> {
        self.storage
            .load(key)
            .map_err(|e| as_cache_error(e, CacheErrorKind::Load, key))
    }

    fn save(&self, key: &str, rows: &[Row]) -> Result<()> {
        self.storage
            .save(key, rows)
            .map_err(|e| as_cache_error(e, CacheErrorKind::Save, key))
    }
}

fn one_key(key: &str) -> String {
    format!("{}:one", key)
}

fn as_cache_error(err: Error, kind: CacheErrorKind, key: &str) -> Error {
    if err.is_cache_error() {
        err
    } else {
        cache_error(kind, key, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryCacheStorage;
    use crate::test_support::{BlogModel, Scripted};
    use sqlorm_core::{BindMap, Criteria, Operator};

    fn blog_rows() -> Vec<Row> {
        vec![
            Row::from_pairs([("id", Value::Int(1)), ("title", Value::from("a"))]),
            Row::from_pairs([("id", Value::Int(2)), ("title", Value::from("b"))]),
        ]
    }

    /// Refuses every write.
    struct ReadOnlyStorage;

    impl CacheStorage for ReadOnlyStorage {
        fn exists(&self, _key: &str) -> bool {
            false
        }

        fn load(&self, key: &str) -> Result<Vec<Row>> {
            Err(cache_error(CacheErrorKind::Missing, key, "empty"))
        }

        fn save(&self, _key: &str, _rows: &[Row]) -> Result<()> {
            Err(Error::Custom("read-only".to_string()))
        }

        fn invalidate(&self, _key: &str) -> Result<bool> {
            Ok(false)
        }
    }

    #[test]
    fn test_second_fetch_is_served_from_cache() {
        let conn = Scripted::with_rows(blog_rows());
        let storage = MemoryCacheStorage::new();
        let repo = CacheRepository::<BlogModel, _, _>::new(&conn, Dialect::Sqlite, &storage);
        let select = repo.repository().new_select([]).unwrap();

        assert_eq!(repo.fetch_all_cache(&select, false).unwrap().len(), 2);
        assert_eq!(repo.fetch_all_cache(&select, false).unwrap().len(), 2);
        assert_eq!(conn.statements().len(), 1);

        assert_eq!(repo.fetch_all_cache(&select, true).unwrap().len(), 2);
        assert_eq!(conn.statements().len(), 2);
    }

    #[test]
    fn test_fetch_one_cache_and_invalidate() {
        let conn = Scripted::with_rows(blog_rows());
        let storage = MemoryCacheStorage::new();
        let repo = CacheRepository::<BlogModel, _, _>::new(&conn, Dialect::Sqlite, &storage);
        let select = repo.repository().new_select([]).unwrap();

        let blog = repo.find_one_cache(&select, false).unwrap();
        assert_eq!(blog.id.get(), Some(1));
        let row = repo.fetch_one_cache(&select, false).unwrap();
        assert_eq!(row.get_by_name("title"), Some(&Value::from("a")));
        assert_eq!(conn.statements().len(), 1);

        assert!(repo.invalidate(&select).unwrap());
        assert!(storage.is_empty());
        repo.fetch_one_cache(&select, false).unwrap();
        assert_eq!(conn.statements().len(), 2);
    }

    #[test]
    fn test_not_found_is_not_cached() {
        let conn = Scripted::default();
        let storage = MemoryCacheStorage::new();
        let repo = CacheRepository::<BlogModel, _, _>::new(&conn, Dialect::Sqlite, &storage);
        let select = repo.repository().new_select([]).unwrap();

        assert!(repo.fetch_one_cache(&select, false).unwrap_err().is_not_found());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_cache_key_tracks_text_and_binds() {
        let conn = Scripted::default();
        let storage = MemoryCacheStorage::new();
        let repo = CacheRepository::<BlogModel, _, _>::new(&conn, Dialect::Sqlite, &storage);
        let proto = BlogModel::new().unwrap();
        let repository = repo.repository();

        let one = repository.new_select([proto.id.eq(Some(1))]).unwrap();
        let same = repository.new_select([proto.id.eq(Some(1))]).unwrap();
        let two = repository.new_select([proto.id.eq(Some(2))]).unwrap();
        let key = repo.generate_cache_key(&one).unwrap();

        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key, repo.generate_cache_key(&same).unwrap());
        assert_ne!(key, repo.generate_cache_key(&two).unwrap());

        let ab = repository
            .new_select([
                proto.id.eq(Some(1)),
                Criteria::compare("title", Operator::Eq, Value::from("a")),
            ])
            .unwrap();
        let mut ba_binds = BindMap::new();
        ba_binds.insert("title".to_string(), Value::from("a"));
        ba_binds.insert("id".to_string(), Value::Int(1));
        let ba = repository
            .new_select([Criteria::new("\"id\" = :id AND \"title\" = :title", ba_binds)])
            .unwrap();
        assert_eq!(ab.statement_text().unwrap(), ba.statement_text().unwrap());
        assert_ne!(
            repo.generate_cache_key(&ab).unwrap(),
            repo.generate_cache_key(&ba).unwrap()
        );
    }

    #[test]
    fn test_cache_key_separates_lookalike_binds() {
        let conn = Scripted::default();
        let storage = MemoryCacheStorage::new();
        let repo = CacheRepository::<BlogModel, _, _>::new(&conn, Dialect::Sqlite, &storage);
        let repository = repo.repository();
        let select = |a: Value, b: Value| {
            let mut binds = BindMap::new();
            binds.insert("a".to_string(), a);
            binds.insert("b".to_string(), b);
            repository
                .new_select([Criteria::new("title = :a OR title = :b", binds)])
                .unwrap()
        };

        let left = select(Value::from("x::b=y"), Value::from("z"));
        let right = select(Value::from("x"), Value::from("y::b=z"));
        assert_eq!(left.statement_text().unwrap(), right.statement_text().unwrap());
        assert_ne!(
            repo.generate_cache_key(&left).unwrap(),
            repo.generate_cache_key(&right).unwrap()
        );

        let text = select(Value::from("1"), Value::Null);
        let int = select(Value::Int(1), Value::from("NULL"));
        assert_ne!(
            repo.generate_cache_key(&text).unwrap(),
            repo.generate_cache_key(&int).unwrap()
        );
    }

    #[test]
    fn test_row_and_list_entries_are_kept_apart() {
        let conn = Scripted::with_rows(blog_rows());
        let storage = MemoryCacheStorage::new();
        let repo = CacheRepository::<BlogModel, _, _>::new(&conn, Dialect::Sqlite, &storage);
        let select = repo.repository().new_select([]).unwrap();

        repo.fetch_one_cache(&select, false).unwrap();
        assert_eq!(repo.fetch_all_cache(&select, false).unwrap().len(), 2);
        assert_eq!(storage.len(), 2);
        assert!(repo.invalidate(&select).unwrap());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_namespace_prefixes_keys() {
        let conn = Scripted::default();
        let storage = MemoryCacheStorage::new();
        let repo = CacheRepository::<BlogModel, _, _>::new(&conn, Dialect::Sqlite, &storage)
            .with_namespace("blogs");
        let select = repo.repository().new_select([]).unwrap();

        assert!(repo.generate_cache_key(&select).unwrap().starts_with("blogs:"));
    }

    #[test]
    fn test_storage_failure_is_cache_error() {
        let conn = Scripted::with_rows(blog_rows());
        let storage = ReadOnlyStorage;
        let repo = CacheRepository::<BlogModel, _, _>::new(&conn, Dialect::Sqlite, &storage);
        let select = repo.repository().new_select([]).unwrap();

        match repo.fetch_all_cache(&select, false) {
            Err(Error::Cache(e)) => {
                assert_eq!(e.kind, CacheErrorKind::Save);
                assert!(e.message.contains("read-only"));
            }
            other => panic!("expected cache error, got {other:?}"),
        }
    }
}
