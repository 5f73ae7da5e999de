//! Database schema aggregation.

use std::any::TypeId;
use std::sync::{Arc, LazyLock};

use sqlorm_core::{ClassCache, DatabaseSchema, Result, TableOptions, TableSchema};

static DATABASES: LazyLock<ClassCache<TypeId, DatabaseSchema>> = LazyLock::new(ClassCache::new);

/// A named group of model tables.
///
/// # Example
///
/// ```ignore
/// struct BlogApp;
///
/// impl Database for BlogApp {
///     const NAME: &'static str = "blog_app";
///
///     fn tables() -> Result<Vec<Arc<TableSchema>>> {
///         Ok(vec![BlogModel::schema()?, PostModel::schema()?])
///     }
/// }
///
/// let schema = BlogApp::schema()?;
/// ```
pub trait Database: 'static {
    /// Database name.
    const NAME: &'static str;

    /// Engine, charset and collation shared by the tables (`name` is unused).
    fn options() -> TableOptions {
        TableOptions::default()
    }

    /// Table schemas in creation order.
    fn tables() -> Result<Vec<Arc<TableSchema>>>;

    /// The database schema, built once per implementing type.
    fn schema() -> Result<Arc<DatabaseSchema>> {
        DATABASES.get_or_try_init(TypeId::of::<Self>(), || {
            let tables = Self::tables()?;
            tracing::debug!(
                database = Self::NAME,
                tables = tables.len(),
                "Building database schema"
            );
            DatabaseSchema::new(Self::NAME, tables, Self::options())
        })
    }
}

/// Forget every cached database schema.
#[doc(hidden)]
pub fn reset_database_cache() {
    DATABASES.clear();
}
