//! sqlorm - dirty-tracking active-record models over parameterized SQL.
//!
//! sqlorm maps a table onto a model struct whose columns are typed,
//! dirty-tracked fields. Writes send only what changed; every value
//! reaches the database through a named bind parameter.
//!
//! - Models declare their fields once through a `FieldRegistrar`; table
//!   name, schema and column list are derived and cached per type.
//! - [`OrmModel`] adds `insert`, `update`, `delete` and `find`, each
//!   returning a single-use result set.
//! - [`Repository`] and [`CacheRepository`] run statements outside the
//!   active-record flow, optionally through a [`CacheStorage`].
//! - [`create_table`] and [`create_database`] emit DDL for SQLite or MySQL.
//!
//! # Quick Start
//!
//! ```ignore
//! use sqlorm::prelude::*;
//! use sqlorm_sqlite::SqliteConnection;
//!
//! #[derive(Debug)]
//! struct BlogModel {
//!     id: IntField,
//!     title: StringField,
//!     state: ModelState,
//! }
//!
//! impl Model for BlogModel {
//!     fn from_row(row: &Row) -> Result<Self> {
//!         let mut fields = FieldRegistrar::<Self>::new(row);
//!         Ok(Self {
//!             id: fields.int("id", |c| c.size(11).unsigned().autoincrement())?,
//!             title: fields.varchar("title", |c| c.size(100).default_value(""))?,
//!             state: fields.finish(),
//!         })
//!     }
//!
//!     model_fields!(state; id, title);
//! }
//!
//! let conn = SqliteConnection::open_memory()?;
//! create_table::<BlogModel, _>(&conn, Dialect::Sqlite)?;
//! let factory = ResultSetFactory::new(&conn, Dialect::Sqlite);
//!
//! // Insert: only `title` is dirty, `id` comes back from the database
//! let mut blog = BlogModel::new()?;
//! blog.title.set("my blog 1");
//! blog.insert(&factory)?;
//!
//! // Query
//! let mut select = BlogModel::find(&factory, [blog.id.eq(None)])?;
//! assert_eq!(select.first()?.title.get().as_deref(), Some("my blog 1"));
//!
//! // Delete
//! blog.delete_by_pk(&factory)?;
//! assert!(blog.is_deleted());
//! ```

pub mod orm;
pub mod repository;

#[cfg(test)]
mod test_support;

pub use sqlorm_core::{
    AnyField, BinaryField, BindMap, BoolField, CacheErrorKind, Column, Connection, Criteria,
    DateField, DateTimeField, EnumField, Error, Field, FieldRegistrar, FloatField, ForeignKey,
    Index, IntField, JsonField, Model, ModelState, Operator, Result, Row, SetField, SqlType,
    StringField, TableOptions, TableSchema, Value, WriteOperation, model_fields,
};
pub use sqlorm_query::{Dialect, OrderBy, OrderDirection, Statement, StatementFactory};
pub use sqlorm_schema::{Database, create_database, create_table, drop_table};

pub use orm::{
    DeleteResultSet, InsertResultSet, OrmModel, ResultSetFactory, SelectResultSet,
    UpdateResultSet,
};
pub use repository::{
    CacheRepository, CacheStorage, MemoryCacheStorage, RawRepository, Repository,
};

/// Everything needed to declare models and run them.
pub mod prelude {
    pub use crate::{
        // Core
        AnyField,
        BinaryField,
        BoolField,
        Connection,
        Criteria,
        // Schema
        Database,
        DateField,
        DateTimeField,
        Dialect,
        EnumField,
        Error,
        FieldRegistrar,
        FloatField,
        ForeignKey,
        Index,
        IntField,
        JsonField,
        Model,
        ModelState,
        OrderBy,
        // ORM
        OrmModel,
        Repository,
        Result,
        ResultSetFactory,
        Row,
        SetField,
        StringField,
        TableOptions,
        Value,
        create_database,
        create_table,
        model_fields,
    };
}
