//! Core types and traits for sqlorm.
//!
//! This crate provides the foundations the other sqlorm crates build on:
//!
//! - `Value`, `BindMap` and `Row` for data crossing the driver boundary
//! - `Column`, `TableSchema` and friends describing table structure
//! - `Field<K>`, typed and dirty-tracked column values
//! - `Model` trait plus `FieldRegistrar` for declaring models
//! - `Criteria` WHERE fragments
//! - `Connection` trait for drivers
//! - class-scoped metadata caches

pub mod column;
pub mod connection;
pub mod criteria;
pub mod error;
pub mod field;
pub mod identifiers;
pub mod model;
pub mod registry;
pub mod row;
pub mod schema;
pub mod types;
pub mod validate;
pub mod value;

pub use column::Column;
pub use connection::Connection;
pub use criteria::{Criteria, Operator};
pub use error::{
    CacheError, CacheErrorKind, Error, FieldNotFoundError, NotFoundError, QueryError,
    QueryErrorKind, ResolutionError, ResolutionErrorKind, Result, SchemaError, SchemaErrorKind,
    TransactionError, TransactionErrorKind, TypeError, WriteError, WriteOperation,
};
pub use field::{
    AnyField, BinaryField, BinaryKind, BoolField, BoolKind, DateField, DateKind, DateTimeField,
    DateTimeKind, DirtyFlag, DirtyState, EnumField, EnumKind, Field, FieldKind, FloatField,
    FloatKind, IntField, IntKind, JsonField, JsonKind, SetField, SetKind, StringField, StringKind,
};
pub use identifiers::{quote_ident, quote_ident_mysql};
pub use model::{FieldRegistrar, Model, ModelState, derive_table_name};
pub use registry::{ClassCache, reset_class_caches};
pub use row::{ColumnInfo, Row};
pub use schema::{
    DatabaseSchema, ForeignKey, Index, IndexKind, ReferentialAction, TableOptions, TableSchema,
};
pub use types::SqlType;
pub use value::{BindMap, Value};
