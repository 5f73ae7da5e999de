//! Schema aggregation and DDL generation for sqlorm.
//!
//! This crate provides:
//! - the [`Database`] trait grouping model tables under one name
//! - DDL generation for SQLite and MySQL
//! - helpers executing that DDL over a [`Connection`]

pub mod database;
pub mod ddl;

pub use database::{Database, reset_database_cache};
pub use ddl::{DdlGenerator, MysqlDdlGenerator, SqliteDdlGenerator, generator_for_dialect};

use sqlorm_core::{BindMap, Connection, Error, Model, Result};
use sqlorm_query::Dialect;

fn generator(dialect: Dialect) -> Result<Box<dyn DdlGenerator>> {
    generator_for_dialect(dialect)
        .ok_or_else(|| Error::Custom(format!("no DDL generator for {:?}", dialect)))
}

fn run_all<C: Connection>(conn: &C, statements: &[String]) -> Result<()> {
    for sql in statements {
        conn.execute(sql, &BindMap::new())?;
    }
    Ok(())
}

/// Create the table (and secondary indexes) of model `M`.
pub fn create_table<M: Model, C: Connection>(conn: &C, dialect: Dialect) -> Result<()> {
    let schema = M::schema()?;
    run_all(conn, &generator(dialect)?.create_table(&schema))
}

/// Create every table of database `D`.
///
/// For MySQL this also creates the database itself and switches to it.
pub fn create_database<D: Database, C: Connection>(conn: &C, dialect: Dialect) -> Result<()> {
    let schema = D::schema()?;
    run_all(conn, &generator(dialect)?.create_database(&schema))
}

/// Drop the table of model `M` if it exists.
pub fn drop_table<M: Model, C: Connection>(conn: &C, dialect: Dialect) -> Result<()> {
    let name = M::table_name()?;
    conn.execute(&generator(dialect)?.drop_table(&name), &BindMap::new())?;
    Ok(())
}
