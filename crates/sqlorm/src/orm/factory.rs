//! Result set factory.

use sqlorm_core::{Connection, Model, Result};
use sqlorm_query::{Dialect, StatementFactory};

use super::{DeleteResultSet, InsertResultSet, SelectResultSet, UpdateResultSet};

/// Mints result sets bound to one connection.
///
/// Each result set is preset with the model's table name; callers add
/// columns and criteria before executing it.
///
/// # Example
///
/// ```ignore
/// let conn = SqliteConnection::open_memory()?;
/// let factory = ResultSetFactory::new(&conn, Dialect::Sqlite);
///
/// let mut blog = BlogModel::new()?;
/// blog.title.set("blog2");
/// let id = blog.insert(&factory)?.last_inserted_id()?.to_string();
/// ```
#[derive(Debug)]
pub struct ResultSetFactory<'c, C: Connection> {
    conn: &'c C,
    statements: StatementFactory,
}

impl<C: Connection> Clone for ResultSetFactory<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: Connection> Copy for ResultSetFactory<'_, C> {}

impl<'c, C: Connection> ResultSetFactory<'c, C> {
    pub fn new(conn: &'c C, dialect: Dialect) -> Self {
        Self::with_statements(conn, StatementFactory::new(dialect))
    }

    pub fn with_statements(conn: &'c C, statements: StatementFactory) -> Self {
        Self { conn, statements }
    }

    pub fn connection(&self) -> &'c C {
        self.conn
    }

    pub fn statements(&self) -> StatementFactory {
        self.statements
    }

    /// A SELECT on `M`'s table with no columns or criteria yet.
    pub fn new_select<M: Model>(&self) -> Result<SelectResultSet<'c, M, C>> {
        let table = M::table_name()?;
        Ok(SelectResultSet::new(
            self.conn,
            self.statements.new_select(&table),
        ))
    }

    /// An INSERT into `model`'s table with no columns yet.
    pub fn new_insert<'a, M: Model>(&self, model: &'a mut M) -> Result<InsertResultSet<'a, M, C>>
    where
        'c: 'a,
    {
        let table = M::table_name()?;
        Ok(InsertResultSet::new(
            model,
            self.conn,
            self.statements.new_insert(&table),
        ))
    }

    /// An UPDATE of `model`'s table with no columns or criteria yet.
    pub fn new_update<'a, M: Model>(&self, model: &'a mut M) -> Result<UpdateResultSet<'a, M, C>>
    where
        'c: 'a,
    {
        let table = M::table_name()?;
        Ok(UpdateResultSet::new(
            model,
            self.conn,
            self.statements.new_update(&table),
        ))
    }

    /// A DELETE from `model`'s table with no criteria yet.
    pub fn new_delete<'a, M: Model>(&self, model: &'a mut M) -> Result<DeleteResultSet<'a, M, C>>
    where
        'c: 'a,
    {
        let table = M::table_name()?;
        Ok(DeleteResultSet::new(
            model,
            self.conn,
            self.statements.new_delete(&table),
        ))
    }
}
