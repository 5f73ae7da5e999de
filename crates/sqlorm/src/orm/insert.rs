//! INSERT result set.

use sqlorm_core::{BindMap, Connection, Model, Result, WriteOperation};
use sqlorm_query::{InsertStatement, Statement};

use super::log_statement;
use super::resolution::Resolution;

/// An INSERT of one model instance.
///
/// On success the generated key is written back into the model's primary
/// key field when it has one, and the model is undirtied.
#[derive(Debug)]
pub struct InsertResultSet<'a, M: Model, C: Connection> {
    model: &'a mut M,
    conn: &'a C,
    statement: InsertStatement,
    result: Resolution<String>,
}

impl<'a, M: Model, C: Connection> InsertResultSet<'a, M, C> {
    pub(crate) fn new(model: &'a mut M, conn: &'a C, statement: InsertStatement) -> Self {
        Self {
            model,
            conn,
            statement,
            result: Resolution::new(),
        }
    }

    pub fn model(&self) -> &M {
        self.model
    }

    pub fn statement(&self) -> &InsertStatement {
        &self.statement
    }

    pub fn statement_mut(&mut self) -> &mut InsertStatement {
        &mut self.statement
    }

    pub fn cols(&mut self, cols: BindMap) -> &mut Self {
        self.statement.cols(cols);
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.result.is_resolved()
    }

    pub fn exec(&mut self) -> Result<&mut Self> {
        self.result.ensure_unresolved()?;
        let id = self.exec_query(&self.statement)?;
        self.propagate_id(&id)?;
        self.result.resolve(id);
        self.model.state_mut().set_new(false);
        self.model.undirty();
        Ok(self)
    }

    /// The generated key reported by the driver.
    pub fn last_inserted_id(&self) -> Result<&str> {
        Ok(self.result.get("last inserted id")?.as_str())
    }

    pub fn unresolve(&mut self) -> &mut Self {
        self.result.clear();
        self
    }

    /// Run an INSERT and return the generated key.
    pub fn exec_raw(&self, sql: &str, binds: &BindMap) -> Result<String> {
        log_statement(sql, binds);
        self.conn
            .execute(sql, binds)
            .and_then(|_| self.conn.last_insert_id())
            .map_err(|e| e.into_write(WriteOperation::Insert))
    }

    pub fn exec_query(&self, statement: &InsertStatement) -> Result<String> {
        let sql = statement
            .statement_text()
            .map_err(|e| e.into_write(WriteOperation::Insert))?;
        self.exec_raw(&sql, &statement.bound_values())
    }

    fn propagate_id(&mut self, id: &str) -> Result<()> {
        match self.model.pk_mut() {
            Ok(pk) => {
                if !pk.set_from_insert_id(id) {
                    tracing::warn!(
                        model = M::model_name(),
                        column = pk.column_name(),
                        id = %id,
                        "Generated key does not fit the primary key field"
                    );
                }
                Ok(())
            }
            Err(e) if e.is_field_not_found() => {
                tracing::warn!(
                    model = M::model_name(),
                    "No primary key to receive the generated key"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
