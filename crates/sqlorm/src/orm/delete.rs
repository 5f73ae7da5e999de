//! DELETE result set.

use sqlorm_core::{BindMap, Connection, Criteria, Model, Result, WriteOperation};
use sqlorm_query::{DeleteStatement, Statement};

use super::log_statement;
use super::resolution::Resolution;

/// A DELETE driven by one model instance; success marks the model deleted.
#[derive(Debug)]
pub struct DeleteResultSet<'a, M: Model, C: Connection> {
    model: &'a mut M,
    conn: &'a C,
    statement: DeleteStatement,
    result: Resolution<u64>,
}

impl<'a, M: Model, C: Connection> DeleteResultSet<'a, M, C> {
    pub(crate) fn new(model: &'a mut M, conn: &'a C, statement: DeleteStatement) -> Self {
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

    pub fn statement(&self) -> &DeleteStatement {
        &self.statement
    }

    pub fn statement_mut(&mut self) -> &mut DeleteStatement {
        &mut self.statement
    }

    pub fn where_criteria(&mut self, criteria: Criteria) -> &mut Self {
        self.statement.where_criteria(criteria);
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.result.is_resolved()
    }

    pub fn exec(&mut self) -> Result<&mut Self> {
        self.result.ensure_unresolved()?;
        let rows = self.exec_query(&self.statement)?;
        self.result.resolve(rows);
        self.model.state_mut().mark_deleted();
        Ok(self)
    }

    pub fn affected_rows(&self) -> Result<u64> {
        self.result.get("affected rows").copied()
    }

    pub fn unresolve(&mut self) -> &mut Self {
        self.result.clear();
        self
    }

    /// Run a DELETE and return the affected row count.
    pub fn exec_raw(&self, sql: &str, binds: &BindMap) -> Result<u64> {
        log_statement(sql, binds);
        self.conn
            .execute(sql, binds)
            .map_err(|e| e.into_write(WriteOperation::Delete))
    }

    pub fn exec_query(&self, statement: &DeleteStatement) -> Result<u64> {
        let sql = statement
            .statement_text()
            .map_err(|e| e.into_write(WriteOperation::Delete))?;
        self.exec_raw(&sql, &statement.bound_values())
    }
}
