//! SELECT result set.

use std::marker::PhantomData;

use sqlorm_core::{BindMap, Connection, Criteria, Error, Model, Result, Row};
use sqlorm_query::{OrderBy, SelectStatement, Statement};

use super::log_statement;
use super::resolution::Resolution;

const NOT_FOUND: &str = "Database record not found";

/// A SELECT that hydrates `M` instances.
///
/// Without explicit columns the select list is every column of `M`.
#[derive(Debug)]
pub struct SelectResultSet<'a, M: Model, C: Connection> {
    conn: &'a C,
    statement: SelectStatement,
    result: Resolution<Vec<M>>,
    _model: PhantomData<fn() -> M>,
}

impl<'a, M: Model, C: Connection> SelectResultSet<'a, M, C> {
    pub(crate) fn new(conn: &'a C, statement: SelectStatement) -> Self {
        Self {
            conn,
            statement,
            result: Resolution::new(),
            _model: PhantomData,
        }
    }

    pub fn statement(&self) -> &SelectStatement {
        &self.statement
    }

    pub fn statement_mut(&mut self) -> &mut SelectStatement {
        &mut self.statement
    }

    pub fn cols<I, S>(&mut self, cols: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.statement.cols(cols);
        self
    }

    pub fn where_criteria(&mut self, criteria: Criteria) -> &mut Self {
        self.statement.where_criteria(criteria);
        self
    }

    pub fn order_by(&mut self, order: OrderBy) -> &mut Self {
        self.statement.order_by(order);
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.statement.limit(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.statement.offset(offset);
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.result.is_resolved()
    }

    /// Run the query and hydrate the first row.
    ///
    /// Fails with a not-found error when the query returns no rows.
    pub fn first(&mut self) -> Result<&M> {
        self.result.ensure_unresolved()?;
        self.default_cols()?;
        let row = self.fetch_query(&self.statement)?;
        let model = M::new_from_row(&row)?;
        let models = self.result.resolve(vec![model]);
        Ok(&models[0])
    }

    /// Run the query and hydrate every row.
    pub fn all(&mut self) -> Result<&[M]> {
        self.result.ensure_unresolved()?;
        self.default_cols()?;
        let rows = self.fetch_all_query(&self.statement)?;
        let models = M::new_from_rows(&rows)?;
        Ok(self.result.resolve(models).as_slice())
    }

    /// The first hydrated model of a resolved result.
    pub fn result_first(&self) -> Result<&M> {
        self.result
            .get("result")?
            .first()
            .ok_or_else(|| Error::not_found(NOT_FOUND, None))
    }

    pub fn result_all(&self) -> Result<&[M]> {
        Ok(self.result.get("result")?.as_slice())
    }

    /// Consume the result set, keeping the hydrated models.
    pub fn into_models(mut self) -> Result<Vec<M>> {
        self.result.take("result")
    }

    /// Drop the result so the query can run again.
    pub fn unresolve(&mut self) -> &mut Self {
        self.result.clear();
        self
    }

    pub fn fetch_raw(&self, sql: &str, binds: &BindMap) -> Result<Row> {
        log_statement(sql, binds);
        self.conn
            .query_one(sql, binds)?
            .ok_or_else(|| Error::not_found(NOT_FOUND, Some(sql.to_string())))
    }

    pub fn fetch_all_raw(&self, sql: &str, binds: &BindMap) -> Result<Vec<Row>> {
        log_statement(sql, binds);
        self.conn.query(sql, binds)
    }

    pub fn fetch_query(&self, statement: &SelectStatement) -> Result<Row> {
        self.fetch_raw(&statement.statement_text()?, &statement.bound_values())
    }

    pub fn fetch_all_query(&self, statement: &SelectStatement) -> Result<Vec<Row>> {
        self.fetch_all_raw(&statement.statement_text()?, &statement.bound_values())
    }

    fn default_cols(&mut self) -> Result<()> {
        if !self.statement.has_cols() {
            let cols = M::column_names()?;
            self.statement.cols(cols.iter().cloned());
        }
        Ok(())
    }
}
