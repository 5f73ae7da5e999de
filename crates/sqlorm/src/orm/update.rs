//! UPDATE result set.

use sqlorm_core::{BindMap, Connection, Criteria, Error, Model, Result, WriteError, WriteOperation};
use sqlorm_query::{Statement, UpdateStatement};

use super::log_statement;
use super::resolution::Resolution;

/// An UPDATE driven by one model instance.
#[derive(Debug)]
pub struct UpdateResultSet<'a, M: Model, C: Connection> {
    model: &'a mut M,
    conn: &'a C,
    statement: UpdateStatement,
    result: Resolution<u64>,
}

impl<'a, M: Model, C: Connection> UpdateResultSet<'a, M, C> {
    pub(crate) fn new(model: &'a mut M, conn: &'a C, statement: UpdateStatement) -> Self {
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

    pub fn statement(&self) -> &UpdateStatement {
        &self.statement
    }

    pub fn statement_mut(&mut self) -> &mut UpdateStatement {
        &mut self.statement
    }

    pub fn cols(&mut self, cols: BindMap) -> &mut Self {
        self.statement.cols(cols);
        self
    }

    pub fn where_criteria(&mut self, criteria: Criteria) -> &mut Self {
        self.statement.where_criteria(criteria);
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.result.is_resolved()
    }

    /// Run the UPDATE and undirty the model.
    ///
    /// Fails with an update error when no columns are set.
    pub fn exec(&mut self) -> Result<&mut Self> {
        self.result.ensure_unresolved()?;
        if !self.statement.has_cols() {
            return Err(Error::Write(WriteError {
                operation: WriteOperation::Update,
                message: "Nothing to update".to_string(),
                source: None,
            }));
        }
        let rows = self.exec_query(&self.statement)?;
        self.result.resolve(rows);
        self.model.undirty();
        Ok(self)
    }

    pub fn affected_rows(&self) -> Result<u64> {
        self.result.get("affected rows").copied()
    }

    pub fn unresolve(&mut self) -> &mut Self {
        self.result.clear();
        self
    }

    /// Run an UPDATE and return the affected row count.
    pub fn exec_raw(&self, sql: &str, binds: &BindMap) -> Result<u64> {
        log_statement(sql, binds);
        self.conn
            .execute(sql, binds)
            .map_err(|e| e.into_write(WriteOperation::Update))
    }

    pub fn exec_query(&self, statement: &UpdateStatement) -> Result<u64> {
        let sql = statement
            .statement_text()
            .map_err(|e| e.into_write(WriteOperation::Update))?;
        self.exec_raw(&sql, &statement.bound_values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::ResultSetFactory;
    use crate::test_support::{BlogModel, Scripted};
    use sqlorm_core::Value;
    use sqlorm_query::Dialect;

    #[test]
    fn test_exec_without_cols_is_update_error() {
        let conn = Scripted::with_affected(1);
        let factory = ResultSetFactory::new(&conn, Dialect::Sqlite);
        let mut blog = BlogModel::new().unwrap();

        let mut update = factory.new_update(&mut blog).unwrap();
        let err = update.exec().unwrap_err();
        assert!(err.is_update_error());
        assert_eq!(err.to_string(), "Nothing to update");
        assert!(!update.is_resolved());
        assert!(conn.statements().is_empty());
    }

    #[test]
    fn test_exec_reports_rows_and_undirties() {
        let conn = Scripted::with_affected(1);
        let factory = ResultSetFactory::new(&conn, Dialect::Sqlite);
        let mut blog = BlogModel::new().unwrap();
        blog.id.set(5);
        blog.undirty();
        blog.title.set("renamed");
        let cols = blog.dirty_fields_to_query();
        let by_id = blog.id.eq(None);

        let mut update = factory.new_update(&mut blog).unwrap();
        assert!(update.affected_rows().unwrap_err().is_unresolved());
        update.cols(cols).where_criteria(by_id).exec().unwrap();
        assert_eq!(update.affected_rows().unwrap(), 1);
        assert!(update.exec().unwrap_err().is_resolved());

        assert!(!blog.is_dirty());
        assert_eq!(
            conn.statements()[0],
            "UPDATE \"blog\" SET \"title\" = :title WHERE \"id\" = :id"
        );
        assert_eq!(conn.binds()[0].get("id"), Some(&Value::Int(5)));
    }

    #[test]
    fn test_where_bind_colliding_with_column_is_renamed() {
        let conn = Scripted::with_affected(1);
        let factory = ResultSetFactory::new(&conn, Dialect::Sqlite);
        let mut blog = BlogModel::new().unwrap();
        blog.title.set("new");
        let cols = blog.dirty_fields_to_query();
        let by_title = blog.title.eq(Some("old".to_string()));

        let mut update = factory.new_update(&mut blog).unwrap();
        update.cols(cols).where_criteria(by_title).exec().unwrap();

        let binds = conn.binds().remove(0);
        assert_eq!(binds.get("title"), Some(&Value::from("new")));
        assert_eq!(binds.get("title_1"), Some(&Value::from("old")));
        assert_eq!(
            conn.statements()[0],
            "UPDATE \"blog\" SET \"title\" = :title WHERE \"title\" = :title_1"
        );
    }
}
