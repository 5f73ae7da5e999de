//! Parameterized SELECT, INSERT, UPDATE and DELETE statements.
//!
//! Statements only assemble SQL text around named placeholders; values
//! never reach the text. Column values live in the statement's bind map
//! under the column name, WHERE values under their criteria bind names.

use sqlorm_core::{BindMap, Criteria, Error, QueryError, QueryErrorKind, Result};

use crate::clause::{OrderBy, WhereClause};
use crate::dialect::Dialect;

/// A statement ready for execution.
pub trait Statement {
    /// SQL text with `:name` placeholders.
    fn statement_text(&self) -> Result<String>;

    /// Values for every placeholder in [`statement_text`](Statement::statement_text).
    fn bound_values(&self) -> BindMap;
}

fn incomplete(what: &str) -> Error {
    Error::Query(QueryError {
        kind: QueryErrorKind::Prepare,
        sql: None,
        message: what.to_string(),
        code: None,
        source: None,
    })
}

fn with_where(
    mut sql: String,
    dialect: Dialect,
    clause: &WhereClause,
    reserved: &BindMap,
) -> Result<String> {
    if let Some((cond, _)) = clause.render(dialect, reserved)? {
        sql.push_str(" WHERE ");
        sql.push_str(&cond);
    }
    Ok(sql)
}

fn traced(sql: String) -> String {
    tracing::trace!(sql = %sql, "Rendered statement");
    sql
}

/// SELECT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    dialect: Dialect,
    table: Option<String>,
    cols: Vec<String>,
    where_clause: WhereClause,
    order_by: Vec<OrderBy>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SelectStatement {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            table: None,
            cols: Vec::new(),
            where_clause: WhereClause::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn from(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = Some(table.into());
        self
    }

    /// Append columns to the select list.
    pub fn cols<I, S>(&mut self, cols: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cols.extend(cols.into_iter().map(Into::into));
        self
    }

    pub fn get_cols(&self) -> &[String] {
        &self.cols
    }

    pub fn has_cols(&self) -> bool {
        !self.cols.is_empty()
    }

    pub fn where_criteria(&mut self, criteria: Criteria) -> &mut Self {
        self.where_clause.push(criteria);
        self
    }

    pub fn order_by(&mut self, order: OrderBy) -> &mut Self {
        self.order_by.push(order);
        self
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn where_clause(&self) -> &WhereClause {
        &self.where_clause
    }
}

impl Statement for SelectStatement {
    fn statement_text(&self) -> Result<String> {
        let table = self
            .table
            .as_deref()
            .ok_or_else(|| incomplete("SELECT statement has no table"))?;
        let cols = if self.cols.is_empty() {
            "*".to_string()
        } else {
            self.dialect.quote_list(&self.cols)
        };
        let sql = format!("SELECT {} FROM {}", cols, self.dialect.quote_identifier(table));
        let mut sql = with_where(sql, self.dialect, &self.where_clause, &BindMap::new())?;

        if !self.order_by.is_empty() {
            let terms: Vec<String> = self.order_by.iter().map(|o| o.to_sql(self.dialect)).collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }
        sql.push_str(&self.dialect.limit_offset(self.limit, self.offset));
        Ok(traced(sql))
    }

    fn bound_values(&self) -> BindMap {
        self.where_clause.binds(&BindMap::new())
    }
}

/// INSERT statement.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    dialect: Dialect,
    table: Option<String>,
    cols: BindMap,
}

impl InsertStatement {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            table: None,
            cols: BindMap::new(),
        }
    }

    pub fn into_table(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = Some(table.into());
        self
    }

    /// Set column values; later values for the same column win.
    pub fn cols(&mut self, cols: BindMap) -> &mut Self {
        self.cols.extend(cols);
        self
    }

    pub fn get_cols(&self) -> &BindMap {
        &self.cols
    }

    pub fn has_cols(&self) -> bool {
        !self.cols.is_empty()
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }
}

impl Statement for InsertStatement {
    fn statement_text(&self) -> Result<String> {
        let table = self
            .table
            .as_deref()
            .ok_or_else(|| incomplete("INSERT statement has no table"))?;
        let table = self.dialect.quote_identifier(table);

        if self.cols.is_empty() {
            return Ok(traced(format!(
                "INSERT INTO {} {}",
                table,
                self.dialect.default_values_insert()
            )));
        }

        let names: Vec<&String> = self.cols.keys().collect();
        let placeholders: Vec<String> = names.iter().map(|n| format!(":{}", n)).collect();
        Ok(traced(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            self.dialect.quote_list(&names),
            placeholders.join(", ")
        )))
    }

    fn bound_values(&self) -> BindMap {
        self.cols.clone()
    }
}

/// UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    dialect: Dialect,
    table: Option<String>,
    cols: BindMap,
    where_clause: WhereClause,
}

impl UpdateStatement {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            table: None,
            cols: BindMap::new(),
            where_clause: WhereClause::new(),
        }
    }

    pub fn table(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = Some(table.into());
        self
    }

    /// Set column values; later values for the same column win.
    pub fn cols(&mut self, cols: BindMap) -> &mut Self {
        self.cols.extend(cols);
        self
    }

    pub fn get_cols(&self) -> &BindMap {
        &self.cols
    }

    pub fn has_cols(&self) -> bool {
        !self.cols.is_empty()
    }

    pub fn where_criteria(&mut self, criteria: Criteria) -> &mut Self {
        self.where_clause.push(criteria);
        self
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn where_clause(&self) -> &WhereClause {
        &self.where_clause
    }
}

impl Statement for UpdateStatement {
    fn statement_text(&self) -> Result<String> {
        let table = self
            .table
            .as_deref()
            .ok_or_else(|| incomplete("UPDATE statement has no table"))?;
        if self.cols.is_empty() {
            return Err(incomplete("UPDATE statement has no columns"));
        }

        let sets: Vec<String> = self
            .cols
            .keys()
            .map(|n| format!("{} = :{}", self.dialect.quote_identifier(n), n))
            .collect();
        let sql = format!(
            "UPDATE {} SET {}",
            self.dialect.quote_identifier(table),
            sets.join(", ")
        );
        Ok(traced(with_where(sql, self.dialect, &self.where_clause, &self.cols)?))
    }

    fn bound_values(&self) -> BindMap {
        let mut binds = self.cols.clone();
        binds.extend(self.where_clause.binds(&self.cols));
        binds
    }
}

/// DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    dialect: Dialect,
    table: Option<String>,
    where_clause: WhereClause,
}

impl DeleteStatement {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            table: None,
            where_clause: WhereClause::new(),
        }
    }

    pub fn from(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = Some(table.into());
        self
    }

    pub fn where_criteria(&mut self, criteria: Criteria) -> &mut Self {
        self.where_clause.push(criteria);
        self
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn where_clause(&self) -> &WhereClause {
        &self.where_clause
    }
}

impl Statement for DeleteStatement {
    fn statement_text(&self) -> Result<String> {
        let table = self
            .table
            .as_deref()
            .ok_or_else(|| incomplete("DELETE statement has no table"))?;
        let sql = format!("DELETE FROM {}", self.dialect.quote_identifier(table));
        Ok(traced(with_where(sql, self.dialect, &self.where_clause, &BindMap::new())?))
    }

    fn bound_values(&self) -> BindMap {
        self.where_clause.binds(&BindMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlorm_core::{Operator, Value};

    fn binds(pairs: &[(&str, Value)]) -> BindMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_select_defaults_to_star() {
        let mut select = SelectStatement::new(Dialect::Sqlite);
        select.from("blog");
        assert_eq!(select.statement_text().unwrap(), "SELECT * FROM \"blog\"");
        assert!(select.bound_values().is_empty());
    }

    #[test]
    fn test_select_full() {
        let mut select = SelectStatement::new(Dialect::Sqlite);
        select
            .from("blog")
            .cols(["id", "title"])
            .where_criteria(Criteria::compare("id", Operator::Gte, Value::Int(2)))
            .order_by(OrderBy::desc("id"))
            .limit(10)
            .offset(20);
        assert_eq!(
            select.statement_text().unwrap(),
            "SELECT \"id\", \"title\" FROM \"blog\" WHERE \"id\" >= :id ORDER BY \"id\" DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(select.bound_values(), binds(&[("id", Value::Int(2))]));
        assert!(select.has_cols());
    }

    #[test]
    fn test_missing_table_is_an_error() {
        let select = SelectStatement::new(Dialect::Sqlite);
        assert!(matches!(
            select.statement_text(),
            Err(Error::Query(QueryError { kind: QueryErrorKind::Prepare, .. }))
        ));
    }

    #[test]
    fn test_insert() {
        let mut insert = InsertStatement::new(Dialect::Mysql);
        insert
            .into_table("blog")
            .cols(binds(&[("title", Value::from("blog2")), ("views", Value::Int(0))]));
        assert_eq!(
            insert.statement_text().unwrap(),
            "INSERT INTO `blog` (`title`, `views`) VALUES (:title, :views)"
        );
        assert_eq!(insert.bound_values().len(), 2);
    }

    #[test]
    fn test_insert_without_cols() {
        let mut insert = InsertStatement::new(Dialect::Sqlite);
        insert.into_table("blog");
        assert!(!insert.has_cols());
        assert_eq!(insert.statement_text().unwrap(), "INSERT INTO \"blog\" DEFAULT VALUES");
    }

    #[test]
    fn test_update_renames_where_binds_colliding_with_cols() {
        let mut update = UpdateStatement::new(Dialect::Sqlite);
        update
            .table("blog")
            .cols(binds(&[("id", Value::Int(7)), ("title", Value::from("x"))]))
            .where_criteria(Criteria::compare("id", Operator::Eq, Value::Int(3)));
        assert_eq!(
            update.statement_text().unwrap(),
            "UPDATE \"blog\" SET \"id\" = :id, \"title\" = :title WHERE \"id\" = :id_1"
        );
        assert_eq!(
            update.bound_values(),
            binds(&[
                ("id", Value::Int(7)),
                ("title", Value::from("x")),
                ("id_1", Value::Int(3)),
            ])
        );
    }

    #[test]
    fn test_update_without_cols_fails() {
        let mut update = UpdateStatement::new(Dialect::Sqlite);
        update.table("blog");
        assert!(update.statement_text().is_err());
    }

    #[test]
    fn test_delete() {
        let mut delete = DeleteStatement::new(Dialect::Postgres);
        delete
            .from("blog")
            .where_criteria(Criteria::compare(
                "id",
                Operator::In,
                Value::Array(vec![Value::Int(1), Value::Int(2)]),
            ))
            .where_criteria(Criteria::compare("title", Operator::IsNull, Value::Null).or());
        assert_eq!(
            delete.statement_text().unwrap(),
            "DELETE FROM \"blog\" WHERE \"id\" IN (:id_0, :id_1) OR \"title\" IS NULL"
        );
        assert_eq!(
            delete.bound_values(),
            binds(&[("id_0", Value::Int(1)), ("id_1", Value::Int(2))])
        );
    }
}
