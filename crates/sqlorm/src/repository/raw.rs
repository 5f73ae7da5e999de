//! SQL-text repository: raw reads, raw writes and transactions.

use sqlorm_core::{BindMap, Connection, Error, Result, Row, WriteOperation};

use crate::orm::log_statement;

pub(crate) const NOT_FOUND: &str = "Database record not found";

/// Runs SQL text with named binds against one connection.
///
/// Write helpers wrap any failure in the write error of their operation,
/// e.g. `Database insert error: ...`.
#[derive(Debug)]
pub struct RawRepository<'c, C: Connection> {
    conn: &'c C,
}

impl<C: Connection> Clone for RawRepository<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: Connection> Copy for RawRepository<'_, C> {}

impl<'c, C: Connection> RawRepository<'c, C> {
    pub fn new(conn: &'c C) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &'c C {
        self.conn
    }

    /// Run a statement and return the affected row count.
    pub fn execute(&self, sql: &str, binds: &BindMap) -> Result<u64> {
        log_statement(sql, binds);
        self.conn.execute(sql, binds)
    }

    pub fn fetch_all_raw(&self, sql: &str, binds: &BindMap) -> Result<Vec<Row>> {
        log_statement(sql, binds);
        self.conn.query(sql, binds)
    }

    /// The first row of the query; not-found when there is none.
    pub fn fetch_one_raw(&self, sql: &str, binds: &BindMap) -> Result<Row> {
        log_statement(sql, binds);
        self.conn
            .query_one(sql, binds)?
            .ok_or_else(|| Error::not_found(NOT_FOUND, Some(sql.to_string())))
    }

    /// Run an INSERT and return the generated key.
    pub fn execute_insert_raw(&self, sql: &str, binds: &BindMap) -> Result<String> {
        self.execute(sql, binds)
            .and_then(|_| self.conn.last_insert_id())
            .map_err(|e| e.into_write(WriteOperation::Insert))
    }

    pub fn execute_update_raw(&self, sql: &str, binds: &BindMap) -> Result<u64> {
        self.execute(sql, binds)
            .map_err(|e| e.into_write(WriteOperation::Update))
    }

    pub fn execute_delete_raw(&self, sql: &str, binds: &BindMap) -> Result<u64> {
        self.execute(sql, binds)
            .map_err(|e| e.into_write(WriteOperation::Delete))
    }

    pub fn begin_transaction(&self) -> Result<()> {
        tracing::debug!("Beginning transaction");
        self.conn.begin()
    }

    pub fn commit(&self) -> Result<()> {
        tracing::debug!("Committing transaction");
        self.conn.commit()
    }

    pub fn rollback(&self) -> Result<()> {
        tracing::debug!("Rolling back transaction");
        self.conn.rollback()
    }

    pub fn in_transaction(&self) -> bool {
        self.conn.in_transaction()
    }
}
