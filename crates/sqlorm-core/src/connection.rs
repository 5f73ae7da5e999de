//! Database connection trait.
//!
//! [`Connection`] is the driver boundary: it executes SQL text with named
//! `:name` placeholders bound from a [`BindMap`], reports affected rows and
//! the last generated key, and manages one level of transaction.
//!
//! Calls are synchronous and blocking. Implementations take `&self` and
//! guard their handle internally so one connection can be shared by the
//! result sets and repositories borrowing it.

use crate::error::{Error, QueryError, Result, TransactionError, TransactionErrorKind};
use crate::row::Row;
use crate::value::BindMap;

/// A database connection capable of executing queries.
///
/// # Example
///
/// ```rust,ignore
/// let mut binds = BindMap::new();
/// binds.insert("id".into(), Value::Int(1));
/// let rows = conn.query("SELECT id, title FROM blog WHERE id = :id", &binds)?;
///
/// conn.begin()?;
/// conn.execute("DELETE FROM blog WHERE id = :id", &binds)?;
/// conn.commit()?;
/// ```
pub trait Connection: Send + Sync {
    /// Execute a query and return all rows.
    fn query(&self, sql: &str, binds: &BindMap) -> Result<Vec<Row>>;

    /// Execute a query and return the first row, if any.
    fn query_one(&self, sql: &str, binds: &BindMap) -> Result<Option<Row>> {
        Ok(self.query(sql, binds)?.into_iter().next())
    }

    /// Execute a statement and return the number of affected rows.
    fn execute(&self, sql: &str, binds: &BindMap) -> Result<u64>;

    /// The key generated by the most recent INSERT, as text.
    fn last_insert_id(&self) -> Result<String>;

    /// Start a transaction.
    fn begin(&self) -> Result<()>;

    /// Commit the active transaction.
    fn commit(&self) -> Result<()>;

    /// Roll back the active transaction.
    fn rollback(&self) -> Result<()>;

    /// Whether a transaction is active.
    fn in_transaction(&self) -> bool;

    /// Run several semicolon-separated statements without binds.
    fn execute_batch(&self, sql: &str) -> Result<()> {
        for statement in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            self.execute(statement, &BindMap::new())?;
        }
        Ok(())
    }
}

/// Error for `begin` while a transaction is active.
pub fn transaction_already_active() -> Error {
    Error::Transaction(TransactionError {
        kind: TransactionErrorKind::AlreadyActive,
        message: "a transaction is already active".to_string(),
    })
}

/// Error for `commit`/`rollback` without an active transaction.
pub fn no_active_transaction(operation: &str) -> Error {
    Error::Transaction(TransactionError {
        kind: TransactionErrorKind::NotActive,
        message: format!("cannot {} without an active transaction", operation),
    })
}

/// Wrap a driver message as a query error for `sql`.
pub fn query_error(message: impl Into<String>, sql: &str) -> Error {
    Error::Query(QueryError::database(message, Some(sql.to_string())))
}
