//! SQLite connection implementation.
//!
//! Wraps a `rusqlite` handle behind a mutex and implements the synchronous
//! [`Connection`] trait from sqlorm-core. Statements use named `:name`
//! placeholders; each placeholder SQLite reports is bound from the
//! [`BindMap`] by name, and bind entries the statement does not mention are
//! ignored.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{Connection as RusqliteConnection, ErrorCode};
use sqlorm_core::connection::{no_active_transaction, transaction_already_active};
use sqlorm_core::{BindMap, ColumnInfo, Connection, Error, QueryError, QueryErrorKind, Result, Row};

use crate::types::{Param, from_value_ref};

/// Configuration for opening SQLite connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConfig {
    /// Path to the database file, or ":memory:" for an in-memory database.
    pub path: String,
    /// Busy timeout in milliseconds; 0 disables it.
    pub busy_timeout_ms: u32,
    /// Enforce foreign key constraints (`PRAGMA foreign_keys`).
    pub foreign_keys: bool,
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: ":memory:".to_string(),
            busy_timeout_ms: 5000,
            foreign_keys: true,
        }
    }
}

impl SqliteConfig {
    /// Create a new config for a file-based database.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Create a new config for an in-memory database.
    pub fn memory() -> Self {
        Self::default()
    }

    pub fn busy_timeout(mut self, ms: u32) -> Self {
        self.busy_timeout_ms = ms;
        self
    }

    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    fn is_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

/// A connection to a SQLite database.
///
/// All access goes through an internal mutex, so one connection can be
/// shared by reference between result sets and repositories.
pub struct SqliteConnection {
    inner: Mutex<RusqliteConnection>,
    path: String,
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("path", &self.path)
            .field("in_transaction", &self.in_transaction())
            .finish()
    }
}

impl SqliteConnection {
    /// Open a new SQLite connection with the given configuration.
    pub fn open(config: &SqliteConfig) -> Result<Self> {
        let conn = if config.is_memory() {
            RusqliteConnection::open_in_memory()
        } else {
            RusqliteConnection::open(&config.path)
        }
        .map_err(|e| connection_error(format!("Failed to open database '{}'", config.path), e))?;

        if config.busy_timeout_ms > 0 {
            conn.busy_timeout(Duration::from_millis(u64::from(config.busy_timeout_ms)))
                .map_err(|e| connection_error("Failed to set busy timeout".to_string(), e))?;
        }
        conn.pragma_update(None, "foreign_keys", config.foreign_keys)
            .map_err(|e| connection_error("Failed to set foreign_keys pragma".to_string(), e))?;

        tracing::debug!(
            path = %config.path,
            foreign_keys = config.foreign_keys,
            "Opened SQLite connection"
        );

        Ok(Self {
            inner: Mutex::new(conn),
            path: config.path.clone(),
        })
    }

    /// Open an in-memory database with default settings.
    pub fn open_memory() -> Result<Self> {
        Self::open(&SqliteConfig::memory())
    }

    /// Open a file database with default settings.
    pub fn open_file(path: impl Into<String>) -> Result<Self> {
        Self::open(&SqliteConfig::file(path))
    }

    /// The database path this connection was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, RusqliteConnection> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Prepare `sql` and bind every named placeholder from `binds`.
fn prepare<'c>(
    conn: &'c RusqliteConnection,
    sql: &str,
    binds: &BindMap,
) -> Result<rusqlite::Statement<'c>> {
    let mut stmt = conn.prepare(sql).map_err(|e| prepare_error(e, sql))?;

    for index in 1..=stmt.parameter_count() {
        let Some(name) = stmt
            .parameter_name(index)
            .map(|n| n.trim_start_matches([':', '@', '$']).to_string())
        else {
            return Err(bind_error(
                format!("positional parameter {} has no name", index),
                sql,
            ));
        };
        let value = binds
            .get(&name)
            .ok_or_else(|| bind_error(format!("no value bound for ':{}'", name), sql))?;
        stmt.raw_bind_parameter(index, Param(value))
            .map_err(|e| driver_error(e, sql))?;
    }

    Ok(stmt)
}

impl Connection for SqliteConnection {
    fn query(&self, sql: &str, binds: &BindMap) -> Result<Vec<Row>> {
        tracing::debug!(sql = %sql, binds = binds.len(), "Executing query");

        let conn = self.lock();
        let mut stmt = prepare(&conn, sql, binds)?;
        let columns = Arc::new(ColumnInfo::new(
            stmt.column_names().into_iter().map(String::from).collect(),
        ));
        let width = columns.len();

        let mut rows = stmt.raw_query();
        let mut result = Vec::new();
        while let Some(row) = rows.next().map_err(|e| driver_error(e, sql))? {
            let mut values = Vec::with_capacity(width);
            for index in 0..width {
                let value = row.get_ref(index).map_err(|e| driver_error(e, sql))?;
                values.push(from_value_ref(value));
            }
            result.push(Row::with_columns(Arc::clone(&columns), values));
        }

        tracing::trace!(rows = result.len(), "Query returned rows");
        Ok(result)
    }

    fn execute(&self, sql: &str, binds: &BindMap) -> Result<u64> {
        tracing::debug!(sql = %sql, binds = binds.len(), "Executing statement");

        let conn = self.lock();
        let mut stmt = prepare(&conn, sql, binds)?;
        let affected = stmt.raw_execute().map_err(|e| driver_error(e, sql))?;
        Ok(affected as u64)
    }

    fn last_insert_id(&self) -> Result<String> {
        Ok(self.lock().last_insert_rowid().to_string())
    }

    fn begin(&self) -> Result<()> {
        let conn = self.lock();
        if !conn.is_autocommit() {
            return Err(transaction_already_active());
        }
        conn.execute_batch("BEGIN")
            .map_err(|e| driver_error(e, "BEGIN"))?;
        tracing::debug!(path = %self.path, "Transaction started");
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        let conn = self.lock();
        if conn.is_autocommit() {
            return Err(no_active_transaction("commit"));
        }
        conn.execute_batch("COMMIT")
            .map_err(|e| driver_error(e, "COMMIT"))?;
        tracing::debug!(path = %self.path, "Transaction committed");
        Ok(())
    }

    fn rollback(&self) -> Result<()> {
        let conn = self.lock();
        if conn.is_autocommit() {
            tracing::warn!(path = %self.path, "Rollback requested without an active transaction");
            return Err(no_active_transaction("rollback"));
        }
        conn.execute_batch("ROLLBACK")
            .map_err(|e| driver_error(e, "ROLLBACK"))?;
        tracing::debug!(path = %self.path, "Transaction rolled back");
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        !self.lock().is_autocommit()
    }

    fn execute_batch(&self, sql: &str) -> Result<()> {
        tracing::debug!(sql = %sql, "Executing batch");
        self.lock()
            .execute_batch(sql)
            .map_err(|e| driver_error(e, sql))
    }
}

fn driver_error(err: rusqlite::Error, sql: &str) -> Error {
    let (kind, code) = match &err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            let kind = if failure.code == ErrorCode::ConstraintViolation {
                QueryErrorKind::Constraint
            } else {
                QueryErrorKind::Database
            };
            (kind, Some(failure.extended_code.to_string()))
        }
        rusqlite::Error::InvalidParameterName(_)
        | rusqlite::Error::InvalidParameterCount(..)
        | rusqlite::Error::ToSqlConversionFailure(_) => (QueryErrorKind::Bind, None),
        _ => (QueryErrorKind::Database, None),
    };

    let message = match &code {
        Some(code) => format!("DB query execution error: {}: {}", code, err),
        None => format!("DB query execution error: {}", err),
    };

    Error::Query(QueryError {
        kind,
        sql: Some(sql.to_string()),
        message,
        code,
        source: Some(Box::new(err)),
    })
}

fn prepare_error(err: rusqlite::Error, sql: &str) -> Error {
    match driver_error(err, sql) {
        Error::Query(mut e) if e.kind == QueryErrorKind::Database => {
            e.kind = QueryErrorKind::Prepare;
            Error::Query(e)
        }
        other => other,
    }
}

fn bind_error(message: String, sql: &str) -> Error {
    Error::Query(QueryError {
        kind: QueryErrorKind::Bind,
        sql: Some(sql.to_string()),
        message,
        code: None,
        source: None,
    })
}

fn connection_error(message: String, err: rusqlite::Error) -> Error {
    Error::Query(QueryError {
        kind: QueryErrorKind::Connection,
        sql: None,
        message: format!("{}: {}", message, err),
        code: None,
        source: Some(Box::new(err)),
    })
}
