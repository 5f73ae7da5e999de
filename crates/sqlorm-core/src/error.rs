//! Error types for sqlorm operations.

use std::fmt;

/// The primary error type for all sqlorm operations.
#[derive(Debug)]
pub enum Error {
    /// Table/column metadata could not be derived
    Schema(SchemaError),
    /// A column has no matching field, or no primary key resolves
    FieldNotFound(FieldNotFoundError),
    /// A read expected at least one row and got none
    NotFound(NotFoundError),
    /// Result-set state misuse (executing twice, reading too early)
    Resolution(ResolutionError),
    /// Driver-level query failure
    Query(QueryError),
    /// Insert/update/delete failure raised by the CRUD layer
    Write(WriteError),
    /// Cache backend failure
    Cache(CacheError),
    /// Transaction state errors
    Transaction(TransactionError),
    /// Hydration/type conversion errors
    Type(TypeError),
    /// Custom error with message
    Custom(String),
}

#[derive(Debug)]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    /// Table name could not be derived from the model type
    TableName,
    /// Two columns share a name
    DuplicateColumn,
    /// Two indexes share a name
    DuplicateIndex,
    /// Two relations share a name
    DuplicateRelation,
    /// Two tables share a name within one database
    DuplicateTable,
    /// Column descriptor failed validation
    InvalidColumn,
    /// Index or relation refers to an unknown column
    UnknownColumn,
}

#[derive(Debug)]
pub struct FieldNotFoundError {
    /// Model type name
    pub model: &'static str,
    /// Requested column, `None` when resolving the primary key
    pub column: Option<String>,
    pub message: String,
}

#[derive(Debug)]
pub struct NotFoundError {
    pub message: String,
    pub sql: Option<String>,
}

#[derive(Debug)]
pub struct ResolutionError {
    pub kind: ResolutionErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionErrorKind {
    /// The result set already executed
    Resolved,
    /// The result set has not executed yet
    Unresolved,
}

#[derive(Debug)]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub sql: Option<String>,
    pub message: String,
    /// Driver-specific error code, if any
    pub code: Option<String>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Statement could not be prepared
    Prepare,
    /// Constraint violation (unique, foreign key, etc.)
    Constraint,
    /// Statement references unknown bind parameters
    Bind,
    /// Connection is unusable
    Connection,
    /// Other database error
    Database,
}

#[derive(Debug)]
pub struct WriteError {
    pub operation: WriteOperation,
    pub message: String,
    pub source: Option<Box<Error>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    Insert,
    Update,
    Delete,
}

#[derive(Debug)]
pub struct CacheError {
    pub kind: CacheErrorKind,
    pub key: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheErrorKind {
    /// `load` called for a key that is not stored
    Missing,
    /// Backend failed while loading
    Load,
    /// Backend failed while saving
    Save,
    /// Backend failed while invalidating
    Invalidate,
}

#[derive(Debug)]
pub struct TransactionError {
    pub kind: TransactionErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionErrorKind {
    /// `begin` while a transaction is open
    AlreadyActive,
    /// `commit`/`rollback` with no open transaction
    NotActive,
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

impl Error {
    /// Shorthand for a schema error.
    pub fn schema(kind: SchemaErrorKind, message: impl Into<String>) -> Self {
        Error::Schema(SchemaError {
            kind,
            message: message.into(),
        })
    }

    /// Shorthand for a not-found error.
    pub fn not_found(message: impl Into<String>, sql: Option<String>) -> Self {
        Error::NotFound(NotFoundError {
            message: message.into(),
            sql,
        })
    }

    pub fn resolved(message: impl Into<String>) -> Self {
        Error::Resolution(ResolutionError {
            kind: ResolutionErrorKind::Resolved,
            message: message.into(),
        })
    }

    pub fn unresolved(message: impl Into<String>) -> Self {
        Error::Resolution(ResolutionError {
            kind: ResolutionErrorKind::Unresolved,
            message: message.into(),
        })
    }

    /// Wrap this error as a failure of the given write operation.
    ///
    /// Errors that already belong to `operation` are returned untouched so
    /// wrapping stays idempotent across layers.
    pub fn into_write(self, operation: WriteOperation) -> Self {
        match self {
            Error::Write(w) if w.operation == operation => Error::Write(w),
            other => Error::Write(WriteError {
                operation,
                message: format!("Database {} error: {}", operation, other),
                source: Some(Box::new(other)),
            }),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    pub fn is_field_not_found(&self) -> bool {
        matches!(self, Error::FieldNotFound(_))
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Error::Resolution(r) if r.kind == ResolutionErrorKind::Resolved)
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Error::Resolution(r) if r.kind == ResolutionErrorKind::Unresolved)
    }

    pub fn is_cache_error(&self) -> bool {
        matches!(self, Error::Cache(_))
    }

    /// The write operation this error belongs to, if it is a CRUD failure.
    pub fn write_operation(&self) -> Option<WriteOperation> {
        match self {
            Error::Write(w) => Some(w.operation),
            _ => None,
        }
    }

    pub fn is_insert_error(&self) -> bool {
        self.write_operation() == Some(WriteOperation::Insert)
    }

    pub fn is_update_error(&self) -> bool {
        self.write_operation() == Some(WriteOperation::Update)
    }

    pub fn is_delete_error(&self) -> bool {
        self.write_operation() == Some(WriteOperation::Delete)
    }

    /// Get the SQL that caused this error, if available.
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Query(q) => q.sql.as_deref(),
            Error::NotFound(n) => n.sql.as_deref(),
            Error::Write(w) => w.source.as_deref().and_then(Error::sql),
            _ => None,
        }
    }
}

impl QueryError {
    /// A database failure with no extra classification.
    pub fn database(message: impl Into<String>, sql: Option<String>) -> Self {
        Self {
            kind: QueryErrorKind::Database,
            sql,
            message: message.into(),
            code: None,
            source: None,
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        self.kind == QueryErrorKind::Constraint
    }
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOperation::Insert => write!(f, "insert"),
            WriteOperation::Update => write!(f, "update"),
            WriteOperation::Delete => write!(f, "delete"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Schema(e) => write!(f, "Schema error: {}", e.message),
            Error::FieldNotFound(e) => write!(f, "Field not found: {}", e.message),
            Error::NotFound(e) => write!(f, "Not found: {}", e.message),
            Error::Resolution(e) => write!(f, "Result set error: {}", e.message),
            Error::Query(e) => {
                if let Some(code) = &e.code {
                    write!(f, "Query error ({}): {}", code, e.message)
                } else {
                    write!(f, "Query error: {}", e.message)
                }
            }
            Error::Write(e) => write!(f, "{}", e.message),
            Error::Cache(e) => write!(f, "Cache storage error for '{}': {}", e.key, e.message),
            Error::Transaction(e) => write!(f, "Transaction error: {}", e.message),
            Error::Type(e) => {
                if let Some(col) = &e.column {
                    write!(
                        f,
                        "Type error in column '{}': expected {}, found {}",
                        col, e.expected, e.actual
                    )
                } else {
                    write!(f, "Type error: expected {}, found {}", e.expected, e.actual)
                }
            }
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Query(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Write(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = &self.column {
            write!(
                f,
                "expected {} for column '{}', found {}",
                self.expected, col, self.actual
            )
        } else {
            write!(f, "expected {}, found {}", self.expected, self.actual)
        }
    }
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Error::Schema(err)
    }
}

impl From<FieldNotFoundError> for Error {
    fn from(err: FieldNotFoundError) -> Self {
        Error::FieldNotFound(err)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}

impl From<WriteError> for Error {
    fn from(err: WriteError) -> Self {
        Error::Write(err)
    }
}

impl From<CacheError> for Error {
    fn from(err: CacheError) -> Self {
        Error::Cache(err)
    }
}

impl From<TransactionError> for Error {
    fn from(err: TransactionError) -> Self {
        Error::Transaction(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

/// Result type alias for sqlorm operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_wrapping_is_idempotent() {
        let query = Error::Query(QueryError::database(
            "UNIQUE constraint failed",
            Some("INSERT INTO blog (id) VALUES (:id)".to_string()),
        ));

        let wrapped = query.into_write(WriteOperation::Insert);
        assert!(wrapped.is_insert_error());
        assert!(!wrapped.is_update_error());
        assert_eq!(wrapped.sql(), Some("INSERT INTO blog (id) VALUES (:id)"));

        let twice = wrapped.into_write(WriteOperation::Insert);
        match twice {
            Error::Write(w) => {
                assert_eq!(w.operation, WriteOperation::Insert);
                assert!(matches!(w.source.as_deref(), Some(Error::Query(_))));
            }
            other => panic!("expected write error, got {other:?}"),
        }
    }

    #[test]
    fn rewrapping_changes_operation() {
        let err = Error::resolved("already executed").into_write(WriteOperation::Update);
        let err = err.into_write(WriteOperation::Delete);
        assert!(err.is_delete_error());
    }

    #[test]
    fn resolution_helpers() {
        assert!(Error::resolved("x").is_resolved());
        assert!(!Error::resolved("x").is_unresolved());
        assert!(Error::unresolved("x").is_unresolved());
        assert!(Error::not_found("no rows", None).is_not_found());
    }

    #[test]
    fn display_formats() {
        let err = Error::Type(TypeError {
            expected: "datetime",
            actual: "yesterday".to_string(),
            column: Some("created_at".to_string()),
        });
        assert_eq!(
            err.to_string(),
            "Type error in column 'created_at': expected datetime, found yesterday"
        );

        let err = Error::Cache(CacheError {
            kind: CacheErrorKind::Missing,
            key: "abc".to_string(),
            message: "no entry".to_string(),
        });
        assert_eq!(err.to_string(), "Cache storage error for 'abc': no entry");
        assert!(err.is_cache_error());
    }
}
