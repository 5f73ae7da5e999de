//! SQLite driver for sqlorm.
//!
//! This crate implements the [`Connection`](sqlorm_core::Connection) trait
//! over `rusqlite`, with SQLite compiled from the bundled amalgamation.
//!
//! # Features
//!
//! - Named `:name` parameter binding from a `BindMap`
//! - In-memory and file-based databases
//! - Configurable busy timeout and foreign-key enforcement
//! - One level of transactions (`BEGIN`/`COMMIT`/`ROLLBACK`)
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlorm_core::{BindMap, Connection, Value};
//! use sqlorm_sqlite::SqliteConnection;
//!
//! let conn = SqliteConnection::open_memory()?;
//! conn.execute_batch("CREATE TABLE blog (id INTEGER PRIMARY KEY, title TEXT)")?;
//!
//! let mut binds = BindMap::new();
//! binds.insert("title".into(), Value::from("my blog"));
//! conn.execute("INSERT INTO blog (title) VALUES (:title)", &binds)?;
//! assert_eq!(conn.last_insert_id()?, "1");
//! ```
//!
//! # Type Mapping
//!
//! | `Value` | SQLite |
//! |---------|--------|
//! | `Null` | NULL |
//! | `Bool` | INTEGER (0/1) |
//! | `Int` | INTEGER |
//! | `Float` | REAL |
//! | `Text` | TEXT |
//! | `Bytes` | BLOB |
//!
//! Results come back in the same five shapes; typed fields re-parse them.

pub mod connection;
mod types;

pub use connection::{SqliteConfig, SqliteConnection};

/// The SQLite library version, e.g. `3.46.0`.
pub fn sqlite_version() -> &'static str {
    rusqlite::version()
}
