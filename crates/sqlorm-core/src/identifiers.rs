//! Identifier quoting for generated SQL.
//!
//! Table and column names come from model declarations, never from user
//! input, but they are still quoted so reserved words (`order`, `group`)
//! work as column names.

/// ANSI double-quoting (SQLite, PostgreSQL). Embedded quotes are doubled.
///
/// ```
/// use sqlorm_core::quote_ident;
///
/// assert_eq!(quote_ident("blog"), "\"blog\"");
/// assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
/// ```
#[inline]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// MySQL backtick quoting. Embedded backticks are doubled.
///
/// ```
/// use sqlorm_core::quote_ident_mysql;
///
/// assert_eq!(quote_ident_mysql("order"), "`order`");
/// ```
#[inline]
pub fn quote_ident_mysql(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quote each dot-separated part of a qualified name (`db.table`).
pub fn quote_qualified(name: &str, quote: fn(&str) -> String) -> String {
    name.split('.').map(quote).collect::<Vec<_>>().join(".")
}
