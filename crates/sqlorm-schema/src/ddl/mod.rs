//! DDL (Data Definition Language) generation from table descriptors.
//!
//! Converts [`TableSchema`] and [`DatabaseSchema`] values into executable
//! `CREATE`/`DROP` statements for each supported dialect.

mod mysql;
mod sqlite;

pub use mysql::MysqlDdlGenerator;
pub use sqlite::SqliteDdlGenerator;

use sqlorm_core::{Column, DatabaseSchema, ForeignKey, ReferentialAction, SqlType, TableSchema};
use sqlorm_query::Dialect;

/// Generates DDL SQL statements from schema descriptors.
pub trait DdlGenerator {
    /// The target dialect.
    fn dialect(&self) -> Dialect;

    /// `CREATE TABLE` for `table`, followed by any statements the dialect
    /// needs for secondary indexes.
    fn create_table(&self, table: &TableSchema) -> Vec<String>;

    fn drop_table(&self, name: &str) -> String {
        format!(
            "DROP TABLE IF EXISTS {}",
            self.dialect().quote_identifier(name)
        )
    }

    /// Every statement needed to create `database`, tables in declaration
    /// order.
    fn create_database(&self, database: &DatabaseSchema) -> Vec<String> {
        database
            .tables()
            .iter()
            .flat_map(|table| self.create_table(table))
            .collect()
    }
}

/// Create a DDL generator for the given dialect.
///
/// PostgreSQL has no generator; `None` is returned for it.
pub fn generator_for_dialect(dialect: Dialect) -> Option<Box<dyn DdlGenerator>> {
    match dialect {
        Dialect::Sqlite => Some(Box::new(SqliteDdlGenerator)),
        Dialect::Mysql => Some(Box::new(MysqlDdlGenerator)),
        Dialect::Postgres => None,
    }
}

// ============================================================================
// Shared Helpers
// ============================================================================

fn dialect_name(dialect: Dialect) -> &'static str {
    match dialect {
        Dialect::Sqlite => "sqlite",
        Dialect::Mysql => "mysql",
        Dialect::Postgres => "postgres",
    }
}

/// Quote a string literal.
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// The `DEFAULT` expression of a column, if it has one.
///
/// Numeric defaults that parse as numbers stay bare; everything else is a
/// quoted literal, except `NULL`.
fn format_default(column: &Column) -> Option<String> {
    if column.default_timestamp {
        return Some("CURRENT_TIMESTAMP".to_string());
    }
    let value = column.default.as_deref()?;
    let numeric = column.sql_type.is_numeric() || matches!(column.sql_type, SqlType::Bool | SqlType::Year);
    if value.eq_ignore_ascii_case("null") {
        Some("NULL".to_string())
    } else if numeric && value.parse::<f64>().is_ok() {
        Some(value.to_string())
    } else {
        Some(quote_literal(value))
    }
}

fn quote_columns(fields: &[String], dialect: Dialect) -> String {
    dialect.quote_list(fields)
}

fn format_action(action: ReferentialAction) -> Option<&'static str> {
    match action {
        ReferentialAction::NoAction => None,
        other => Some(other.as_sql()),
    }
}

/// `CONSTRAINT name FOREIGN KEY (...) REFERENCES table (...) [ON ...]`
fn format_fk_constraint(fk: &ForeignKey, dialect: Dialect) -> String {
    let mut sql = format!(
        "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
        dialect.quote_identifier(&fk.name),
        quote_columns(&fk.fields, dialect),
        dialect.quote_identifier(&fk.reference_table),
        quote_columns(&fk.reference_fields, dialect),
    );
    if let Some(action) = format_action(fk.on_delete) {
        sql.push_str(&format!(" ON DELETE {}", action));
    }
    if let Some(action) = format_action(fk.on_update) {
        sql.push_str(&format!(" ON UPDATE {}", action));
    }
    sql
}

/// Primary key columns, falling back to a lone autoincrement column.
fn primary_key_columns(table: &TableSchema) -> Vec<String> {
    if let Some(index) = table.primary_key() {
        return index.fields.clone();
    }
    table
        .columns()
        .iter()
        .find(|c| c.autoincrement)
        .map(|c| vec![c.name.clone()])
        .unwrap_or_default()
}

fn wrap_create_table(table: &TableSchema, parts: &[String], dialect: Dialect) -> String {
    tracing::debug!(
        dialect = dialect_name(dialect),
        table = table.name(),
        columns = table.columns().len(),
        "Generating CREATE TABLE DDL"
    );

    let sql = format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
        dialect.quote_identifier(table.name()),
        parts
            .iter()
            .map(|p| format!("  {}", p))
            .collect::<Vec<_>>()
            .join(",\n")
    );

    tracing::trace!(sql = %sql, "Generated CREATE TABLE statement");
    sql
}
