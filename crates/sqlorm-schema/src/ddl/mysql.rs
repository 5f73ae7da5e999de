//! MySQL DDL generator.
//!
//! Keys live inline in `CREATE TABLE`; the table options (engine, charset,
//! collation) follow the closing parenthesis.

use super::{
    DdlGenerator, format_default, format_fk_constraint, primary_key_columns, quote_columns,
    quote_literal, wrap_create_table,
};
use sqlorm_core::{Column, DatabaseSchema, IndexKind, TableSchema};
use sqlorm_query::Dialect;

/// DDL generator for MySQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlDdlGenerator;

impl MysqlDdlGenerator {
    fn column_def(column: &Column) -> String {
        let mut parts = vec![
            Dialect::Mysql.quote_identifier(&column.name),
            column.type_definition(),
        ];

        if let Some(charset) = &column.charset {
            parts.push(format!("CHARACTER SET {}", charset));
        }
        if let Some(collation) = &column.collation {
            parts.push(format!("COLLATE {}", collation));
        }
        parts.push(if column.nullable { "NULL" } else { "NOT NULL" }.to_string());
        if let Some(default) = format_default(column) {
            parts.push(format!("DEFAULT {}", default));
        }
        if column.autoincrement {
            parts.push("AUTO_INCREMENT".to_string());
        }
        if let Some(comment) = &column.comment {
            parts.push(format!("COMMENT {}", quote_literal(comment)));
        }
        parts.join(" ")
    }

    fn table_options(
        engine: Option<&str>,
        charset: Option<&str>,
        collation: Option<&str>,
    ) -> String {
        let mut options = String::new();
        if let Some(engine) = engine {
            options.push_str(&format!(" ENGINE={}", engine));
        }
        if let Some(charset) = charset {
            options.push_str(&format!(" DEFAULT CHARSET={}", charset));
        }
        if let Some(collation) = collation {
            options.push_str(&format!(" COLLATE={}", collation));
        }
        options
    }

    /// `CREATE TABLE` with `defaults` filling table options the table does
    /// not set itself.
    fn create_table_with(&self, table: &TableSchema, defaults: Option<&DatabaseSchema>) -> String {
        let mut parts: Vec<String> = table
            .columns()
            .iter()
            .map(|c| Self::column_def(c))
            .collect();

        let primary = primary_key_columns(table);
        if !primary.is_empty() {
            parts.push(format!(
                "PRIMARY KEY ({})",
                quote_columns(&primary, Dialect::Mysql)
            ));
        }
        for index in table.indexes() {
            let keyword = match index.kind {
                IndexKind::Primary => continue,
                IndexKind::Unique => "UNIQUE KEY",
                IndexKind::Key => "KEY",
            };
            parts.push(format!(
                "{} {} ({})",
                keyword,
                Dialect::Mysql.quote_identifier(&index.name),
                quote_columns(&index.fields, Dialect::Mysql)
            ));
        }
        for fk in table.relations() {
            parts.push(format_fk_constraint(fk, Dialect::Mysql));
        }

        let mut sql = wrap_create_table(table, &parts, Dialect::Mysql);
        sql.push_str(&Self::table_options(
            table.engine().or_else(|| defaults.and_then(|d| d.engine())),
            table.charset().or_else(|| defaults.and_then(|d| d.charset())),
            table
                .collation()
                .or_else(|| defaults.and_then(|d| d.collation())),
        ));
        sql
    }
}

impl DdlGenerator for MysqlDdlGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::Mysql
    }

    fn create_table(&self, table: &TableSchema) -> Vec<String> {
        vec![self.create_table_with(table, None)]
    }

    fn create_database(&self, database: &DatabaseSchema) -> Vec<String> {
        tracing::debug!(
            dialect = "mysql",
            database = database.name(),
            tables = database.tables().len(),
            "Generating CREATE DATABASE DDL"
        );

        let name = Dialect::Mysql.quote_identifier(database.name());
        let mut create = format!("CREATE DATABASE IF NOT EXISTS {}", name);
        if let Some(charset) = database.charset() {
            create.push_str(&format!(" DEFAULT CHARACTER SET {}", charset));
        }
        if let Some(collation) = database.collation() {
            create.push_str(&format!(" DEFAULT COLLATE {}", collation));
        }
        let mut statements = vec![create, format!("USE {}", name)];
        statements.extend(
            database
                .tables()
                .iter()
                .map(|table| self.create_table_with(table, Some(database))),
        );
        statements
    }
}
