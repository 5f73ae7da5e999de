//! SQLite DDL generator.
//!
//! SQLite types collapse to storage affinities, an autoincrement key must
//! be `INTEGER PRIMARY KEY AUTOINCREMENT`, and secondary indexes are
//! separate `CREATE INDEX` statements with database-wide names.

use super::{
    DdlGenerator, format_default, format_fk_constraint, primary_key_columns, quote_columns,
    wrap_create_table,
};
use sqlorm_core::{Column, IndexKind, SqlType, TableSchema};
use sqlorm_query::Dialect;

/// DDL generator for SQLite.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDdlGenerator;

impl SqliteDdlGenerator {
    /// Column type by SQLite affinity.
    fn column_type(column: &Column) -> &'static str {
        match column.sql_type {
            SqlType::TinyInt
            | SqlType::SmallInt
            | SqlType::MediumInt
            | SqlType::Int
            | SqlType::BigInt
            | SqlType::Bool
            | SqlType::Year => "INTEGER",
            SqlType::Float | SqlType::Double => "REAL",
            SqlType::Decimal => "NUMERIC",
            SqlType::Binary | SqlType::VarBinary | SqlType::Blob => "BLOB",
            SqlType::Char
            | SqlType::VarChar
            | SqlType::Text
            | SqlType::Json
            | SqlType::Enum
            | SqlType::Set
            | SqlType::Date
            | SqlType::DateTime
            | SqlType::Timestamp => "TEXT",
        }
    }

    fn column_def(column: &Column, inline_key: bool) -> String {
        let mut parts = vec![
            Dialect::Sqlite.quote_identifier(&column.name),
            Self::column_type(column).to_string(),
        ];

        if inline_key {
            parts.push("PRIMARY KEY AUTOINCREMENT".to_string());
            return parts.join(" ");
        }

        if !column.nullable {
            parts.push("NOT NULL".to_string());
        }
        if let Some(default) = format_default(column) {
            parts.push(format!("DEFAULT {}", default));
        }
        if let Some(collation) = &column.collation {
            parts.push(format!("COLLATE {}", collation));
        }
        parts.join(" ")
    }
}

impl DdlGenerator for SqliteDdlGenerator {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn create_table(&self, table: &TableSchema) -> Vec<String> {
        let primary = primary_key_columns(table);
        let inline_key = table
            .columns()
            .iter()
            .find(|c| c.autoincrement && c.sql_type.is_integer() && primary == [c.name.clone()])
            .map(|c| c.name.clone());

        let mut parts: Vec<String> = table
            .columns()
            .iter()
            .map(|c| Self::column_def(c, inline_key.as_deref() == Some(c.name.as_str())))
            .collect();

        if inline_key.is_none() && !primary.is_empty() {
            parts.push(format!(
                "PRIMARY KEY ({})",
                quote_columns(&primary, Dialect::Sqlite)
            ));
        }
        for fk in table.relations() {
            parts.push(format_fk_constraint(fk, Dialect::Sqlite));
        }

        let mut statements = vec![wrap_create_table(table, &parts, Dialect::Sqlite)];
        for index in table.indexes() {
            let unique = match index.kind {
                IndexKind::Primary => continue,
                IndexKind::Unique => "UNIQUE ",
                IndexKind::Key => "",
            };
            statements.push(format!(
                "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
                unique,
                Dialect::Sqlite.quote_identifier(&format!("{}_{}", table.name(), index.name)),
                Dialect::Sqlite.quote_identifier(table.name()),
                quote_columns(&index.fields, Dialect::Sqlite)
            ));
        }
        statements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlorm_core::{ForeignKey, Index, ReferentialAction, TableOptions};
    use std::sync::Arc;

    fn blog() -> TableSchema {
        TableSchema::new(
            "blog",
            vec![
                Arc::new(Column::new("id", SqlType::Int).size(11).unsigned().autoincrement()),
                Arc::new(Column::new("title", SqlType::VarChar).size(100).default_value("")),
                Arc::new(Column::new("slug", SqlType::VarChar).size(100).nullable(true)),
            ],
            vec![Index::unique("uq_slug", ["slug"])],
            vec![],
            TableOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_create_table() {
        let statements = SqliteDdlGenerator.create_table(&blog());
        assert_eq!(
            statements[0],
            "CREATE TABLE IF NOT EXISTS \"blog\" (\n  \"id\" INTEGER PRIMARY KEY AUTOINCREMENT,\n  \"title\" TEXT NOT NULL DEFAULT '',\n  \"slug\" TEXT\n)"
        );
        assert_eq!(
            statements[1],
            "CREATE UNIQUE INDEX IF NOT EXISTS \"blog_uq_slug\" ON \"blog\" (\"slug\")"
        );
        assert_eq!(statements.len(), 2);
    }

    #[test]
    fn test_composite_primary_key_and_fk() {
        let table = TableSchema::new(
            "post_tag",
            vec![
                Arc::new(Column::new("post_id", SqlType::Int)),
                Arc::new(Column::new("tag", SqlType::VarChar).size(20)),
            ],
            vec![Index::primary(["post_id", "tag"]), Index::key("ix_tag", ["tag"])],
            vec![
                ForeignKey::new("fk_post", ["post_id"], "post", ["id"])
                    .on_delete(ReferentialAction::Cascade),
            ],
            TableOptions::default(),
        )
        .unwrap();

        let statements = SqliteDdlGenerator.create_table(&table);
        assert!(statements[0].contains("  PRIMARY KEY (\"post_id\", \"tag\")"));
        assert!(statements[0].contains("REFERENCES \"post\" (\"id\") ON DELETE CASCADE"));
        assert_eq!(
            statements[1],
            "CREATE INDEX IF NOT EXISTS \"post_tag_ix_tag\" ON \"post_tag\" (\"tag\")"
        );
    }

    #[test]
    fn test_affinities() {
        let at = Column::new("at", SqlType::DateTime);
        assert_eq!(SqliteDdlGenerator::column_type(&at), "TEXT");
        let price = Column::new("price", SqlType::Decimal).decimal(10, 2);
        assert_eq!(SqliteDdlGenerator::column_type(&price), "NUMERIC");
        let data = Column::new("data", SqlType::Blob);
        assert_eq!(SqliteDdlGenerator::column_type(&data), "BLOB");
    }

    #[test]
    fn test_drop_table() {
        assert_eq!(
            SqliteDdlGenerator.drop_table("blog"),
            "DROP TABLE IF EXISTS \"blog\""
        );
    }
}
