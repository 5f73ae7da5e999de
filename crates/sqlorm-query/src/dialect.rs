//! SQL dialects.

use sqlorm_core::{quote_ident, quote_ident_mysql};

/// Target database family.
///
/// Placeholders are always named (`:name`); the dialect only decides
/// identifier quoting and a few syntax corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// SQLite (`"ident"`)
    #[default]
    Sqlite,
    /// MySQL / MariaDB (`` `ident` ``)
    Mysql,
    /// PostgreSQL (`"ident"`)
    Postgres,
}

impl Dialect {
    /// Quote an identifier, doubling embedded quote characters.
    pub fn quote_identifier(self, name: &str) -> String {
        match self {
            Dialect::Sqlite | Dialect::Postgres => quote_ident(name),
            Dialect::Mysql => quote_ident_mysql(name),
        }
    }

    /// Quote a list of identifiers and join them with `, `.
    pub fn quote_list<S: AsRef<str>>(self, names: &[S]) -> String {
        names
            .iter()
            .map(|n| self.quote_identifier(n.as_ref()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// INSERT with no explicit columns.
    pub const fn default_values_insert(self) -> &'static str {
        match self {
            Dialect::Sqlite | Dialect::Postgres => "DEFAULT VALUES",
            Dialect::Mysql => "() VALUES ()",
        }
    }

    /// LIMIT/OFFSET tail, or an empty string when neither is set.
    ///
    /// SQLite and MySQL only accept OFFSET after a LIMIT, so an OFFSET on
    /// its own gets an unbounded LIMIT there.
    pub fn limit_offset(self, limit: Option<u64>, offset: Option<u64>) -> String {
        match (limit, offset) {
            (None, None) => String::new(),
            (Some(l), None) => format!(" LIMIT {}", l),
            (Some(l), Some(o)) => format!(" LIMIT {} OFFSET {}", l, o),
            (None, Some(o)) => match self {
                Dialect::Sqlite => format!(" LIMIT -1 OFFSET {}", o),
                Dialect::Mysql => format!(" LIMIT {} OFFSET {}", u64::MAX, o),
                Dialect::Postgres => format!(" OFFSET {}", o),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoting() {
        assert_eq!(Dialect::Sqlite.quote_identifier("blog"), "\"blog\"");
        assert_eq!(Dialect::Postgres.quote_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(Dialect::Mysql.quote_identifier("order"), "`order`");
        assert_eq!(Dialect::Mysql.quote_list(&["id", "title"]), "`id`, `title`");
    }

    #[test]
    fn test_limit_offset() {
        assert_eq!(Dialect::Sqlite.limit_offset(None, None), "");
        assert_eq!(Dialect::Sqlite.limit_offset(Some(10), None), " LIMIT 10");
        assert_eq!(Dialect::Mysql.limit_offset(Some(10), Some(5)), " LIMIT 10 OFFSET 5");
        assert_eq!(Dialect::Sqlite.limit_offset(None, Some(5)), " LIMIT -1 OFFSET 5");
        assert_eq!(Dialect::Postgres.limit_offset(None, Some(5)), " OFFSET 5");
    }
}
