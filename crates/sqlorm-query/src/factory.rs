//! Statement factory.

use crate::dialect::Dialect;
use crate::statement::{DeleteStatement, InsertStatement, SelectStatement, UpdateStatement};

/// Mints statements for one dialect, already pointed at a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatementFactory {
    dialect: Dialect,
}

impl StatementFactory {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn new_select(&self, table: &str) -> SelectStatement {
        let mut select = SelectStatement::new(self.dialect);
        select.from(table);
        select
    }

    pub fn new_insert(&self, table: &str) -> InsertStatement {
        let mut insert = InsertStatement::new(self.dialect);
        insert.into_table(table);
        insert
    }

    pub fn new_update(&self, table: &str) -> UpdateStatement {
        let mut update = UpdateStatement::new(self.dialect);
        update.table(table);
        update
    }

    pub fn new_delete(&self, table: &str) -> DeleteStatement {
        let mut delete = DeleteStatement::new(self.dialect);
        delete.from(table);
        delete
    }
}
