//! Parameterized statement factory for sqlorm.
//!
//! `sqlorm-query` is the **statement construction layer**. Given a table
//! name, a column list, WHERE criteria and (for writes) a column to value
//! map, it produces SQL text with named `:name` placeholders plus the
//! matching bind map. Values never reach the SQL text.
//!
//! - [`StatementFactory`] mints statements for one [`Dialect`].
//! - [`SelectStatement`], [`InsertStatement`], [`UpdateStatement`] and
//!   [`DeleteStatement`] implement [`Statement`].
//! - [`WhereClause`] folds criteria, expands IN lists and renames
//!   colliding binds.

pub mod clause;
pub mod dialect;
pub mod factory;
pub mod statement;

pub use clause::{OrderBy, OrderDirection, WhereClause};
pub use dialect::Dialect;
pub use factory::StatementFactory;
pub use statement::{
    DeleteStatement, InsertStatement, SelectStatement, Statement, UpdateStatement,
};
