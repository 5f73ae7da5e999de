//! Active-record layer: result sets and the [`OrmModel`] operations.
//!
//! A result set pairs one statement builder with one connection and runs
//! the statement at most once:
//!
//! ```text
//! unresolved --exec()/first()/all()--> resolved --unresolve()--> unresolved
//! ```
//!
//! Running a resolved result set again fails with a resolved error;
//! reading the result of an unresolved one fails with an unresolved error.

mod delete;
mod factory;
mod insert;
mod model;
mod resolution;
mod select;
mod update;

pub use delete::DeleteResultSet;
pub use factory::ResultSetFactory;
pub use insert::InsertResultSet;
pub use model::OrmModel;
pub use resolution::Resolution;
pub use select::SelectResultSet;
pub use update::UpdateResultSet;

use sqlorm_core::BindMap;

pub(crate) fn log_statement(sql: &str, binds: &BindMap) {
    tracing::debug!(sql = %sql, binds = binds.len(), "Executing statement");
}
