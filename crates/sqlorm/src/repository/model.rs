//! Model-bound repository: statements built from a model's metadata.

use std::marker::PhantomData;

use sqlorm_core::{Connection, Criteria, Model, Result, Row, WriteOperation};
use sqlorm_query::{
    DeleteStatement, Dialect, InsertStatement, SelectStatement, Statement, StatementFactory,
    UpdateStatement,
};

use super::RawRepository;

/// Builds and runs statements for the table of `M`.
///
/// ```ignore
/// let repo = Repository::<BlogModel, _>::new(&conn, Dialect::Sqlite);
/// let proto = BlogModel::new()?;
///
/// let select = repo.new_select([proto.id.gt(Some(10))])?;
/// let blogs = repo.find_all(&select)?;
/// ```
#[derive(Debug)]
pub struct Repository<'c, M: Model, C: Connection> {
    raw: RawRepository<'c, C>,
    statements: StatementFactory,
    _model: PhantomData<fn() -> M>,
}

impl<'c, M: Model, C: Connection> Repository<'c, M, C> {
    pub fn new(conn: &'c C, dialect: Dialect) -> Self {
        Self {
            raw: RawRepository::new(conn),
            statements: StatementFactory::new(dialect),
            _model: PhantomData,
        }
    }

    /// The raw SQL layer, including transactions.
    pub fn raw(&self) -> &RawRepository<'c, C> {
        &self.raw
    }

    pub fn statements(&self) -> StatementFactory {
        self.statements
    }

    /// A SELECT of every column of `M` filtered by `criteria`.
    pub fn new_select(
        &self,
        criteria: impl IntoIterator<Item = Criteria>,
    ) -> Result<SelectStatement> {
        let mut select = self.statements.new_select(&M::table_name()?);
        select.cols(M::column_names()?.iter().cloned());
        for c in criteria {
            select.where_criteria(c);
        }
        Ok(select)
    }

    /// An INSERT of `model`'s dirty fields.
    pub fn new_insert(&self, model: &M) -> Result<InsertStatement> {
        let mut insert = self.statements.new_insert(&M::table_name()?);
        insert.cols(model.dirty_fields_to_query());
        Ok(insert)
    }

    /// An UPDATE writing `model`'s dirty fields to the rows matching `criteria`.
    pub fn new_update(
        &self,
        model: &M,
        criteria: impl IntoIterator<Item = Criteria>,
    ) -> Result<UpdateStatement> {
        let mut update = self.statements.new_update(&M::table_name()?);
        update.cols(model.dirty_fields_to_query());
        for c in criteria {
            update.where_criteria(c);
        }
        Ok(update)
    }

    pub fn new_delete(
        &self,
        criteria: impl IntoIterator<Item = Criteria>,
    ) -> Result<DeleteStatement> {
        let mut delete = self.statements.new_delete(&M::table_name()?);
        for c in criteria {
            delete.where_criteria(c);
        }
        Ok(delete)
    }

    pub fn fetch_all(&self, select: &SelectStatement) -> Result<Vec<Row>> {
        self.raw
            .fetch_all_raw(&select.statement_text()?, &select.bound_values())
    }

    /// The first row of `select`; not-found when there is none.
    pub fn fetch_one(&self, select: &SelectStatement) -> Result<Row> {
        self.raw
            .fetch_one_raw(&select.statement_text()?, &select.bound_values())
    }

    pub fn execute_insert(&self, insert: &InsertStatement) -> Result<String> {
        let sql = insert
            .statement_text()
            .map_err(|e| e.into_write(WriteOperation::Insert))?;
        self.raw.execute_insert_raw(&sql, &insert.bound_values())
    }

    pub fn execute_update(&self, update: &UpdateStatement) -> Result<u64> {
        let sql = update
            .statement_text()
            .map_err(|e| e.into_write(WriteOperation::Update))?;
        self.raw.execute_update_raw(&sql, &update.bound_values())
    }

    pub fn execute_delete(&self, delete: &DeleteStatement) -> Result<u64> {
        let sql = delete
            .statement_text()
            .map_err(|e| e.into_write(WriteOperation::Delete))?;
        self.raw.execute_delete_raw(&sql, &delete.bound_values())
    }

    /// Hydrate every row of `select`.
    pub fn find_all(&self, select: &SelectStatement) -> Result<Vec<M>> {
        M::new_from_rows(&self.fetch_all(select)?)
    }

    pub fn find_one(&self, select: &SelectStatement) -> Result<M> {
        M::new_from_row(&self.fetch_one(select)?)
    }
}
