//! Active-record operations on models.

use sqlorm_core::{Connection, Criteria, Model, Result, WriteOperation};

use super::{DeleteResultSet, InsertResultSet, ResultSetFactory, SelectResultSet, UpdateResultSet};

/// CRUD operations for every [`Model`].
///
/// `insert`, `update` and `delete` (and the `_by_pk` forms) execute right
/// away and return the resolved result set; any failure is reported as a
/// write error of the matching operation. The `new_*` forms return an
/// unresolved result set for further configuration.
///
/// ```ignore
/// let mut blog = BlogModel::new()?;
/// blog.title.set("blog2");
/// let id = blog.insert(&factory)?.last_inserted_id()?.to_string();
///
/// blog.title.set("renamed");
/// assert_eq!(blog.update_by_pk(&factory)?.affected_rows()?, 1);
///
/// let mut select = BlogModel::find(&factory, [blog.id.eq(None)])?;
/// assert_eq!(select.first()?.title.get().as_deref(), Some("renamed"));
/// ```
pub trait OrmModel: Model {
    /// A SELECT over this model's table filtered by `criteria`.
    fn find<'c, C: Connection>(
        factory: &ResultSetFactory<'c, C>,
        criteria: impl IntoIterator<Item = Criteria>,
    ) -> Result<SelectResultSet<'c, Self, C>> {
        let mut select = factory.new_select::<Self>()?;
        for c in criteria {
            select.where_criteria(c);
        }
        Ok(select)
    }

    /// Insert the dirty fields.
    fn insert<'a, C: Connection>(
        &'a mut self,
        factory: &ResultSetFactory<'a, C>,
    ) -> Result<InsertResultSet<'a, Self, C>> {
        let mut insert = self
            .new_insert(factory, true)
            .map_err(|e| e.into_write(WriteOperation::Insert))?;
        insert
            .exec()
            .map_err(|e| e.into_write(WriteOperation::Insert))?;
        Ok(insert)
    }

    /// An unresolved INSERT, preloaded with the dirty fields when
    /// `with_dirty` is set.
    fn new_insert<'a, C: Connection>(
        &'a mut self,
        factory: &ResultSetFactory<'a, C>,
        with_dirty: bool,
    ) -> Result<InsertResultSet<'a, Self, C>> {
        let cols = with_dirty.then(|| self.dirty_fields_to_query());
        let mut insert = factory.new_insert(self)?;
        if let Some(cols) = cols {
            insert.cols(cols);
        }
        Ok(insert)
    }

    /// Write the dirty fields to the rows matching `criteria`.
    fn update<'a, C: Connection>(
        &'a mut self,
        factory: &ResultSetFactory<'a, C>,
        criteria: impl IntoIterator<Item = Criteria>,
    ) -> Result<UpdateResultSet<'a, Self, C>> {
        let mut update = self
            .new_update(factory, true, criteria)
            .map_err(|e| e.into_write(WriteOperation::Update))?;
        update
            .exec()
            .map_err(|e| e.into_write(WriteOperation::Update))?;
        Ok(update)
    }

    fn new_update<'a, C: Connection>(
        &'a mut self,
        factory: &ResultSetFactory<'a, C>,
        with_dirty: bool,
        criteria: impl IntoIterator<Item = Criteria>,
    ) -> Result<UpdateResultSet<'a, Self, C>> {
        let cols = with_dirty.then(|| self.dirty_fields_to_query());
        let mut update = factory.new_update(self)?;
        if let Some(cols) = cols {
            update.cols(cols);
        }
        for c in criteria {
            update.where_criteria(c);
        }
        Ok(update)
    }

    /// Update the row whose primary key equals this model's current key.
    fn update_by_pk<'a, C: Connection>(
        &'a mut self,
        factory: &ResultSetFactory<'a, C>,
    ) -> Result<UpdateResultSet<'a, Self, C>> {
        let by_pk = self
            .pk()
            .map_err(|e| e.into_write(WriteOperation::Update))?
            .eq_current();
        self.update(factory, [by_pk])
    }

    fn delete<'a, C: Connection>(
        &'a mut self,
        factory: &ResultSetFactory<'a, C>,
        criteria: impl IntoIterator<Item = Criteria>,
    ) -> Result<DeleteResultSet<'a, Self, C>> {
        let mut delete = self
            .new_delete(factory, criteria)
            .map_err(|e| e.into_write(WriteOperation::Delete))?;
        delete
            .exec()
            .map_err(|e| e.into_write(WriteOperation::Delete))?;
        Ok(delete)
    }

    fn new_delete<'a, C: Connection>(
        &'a mut self,
        factory: &ResultSetFactory<'a, C>,
        criteria: impl IntoIterator<Item = Criteria>,
    ) -> Result<DeleteResultSet<'a, Self, C>> {
        let mut delete = factory.new_delete(self)?;
        for c in criteria {
            delete.where_criteria(c);
        }
        Ok(delete)
    }

    /// Delete the row whose primary key equals this model's current key.
    fn delete_by_pk<'a, C: Connection>(
        &'a mut self,
        factory: &ResultSetFactory<'a, C>,
    ) -> Result<DeleteResultSet<'a, Self, C>> {
        let by_pk = self
            .pk()
            .map_err(|e| e.into_write(WriteOperation::Delete))?
            .eq_current();
        self.delete(factory, [by_pk])
    }

    fn is_deleted(&self) -> bool {
        self.state().is_deleted()
    }
}

impl<M: Model> OrmModel for M {}
