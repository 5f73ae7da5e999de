//! Model trait for mapping structs of typed fields to tables.
//!
//! A model is a struct whose columns are [`Field`]s. Fields are declared
//! explicitly through a [`FieldRegistrar`] inside [`Model::from_row`]; the
//! registrar shares column descriptors across instances and hydrates each
//! field from the incoming row. Structural metadata (schema, column names,
//! table name) is derived once per model type and cached.

use std::any::TypeId;
use std::marker::PhantomData;
use std::sync::Arc;

use heck::ToSnakeCase;

use crate::column::Column;
use crate::error::{Error, FieldNotFoundError, Result, SchemaErrorKind, TypeError};
use crate::field::{
    AnyField, BinaryField, BoolField, DateField, DateTimeField, DirtyFlag, EnumField, Field,
    FieldKind, FloatField, IntField, JsonField, SetField, StringField,
};
use crate::registry::{COLUMNS, FIELD_SHAPES, SCHEMAS, TABLE_NAMES};
use crate::row::Row;
use crate::schema::{ForeignKey, Index, TableOptions, TableSchema};
use crate::types::SqlType;
use crate::validate::is_identifier;
use crate::value::BindMap;

/// Per-instance lifecycle state of a model.
#[derive(Debug)]
pub struct ModelState {
    dirty: DirtyFlag,
    is_new: bool,
    is_deleted: bool,
}

impl ModelState {
    /// State of a freshly constructed, never persisted instance.
    pub fn new() -> Self {
        Self {
            dirty: DirtyFlag::new(),
            is_new: true,
            is_deleted: false,
        }
    }

    /// A handle fields use to mark this model dirty.
    pub fn dirty_flag(&self) -> DirtyFlag {
        self.dirty.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn clear_dirty(&self) {
        self.dirty.clear();
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn set_new(&mut self, value: bool) {
        self.is_new = value;
    }

    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    pub fn mark_deleted(&mut self) {
        self.is_deleted = true;
    }
}

impl Default for ModelState {
    fn default() -> Self {
        Self::new()
    }
}

/// Declares the fields of one model instance.
///
/// Each call looks up (or creates and validates) the shared column
/// descriptor for `(M, name)`, builds a field wired to the instance's dirty
/// flag and hydrates it from the row. Declaration order is column order.
///
/// # Example
///
/// ```ignore
/// fn from_row(row: &Row) -> Result<Self> {
///     let mut fields = FieldRegistrar::<Self>::new(row);
///     Ok(Self {
///         id: fields.int("id", |c| c.size(11).unsigned().autoincrement())?,
///         title: fields.varchar("title", |c| c.size(100))?,
///         state: fields.finish(),
///     })
/// }
/// ```
pub struct FieldRegistrar<'r, M: 'static> {
    row: &'r Row,
    state: ModelState,
    _model: PhantomData<fn() -> M>,
}

impl<'r, M: 'static> FieldRegistrar<'r, M> {
    pub fn new(row: &'r Row) -> Self {
        Self {
            row,
            state: ModelState::new(),
            _model: PhantomData,
        }
    }

    /// Register a column of any kind.
    ///
    /// `configure` only runs the first time the column is seen for `M`.
    pub fn field<K, F>(&mut self, name: &str, sql_type: SqlType, configure: F) -> Result<Field<K>>
    where
        K: FieldKind,
        F: FnOnce(Column) -> Column,
    {
        let column = COLUMNS.get_or_try_init((TypeId::of::<M>(), name.to_string()), || {
            let column = configure(Column::new(name, sql_type));
            column.validate()?;
            Ok(column)
        })?;
        let mut field = Field::new(column, self.state.dirty_flag());
        field.hydrate(self.row)?;
        Ok(field)
    }

    pub fn tiny_int(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<IntField> {
        self.field(name, SqlType::TinyInt, configure)
    }

    pub fn small_int(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<IntField> {
        self.field(name, SqlType::SmallInt, configure)
    }

    pub fn medium_int(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<IntField> {
        self.field(name, SqlType::MediumInt, configure)
    }

    pub fn int(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<IntField> {
        self.field(name, SqlType::Int, configure)
    }

    pub fn big_int(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<IntField> {
        self.field(name, SqlType::BigInt, configure)
    }

    pub fn year(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<IntField> {
        self.field(name, SqlType::Year, configure)
    }

    pub fn bool(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<BoolField> {
        self.field(name, SqlType::Bool, configure)
    }

    pub fn float(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<FloatField> {
        self.field(name, SqlType::Float, configure)
    }

    pub fn double(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<FloatField> {
        self.field(name, SqlType::Double, configure)
    }

    pub fn decimal(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<FloatField> {
        self.field(name, SqlType::Decimal, configure)
    }

    pub fn char(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<StringField> {
        self.field(name, SqlType::Char, configure)
    }

    pub fn varchar(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<StringField> {
        self.field(name, SqlType::VarChar, configure)
    }

    pub fn text(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<StringField> {
        self.field(name, SqlType::Text, configure)
    }

    pub fn binary(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<BinaryField> {
        self.field(name, SqlType::Binary, configure)
    }

    pub fn varbinary(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<BinaryField> {
        self.field(name, SqlType::VarBinary, configure)
    }

    pub fn blob(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<BinaryField> {
        self.field(name, SqlType::Blob, configure)
    }

    pub fn date(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<DateField> {
        self.field(name, SqlType::Date, configure)
    }

    pub fn datetime(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<DateTimeField> {
        self.field(name, SqlType::DateTime, configure)
    }

    pub fn timestamp(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<DateTimeField> {
        self.field(name, SqlType::Timestamp, configure)
    }

    pub fn json(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<JsonField> {
        self.field(name, SqlType::Json, configure)
    }

    pub fn enumeration(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<EnumField> {
        self.field(name, SqlType::Enum, configure)
    }

    pub fn set(&mut self, name: &str, configure: impl FnOnce(Column) -> Column) -> Result<SetField> {
        self.field(name, SqlType::Set, configure)
    }

    /// Finish registration and hand over the instance state.
    pub fn finish(self) -> ModelState {
        self.state
    }
}

/// Trait for structs of [`Field`]s mapped to one table.
///
/// Implementors write [`from_row`](Model::from_row) with a
/// [`FieldRegistrar`] and let [`model_fields!`](crate::model_fields) supply
/// the accessors. Everything else has a default.
///
/// # Example
///
/// ```ignore
/// struct BlogModel {
///     id: IntField,
///     title: StringField,
///     state: ModelState,
/// }
///
/// impl Model for BlogModel {
///     fn from_row(row: &Row) -> Result<Self> { /* registrar */ }
///
///     model_fields!(state; id, title);
/// }
/// ```
pub trait Model: Sized + Send + Sync + 'static {
    /// Build an instance, hydrating fields from `row`.
    ///
    /// Absent or NULL columns keep their defaults.
    fn from_row(row: &Row) -> Result<Self>;

    /// This instance's fields in declaration order.
    fn fields(&self) -> Vec<&dyn AnyField>;

    fn fields_mut(&mut self) -> Vec<&mut dyn AnyField>;

    fn state(&self) -> &ModelState;

    fn state_mut(&mut self) -> &mut ModelState;

    /// Explicit table name and DDL metadata.
    fn table_options() -> TableOptions {
        TableOptions::default()
    }

    /// Static index declarations.
    fn indexes() -> Vec<Index> {
        Vec::new()
    }

    /// Static relation declarations.
    fn relations() -> Vec<ForeignKey> {
        Vec::new()
    }

    /// A fresh, empty instance.
    fn new() -> Result<Self> {
        Self::from_row(&Row::default())
    }

    /// Short type name, used in error messages.
    fn model_name() -> &'static str {
        short_type_name::<Self>()
    }

    /// Table name: explicit option, or derived from the type name.
    fn table_name() -> Result<Arc<String>> {
        TABLE_NAMES.get_or_try_init(TypeId::of::<Self>(), || {
            match Self::table_options().name {
                Some(name) if is_identifier(&name) => Ok(name),
                Some(name) => Err(Error::schema(
                    SchemaErrorKind::TableName,
                    format!("invalid table name '{}'", name),
                )),
                None => derive_table_name(Self::model_name()),
            }
        })
    }

    /// The table schema, built once per model type.
    fn schema() -> Result<Arc<TableSchema>> {
        SCHEMAS.get_or_try_init(TypeId::of::<Self>(), || {
            let prototype = Self::new()?;
            let columns = prototype.fields().iter().map(|f| f.shared_column()).collect();
            let table = TableSchema::new(
                Self::table_name()?.as_str(),
                columns,
                Self::indexes(),
                Self::relations(),
                Self::table_options(),
            )?;
            tracing::debug!(
                table = table.name(),
                columns = table.columns().len(),
                "Built table schema"
            );
            Ok(table)
        })
    }

    /// Column names in schema order, cached once the schema validates.
    fn column_names() -> Result<Arc<Vec<String>>> {
        FIELD_SHAPES.get_or_try_init(TypeId::of::<Self>(), || Ok(Self::schema()?.column_names()))
    }

    fn field(&self, column: &str) -> Result<&dyn AnyField> {
        self.fields()
            .into_iter()
            .find(|f| f.column_name() == column)
            .ok_or_else(|| field_not_found::<Self>(Some(column)))
    }

    fn field_mut(&mut self, column: &str) -> Result<&mut dyn AnyField> {
        self.fields_mut()
            .into_iter()
            .find(|f| f.column_name() == column)
            .ok_or_else(|| field_not_found::<Self>(Some(column)))
    }

    /// The field for `column`, downcast to its concrete kind.
    fn typed_field<K: FieldKind>(&self, column: &str) -> Result<&Field<K>> {
        let field = self.field(column)?;
        let kind = field.kind_name();
        field.as_any().downcast_ref::<Field<K>>().ok_or_else(|| {
            Error::Type(TypeError {
                expected: K::NAME,
                actual: kind.to_string(),
                column: Some(column.to_string()),
            })
        })
    }

    /// The primary-key field.
    ///
    /// The first autoincrement column wins; otherwise the column of a
    /// single-column primary key index.
    fn pk(&self) -> Result<&dyn AnyField> {
        if let Some(field) = self.fields().into_iter().find(|f| f.column().autoincrement) {
            return Ok(field);
        }

        let schema = Self::schema().map_err(|e| {
            Error::FieldNotFound(FieldNotFoundError {
                model: Self::model_name(),
                column: None,
                message: e.to_string(),
            })
        })?;
        match schema.primary_key() {
            Some(index) if index.fields.len() == 1 => self.field(&index.fields[0]),
            _ => Err(field_not_found::<Self>(None)),
        }
    }

    fn pk_mut(&mut self) -> Result<&mut dyn AnyField> {
        let column = self.pk()?.column_name().to_string();
        self.field_mut(&column)
    }

    fn dirty_fields(&self) -> Vec<&dyn AnyField> {
        self.fields().into_iter().filter(|f| f.is_dirty()).collect()
    }

    /// `{column: value}` for every dirty field, in field order.
    fn dirty_fields_to_query(&self) -> BindMap {
        let mut map = BindMap::new();
        for field in self.dirty_fields() {
            map.extend(field.to_query());
        }
        map
    }

    /// Build an instance from a stored row; it is not new.
    fn new_from_row(row: &Row) -> Result<Self> {
        let mut model = Self::from_row(row)?;
        model.state_mut().set_new(false);
        Ok(model)
    }

    fn new_from_rows(rows: &[Row]) -> Result<Vec<Self>> {
        rows.iter().map(Self::new_from_row).collect()
    }

    /// Clear the dirty flag of the model and of every field.
    fn undirty(&mut self) {
        self.state().clear_dirty();
        for field in self.fields_mut() {
            field.undirty();
        }
    }

    fn is_dirty(&self) -> bool {
        self.state().is_dirty()
    }

    fn is_new(&self) -> bool {
        self.state().is_new()
    }
}

/// Implement the field and state accessors of [`Model`].
///
/// ```ignore
/// impl Model for BlogModel {
///     fn from_row(row: &Row) -> Result<Self> { /* ... */ }
///
///     model_fields!(state; id, title);
/// }
/// ```
#[macro_export]
macro_rules! model_fields {
    ($state:ident; $($field:ident),+ $(,)?) => {
        fn fields(&self) -> ::std::vec::Vec<&dyn $crate::field::AnyField> {
            ::std::vec![$(&self.$field as &dyn $crate::field::AnyField),+]
        }

        fn fields_mut(&mut self) -> ::std::vec::Vec<&mut dyn $crate::field::AnyField> {
            ::std::vec![$(&mut self.$field as &mut dyn $crate::field::AnyField),+]
        }

        fn state(&self) -> &$crate::model::ModelState {
            &self.$state
        }

        fn state_mut(&mut self) -> &mut $crate::model::ModelState {
            &mut self.$state
        }
    };
}

/// Derive a table name from a type name.
///
/// A trailing `Model` is dropped and the rest is snake-cased:
/// `BlogOrmModel` becomes `blog_orm`.
pub fn derive_table_name(type_name: &str) -> Result<String> {
    let stem = type_name.strip_suffix("Model").unwrap_or(type_name);
    let name = stem.to_snake_case();
    if name.is_empty() || !is_identifier(&name) {
        return Err(Error::schema(
            SchemaErrorKind::TableName,
            format!("cannot derive a table name from '{}'", type_name),
        ));
    }
    Ok(name)
}

fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

fn field_not_found<M: Model>(column: Option<&str>) -> Error {
    let message = match column {
        Some(column) => format!("field '{}' does not exist in model {}", column, M::model_name()),
        None => format!("cannot find primary key on model {}", M::model_name()),
    };
    Error::FieldNotFound(FieldNotFoundError {
        model: M::model_name(),
        column: column.map(str::to_string),
        message,
    })
}
