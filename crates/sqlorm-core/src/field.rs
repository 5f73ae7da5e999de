//! Typed, dirty-tracked column values.
//!
//! A [`Field`] wraps one column of one model instance: the shared column
//! descriptor, the current value and a dirty flag. Every assignment marks
//! both the field and its owning model dirty; only [`Field::undirty`] (run
//! by the model after a successful write) clears it.
//!
//! The per-type behavior (bind normalization, hydration parsing, last
//! insert id assignment) lives in a [`FieldKind`].

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{NaiveDate, NaiveDateTime};

use crate::column::Column;
use crate::criteria::{Criteria, Operator};
use crate::error::{Error, Result, TypeError};
use crate::row::Row;
use crate::value::{BindMap, Value};

/// Storage format for DATETIME/TIMESTAMP binds.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Storage format for DATE binds.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Shared dirty flag of a model instance.
///
/// Each field of the instance holds a clone so assignments can mark the
/// model without a back-reference to it.
#[derive(Debug, Clone, Default)]
pub struct DirtyFlag(Arc<AtomicBool>);

impl DirtyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A field's own dirty bit plus its owner's flag.
#[derive(Debug)]
pub struct DirtyState {
    dirty: bool,
    model: DirtyFlag,
}

impl DirtyState {
    pub fn new(model: DirtyFlag) -> Self {
        Self {
            dirty: false,
            model,
        }
    }

    pub fn mark(&mut self) {
        self.dirty = true;
        self.model.mark();
    }

    pub fn clear(&mut self) {
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// Type-specific conversions for one SQL type family.
pub trait FieldKind: Send + Sync + 'static {
    /// The Rust value held by the field.
    type Value: Clone + fmt::Debug + PartialEq + Send + Sync + 'static;

    /// Short name used in type errors.
    const NAME: &'static str;

    /// Normalize a value for binding.
    fn to_sql(value: &Self::Value) -> Value;

    /// Parse a raw driver value; `None` when it cannot be converted.
    fn from_sql(raw: &Value) -> Option<Self::Value>;

    /// Interpret a driver's last-insert-id string.
    ///
    /// Kinds that cannot hold a generated key return `None` and are left
    /// untouched after an insert.
    fn from_insert_id(_id: &str) -> Option<Self::Value> {
        None
    }
}

/// Integer families (TINYINT..BIGINT, YEAR).
#[derive(Debug)]
pub struct IntKind;

impl FieldKind for IntKind {
    type Value = i64;
    const NAME: &'static str = "integer";

    fn to_sql(value: &i64) -> Value {
        Value::Int(*value)
    }

    fn from_sql(raw: &Value) -> Option<i64> {
        match raw {
            Value::Int(v) => Some(*v),
            Value::Bool(v) => Some(i64::from(*v)),
            Value::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn from_insert_id(id: &str) -> Option<i64> {
        id.trim().parse().ok()
    }
}

/// BOOL / TINYINT(1), bound as 0/1.
#[derive(Debug)]
pub struct BoolKind;

impl FieldKind for BoolKind {
    type Value = bool;
    const NAME: &'static str = "bool";

    fn to_sql(value: &bool) -> Value {
        Value::Int(i64::from(*value))
    }

    fn from_sql(raw: &Value) -> Option<bool> {
        match raw {
            Value::Bool(v) => Some(*v),
            Value::Int(v) => Some(*v != 0),
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" => Some(true),
                "0" | "false" | "" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    fn from_insert_id(id: &str) -> Option<bool> {
        Some(!(id.is_empty() || id == "0"))
    }
}

/// CHAR / VARCHAR / TEXT.
#[derive(Debug)]
pub struct StringKind;

impl FieldKind for StringKind {
    type Value = String;
    const NAME: &'static str = "string";

    fn to_sql(value: &String) -> Value {
        Value::Text(value.clone())
    }

    fn from_sql(raw: &Value) -> Option<String> {
        scalar_to_string(raw)
    }

    fn from_insert_id(id: &str) -> Option<String> {
        Some(id.to_string())
    }
}

/// ENUM, holding one of the column's options.
#[derive(Debug)]
pub struct EnumKind;

impl FieldKind for EnumKind {
    type Value = String;
    const NAME: &'static str = "enum";

    fn to_sql(value: &String) -> Value {
        Value::Text(value.clone())
    }

    fn from_sql(raw: &Value) -> Option<String> {
        scalar_to_string(raw)
    }
}

/// FLOAT / DOUBLE / DECIMAL.
#[derive(Debug)]
pub struct FloatKind;

impl FieldKind for FloatKind {
    type Value = f64;
    const NAME: &'static str = "float";

    fn to_sql(value: &f64) -> Value {
        Value::Float(*value)
    }

    fn from_sql(raw: &Value) -> Option<f64> {
        match raw {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn from_insert_id(id: &str) -> Option<f64> {
        id.trim().parse().ok()
    }
}

/// DATETIME / TIMESTAMP.
#[derive(Debug)]
pub struct DateTimeKind;

impl FieldKind for DateTimeKind {
    type Value = NaiveDateTime;
    const NAME: &'static str = "datetime";

    fn to_sql(value: &NaiveDateTime) -> Value {
        Value::Text(value.format(DATETIME_FORMAT).to_string())
    }

    fn from_sql(raw: &Value) -> Option<NaiveDateTime> {
        let text = raw.as_str()?.trim();
        const FORMATS: [&str; 4] = [
            DATETIME_FORMAT,
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%dT%H:%M:%S%.f",
        ];
        FORMATS
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(text, DATE_FORMAT)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
    }
}

/// DATE.
#[derive(Debug)]
pub struct DateKind;

impl FieldKind for DateKind {
    type Value = NaiveDate;
    const NAME: &'static str = "date";

    fn to_sql(value: &NaiveDate) -> Value {
        Value::Text(value.format(DATE_FORMAT).to_string())
    }

    fn from_sql(raw: &Value) -> Option<NaiveDate> {
        let text = raw.as_str()?.trim();
        NaiveDate::parse_from_str(text, DATE_FORMAT)
            .ok()
            .or_else(|| DateTimeKind::from_sql(raw).map(|dt| dt.date()))
    }
}

/// SET, stored as a comma-joined list.
#[derive(Debug)]
pub struct SetKind;

impl FieldKind for SetKind {
    type Value = Vec<String>;
    const NAME: &'static str = "set";

    fn to_sql(value: &Vec<String>) -> Value {
        Value::Text(value.join(","))
    }

    fn from_sql(raw: &Value) -> Option<Vec<String>> {
        let text = raw.as_str()?;
        Some(
            text.split(',')
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

/// JSON, kept as its raw text.
#[derive(Debug)]
pub struct JsonKind;

impl FieldKind for JsonKind {
    type Value = String;
    const NAME: &'static str = "json";

    fn to_sql(value: &String) -> Value {
        Value::Text(value.clone())
    }

    fn from_sql(raw: &Value) -> Option<String> {
        match raw {
            Value::Text(s) => Some(s.clone()),
            Value::Bytes(b) => String::from_utf8(b.clone()).ok(),
            _ => None,
        }
    }
}

/// BINARY / VARBINARY / BLOB.
#[derive(Debug)]
pub struct BinaryKind;

impl FieldKind for BinaryKind {
    type Value = Vec<u8>;
    const NAME: &'static str = "binary";

    fn to_sql(value: &Vec<u8>) -> Value {
        Value::Bytes(value.clone())
    }

    fn from_sql(raw: &Value) -> Option<Vec<u8>> {
        raw.as_bytes().map(<[u8]>::to_vec)
    }
}

fn scalar_to_string(raw: &Value) -> Option<String> {
    match raw {
        Value::Text(s) => Some(s.clone()),
        Value::Int(v) => Some(v.to_string()),
        Value::Float(v) => Some(v.to_string()),
        Value::Bool(v) => Some(if *v { "1" } else { "0" }.to_string()),
        Value::Bytes(b) => String::from_utf8(b.clone()).ok(),
        Value::Null | Value::Array(_) => None,
    }
}

/// One column of one model instance.
pub struct Field<K: FieldKind> {
    column: Arc<Column>,
    value: Option<K::Value>,
    dirty: DirtyState,
    _kind: PhantomData<fn() -> K>,
}

pub type IntField = Field<IntKind>;
pub type BoolField = Field<BoolKind>;
pub type StringField = Field<StringKind>;
pub type EnumField = Field<EnumKind>;
pub type FloatField = Field<FloatKind>;
pub type DateTimeField = Field<DateTimeKind>;
pub type DateField = Field<DateKind>;
pub type SetField = Field<SetKind>;
pub type JsonField = Field<JsonKind>;
pub type BinaryField = Field<BinaryKind>;

impl<K: FieldKind> Field<K> {
    /// Create an empty field bound to `column`, reporting to `model`.
    pub fn new(column: Arc<Column>, model: DirtyFlag) -> Self {
        Self {
            column,
            value: None,
            dirty: DirtyState::new(model),
            _kind: PhantomData,
        }
    }

    /// Load the column's value from `row` without marking anything dirty.
    ///
    /// Absent keys and NULLs leave the current value in place.
    pub fn hydrate(&mut self, row: &Row) -> Result<()> {
        if let Some(raw) = row.provided(&self.column.name) {
            let parsed = K::from_sql(raw).ok_or_else(|| {
                Error::Type(TypeError {
                    expected: K::NAME,
                    actual: format!("{} '{}'", raw.type_name(), raw),
                    column: Some(self.column.name.clone()),
                })
            })?;
            self.value = Some(parsed);
        }
        Ok(())
    }

    pub fn column(&self) -> &Column {
        &self.column
    }

    pub fn column_name(&self) -> &str {
        &self.column.name
    }

    pub fn value(&self) -> Option<&K::Value> {
        self.value.as_ref()
    }

    /// Owned copy of the current value.
    pub fn get(&self) -> Option<K::Value> {
        self.value.clone()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Assign a value. Always marks the field and its model dirty.
    pub fn set(&mut self, value: impl Into<K::Value>) {
        self.set_value(Some(value.into()));
    }

    /// Assign a nullable value. Always marks the field and its model dirty.
    pub fn set_value(&mut self, value: Option<K::Value>) {
        self.dirty.mark();
        self.value = value;
    }

    pub fn set_null(&mut self) {
        self.set_value(None);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    pub fn undirty(&mut self) {
        self.dirty.clear();
    }

    /// The current value normalized for binding.
    pub fn sql_value(&self) -> Value {
        self.value.as_ref().map_or(Value::Null, K::to_sql)
    }

    /// `{column: value}` for INSERT/UPDATE column lists.
    pub fn to_query(&self) -> BindMap {
        let mut map = BindMap::new();
        map.insert(self.column.name.clone(), self.sql_value());
        map
    }

    fn operand(&self, value: Option<K::Value>) -> Value {
        match value {
            Some(v) => K::to_sql(&v),
            None => self.sql_value(),
        }
    }

    fn compare(&self, op: Operator, value: Option<K::Value>) -> Criteria {
        Criteria::compare(&self.column.name, op, self.operand(value))
    }

    fn list(&self, op: Operator, values: Vec<K::Value>) -> Criteria {
        let items = if values.is_empty() {
            vec![self.sql_value()]
        } else {
            values.iter().map(K::to_sql).collect()
        };
        Criteria::compare(&self.column.name, op, Value::Array(items))
    }

    fn pattern(&self, op: Operator, pattern: Option<&str>) -> Criteria {
        let value = match pattern {
            Some(p) => Value::Text(p.to_string()),
            None => self.sql_value(),
        };
        Criteria::compare(&self.column.name, op, value)
    }

    /// `column = :column`; `None` compares against the current value.
    pub fn eq(&self, value: Option<K::Value>) -> Criteria {
        self.compare(Operator::Eq, value)
    }

    pub fn ne(&self, value: Option<K::Value>) -> Criteria {
        self.compare(Operator::Ne, value)
    }

    pub fn gt(&self, value: Option<K::Value>) -> Criteria {
        self.compare(Operator::Gt, value)
    }

    pub fn gte(&self, value: Option<K::Value>) -> Criteria {
        self.compare(Operator::Gte, value)
    }

    pub fn lt(&self, value: Option<K::Value>) -> Criteria {
        self.compare(Operator::Lt, value)
    }

    pub fn lte(&self, value: Option<K::Value>) -> Criteria {
        self.compare(Operator::Lte, value)
    }

    pub fn like(&self, pattern: Option<&str>) -> Criteria {
        self.pattern(Operator::Like, pattern)
    }

    pub fn not_like(&self, pattern: Option<&str>) -> Criteria {
        self.pattern(Operator::NotLike, pattern)
    }

    /// `column IN (...)`; an empty list means "the current value".
    pub fn is_in(&self, values: Vec<K::Value>) -> Criteria {
        self.list(Operator::In, values)
    }

    /// `column NOT IN (...)`; an empty list means "the current value".
    pub fn not_in(&self, values: Vec<K::Value>) -> Criteria {
        self.list(Operator::NotIn, values)
    }

    pub fn is_null(&self) -> Criteria {
        Criteria::compare(&self.column.name, Operator::IsNull, Value::Null)
    }

    pub fn is_not_null(&self) -> Criteria {
        Criteria::compare(&self.column.name, Operator::IsNotNull, Value::Null)
    }
}

impl Field<JsonKind> {
    /// Decode the stored JSON text.
    pub fn decode(&self) -> Result<Option<serde_json::Value>> {
        self.value
            .as_deref()
            .map(serde_json::from_str)
            .transpose()
            .map_err(|e| {
                Error::Type(TypeError {
                    expected: JsonKind::NAME,
                    actual: e.to_string(),
                    column: Some(self.column.name.clone()),
                })
            })
    }

    /// Store `value` encoded as JSON text.
    pub fn set_json(&mut self, value: &serde_json::Value) {
        self.set(value.to_string());
    }
}

impl Field<EnumKind> {
    /// Whether the current value is one of the column's options.
    pub fn is_valid_option(&self) -> bool {
        self.value
            .as_ref()
            .is_none_or(|v| self.column.options.iter().any(|o| o == v))
    }
}

impl<K: FieldKind> fmt::Debug for Field<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("column", &self.column.name)
            .field("kind", &K::NAME)
            .field("value", &self.value)
            .field("dirty", &self.dirty.is_dirty())
            .finish()
    }
}

/// Type-erased view of a field, used by models to walk their columns.
pub trait AnyField: fmt::Debug + Send + Sync {
    fn column(&self) -> &Column;

    /// The cached descriptor handle, shared across instances.
    fn shared_column(&self) -> Arc<Column>;

    fn column_name(&self) -> &str {
        &self.column().name
    }

    fn kind_name(&self) -> &'static str;

    fn is_dirty(&self) -> bool;

    fn undirty(&mut self);

    fn sql_value(&self) -> Value;

    fn to_query(&self) -> BindMap;

    /// `column = :column` against the current value.
    fn eq_current(&self) -> Criteria;

    /// Assign a generated key; returns `false` when the kind cannot hold it.
    fn set_from_insert_id(&mut self, id: &str) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<K: FieldKind> AnyField for Field<K> {
    fn column(&self) -> &Column {
        &self.column
    }

    fn shared_column(&self) -> Arc<Column> {
        Arc::clone(&self.column)
    }

    fn kind_name(&self) -> &'static str {
        K::NAME
    }

    fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    fn undirty(&mut self) {
        self.dirty.clear();
    }

    fn sql_value(&self) -> Value {
        self.value.as_ref().map_or(Value::Null, K::to_sql)
    }

    fn to_query(&self) -> BindMap {
        let mut map = BindMap::new();
        map.insert(self.column.name.clone(), AnyField::sql_value(self));
        map
    }

    fn eq_current(&self) -> Criteria {
        self.compare(Operator::Eq, None)
    }

    fn set_from_insert_id(&mut self, id: &str) -> bool {
        match K::from_insert_id(id) {
            Some(value) => {
                self.set_value(Some(value));
                true
            }
            None => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
