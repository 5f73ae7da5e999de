//! Table and database schema descriptors.
//!
//! These are immutable value objects. Duplicate columns, indexes, relations
//! and tables are rejected when the containing descriptor is constructed.

use std::collections::HashSet;
use std::sync::Arc;

use crate::column::Column;
use crate::error::{Error, Result, SchemaErrorKind};
use crate::validate::is_identifier;

/// Referential action for foreign key constraints (ON DELETE / ON UPDATE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferentialAction {
    #[default]
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

impl ReferentialAction {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Primary,
    Unique,
    Key,
}

/// An index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub fields: Vec<String>,
    pub kind: IndexKind,
}

impl Index {
    /// The table's primary key.
    pub fn primary<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: "PRIMARY".to_string(),
            fields: fields.into_iter().map(Into::into).collect(),
            kind: IndexKind::Primary,
        }
    }

    pub fn unique<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            kind: IndexKind::Unique,
        }
    }

    pub fn key<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            kind: IndexKind::Key,
        }
    }

    pub fn is_primary_key(&self) -> bool {
        self.kind == IndexKind::Primary
    }
}

/// A foreign key relation from this table to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub name: String,
    pub fields: Vec<String>,
    pub reference_table: String,
    pub reference_fields: Vec<String>,
    pub on_delete: ReferentialAction,
    pub on_update: ReferentialAction,
}

impl ForeignKey {
    pub fn new<I, S, J, T>(
        name: impl Into<String>,
        fields: I,
        reference_table: impl Into<String>,
        reference_fields: J,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        J: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            reference_table: reference_table.into(),
            reference_fields: reference_fields.into_iter().map(Into::into).collect(),
            on_delete: ReferentialAction::default(),
            on_update: ReferentialAction::default(),
        }
    }

    pub fn on_delete(mut self, action: ReferentialAction) -> Self {
        self.on_delete = action;
        self
    }

    pub fn on_update(mut self, action: ReferentialAction) -> Self {
        self.on_update = action;
        self
    }
}

/// DDL metadata and an optional explicit table name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOptions {
    /// Overrides the name derived from the model type
    pub name: Option<String>,
    pub engine: Option<String>,
    pub charset: Option<String>,
    pub collation: Option<String>,
}

impl TableOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = Some(engine.into());
        self
    }

    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }
}

/// Full structural description of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    name: String,
    columns: Vec<Arc<Column>>,
    indexes: Vec<Index>,
    relations: Vec<ForeignKey>,
    engine: Option<String>,
    charset: Option<String>,
    collation: Option<String>,
}

impl TableSchema {
    /// Build a table schema, rejecting duplicates and dangling references.
    pub fn new(
        name: impl Into<String>,
        columns: Vec<Arc<Column>>,
        indexes: Vec<Index>,
        relations: Vec<ForeignKey>,
        options: TableOptions,
    ) -> Result<Self> {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(Error::schema(
                SchemaErrorKind::TableName,
                format!("invalid table name '{}'", name),
            ));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(Error::schema(
                    SchemaErrorKind::DuplicateColumn,
                    format!("duplicate column '{}' in table '{}'", column.name, name),
                ));
            }
        }

        let mut index_names = HashSet::new();
        for index in &indexes {
            if !index_names.insert(index.name.as_str()) {
                return Err(Error::schema(
                    SchemaErrorKind::DuplicateIndex,
                    format!("duplicate index '{}' in table '{}'", index.name, name),
                ));
            }
            check_fields(&name, &index.name, &index.fields, &seen)?;
        }
        if indexes.iter().filter(|i| i.is_primary_key()).count() > 1 {
            return Err(Error::schema(
                SchemaErrorKind::DuplicateIndex,
                format!("table '{}' declares more than one primary key", name),
            ));
        }

        let mut relation_names = HashSet::new();
        for relation in &relations {
            if !relation_names.insert(relation.name.as_str()) {
                return Err(Error::schema(
                    SchemaErrorKind::DuplicateRelation,
                    format!("duplicate relation '{}' in table '{}'", relation.name, name),
                ));
            }
            check_fields(&name, &relation.name, &relation.fields, &seen)?;
        }

        Ok(Self {
            name,
            columns,
            indexes,
            relations,
            engine: options.engine,
            charset: options.charset,
            collation: options.collation,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Arc<Column>] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.as_ref())
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    pub fn primary_key(&self) -> Option<&Index> {
        self.indexes.iter().find(|i| i.is_primary_key())
    }

    pub fn relations(&self) -> &[ForeignKey] {
        &self.relations
    }

    pub fn engine(&self) -> Option<&str> {
        self.engine.as_deref()
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    pub fn collation(&self) -> Option<&str> {
        self.collation.as_deref()
    }
}

fn check_fields(table: &str, owner: &str, fields: &[String], known: &HashSet<&str>) -> Result<()> {
    if fields.is_empty() {
        return Err(Error::schema(
            SchemaErrorKind::UnknownColumn,
            format!("'{}' on table '{}' names no columns", owner, table),
        ));
    }
    for field in fields {
        if !known.contains(field.as_str()) {
            return Err(Error::schema(
                SchemaErrorKind::UnknownColumn,
                format!(
                    "'{}' on table '{}' refers to unknown column '{}'",
                    owner, table, field
                ),
            ));
        }
    }
    Ok(())
}

/// A named group of tables.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseSchema {
    name: String,
    tables: Vec<Arc<TableSchema>>,
    engine: Option<String>,
    charset: Option<String>,
    collation: Option<String>,
}

impl DatabaseSchema {
    /// Build a database schema, rejecting duplicate table names.
    ///
    /// `options.name` is ignored; the database is always called `name`.
    pub fn new(
        name: impl Into<String>,
        tables: Vec<Arc<TableSchema>>,
        options: TableOptions,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::schema(
                SchemaErrorKind::TableName,
                "database name must not be empty",
            ));
        }
        let mut seen = HashSet::new();
        for table in &tables {
            if !seen.insert(table.name()) {
                return Err(Error::schema(
                    SchemaErrorKind::DuplicateTable,
                    format!("duplicate table '{}' in database '{}'", table.name(), name),
                ));
            }
        }
        Ok(Self {
            name,
            tables,
            engine: options.engine,
            charset: options.charset,
            collation: options.collation,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tables(&self) -> &[Arc<TableSchema>] {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    pub fn engine(&self) -> Option<&str> {
        self.engine.as_deref()
    }

    pub fn charset(&self) -> Option<&str> {
        self.charset.as_deref()
    }

    pub fn collation(&self) -> Option<&str> {
        self.collation.as_deref()
    }
}
