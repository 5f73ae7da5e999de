//! Raw rows exchanged with the driver.

use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Column names shared by every row of one result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnInfo {
    names: Vec<String>,
    name_to_index: HashMap<String, usize>,
}

impl ColumnInfo {
    /// Create column info from an ordered list of names.
    ///
    /// A repeated name resolves to its last position, matching how
    /// associative fetch modes collapse duplicate result columns.
    pub fn new(names: Vec<String>) -> Self {
        let name_to_index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            names,
            name_to_index,
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// One row: an ordered column-name to value map.
///
/// Rows from the same query share their [`ColumnInfo`] through an `Arc`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<Value>,
    columns: Arc<ColumnInfo>,
}

impl Row {
    /// Create a row with its own column metadata.
    pub fn new(column_names: Vec<String>, values: Vec<Value>) -> Self {
        let columns = Arc::new(ColumnInfo::new(column_names));
        Self { values, columns }
    }

    /// Create a row sharing column metadata with its siblings.
    pub fn with_columns(columns: Arc<ColumnInfo>, values: Vec<Value>) -> Self {
        Self { values, columns }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (names, values): (Vec<String>, Vec<Value>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self::new(names, values)
    }

    pub fn column_info(&self) -> Arc<ColumnInfo> {
        Arc::clone(&self.columns)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a value by column index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get a value by column name.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns.index_of(name).and_then(|i| self.values.get(i))
    }

    /// The value for `name`, treating an explicit NULL like an absent key.
    pub fn provided(&self, name: &str) -> Option<&Value> {
        self.get_by_name(name).filter(|v| !v.is_null())
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.names().iter().map(String::as_str)
    }

    /// Iterate over (column_name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        let row = Row::from_pairs([("id", Value::Int(1)), ("title", Value::from("my blog 1"))]);
        assert_eq!(row.len(), 2);
        assert_eq!(row.get_by_name("id"), Some(&Value::Int(1)));
        assert_eq!(row.get(1), Some(&Value::Text("my blog 1".into())));
        assert!(row.get_by_name("missing").is_none());
    }

    #[test]
    fn test_provided_skips_null() {
        let row = Row::from_pairs([("a", Value::Null), ("b", Value::Int(2))]);
        assert!(row.contains_column("a"));
        assert!(row.provided("a").is_none());
        assert_eq!(row.provided("b"), Some(&Value::Int(2)));
        assert!(row.provided("c").is_none());
    }

    #[test]
    fn test_shared_columns() {
        let columns = Arc::new(ColumnInfo::new(vec!["id".into()]));
        let a = Row::with_columns(Arc::clone(&columns), vec![Value::Int(1)]);
        let b = Row::with_columns(Arc::clone(&columns), vec![Value::Int(2)]);
        assert!(Arc::ptr_eq(&a.column_info(), &b.column_info()));
        let pairs: Vec<_> = b.iter().collect();
        assert_eq!(pairs, vec![("id", &Value::Int(2))]);
    }

    #[test]
    fn test_default_row_is_empty() {
        let row = Row::default();
        assert!(row.is_empty());
        assert_eq!(row.column_names().count(), 0);
    }
}
