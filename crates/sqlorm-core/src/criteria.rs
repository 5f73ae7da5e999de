//! WHERE-clause fragments produced by fields.

use crate::value::{BindMap, Value};

/// Comparison operators a field can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
}

impl Operator {
    pub const fn as_sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "<>",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "LIKE",
            Operator::NotLike => "NOT LIKE",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::IsNull => "IS NULL",
            Operator::IsNotNull => "IS NOT NULL",
        }
    }

    /// Whether the operator takes no operand.
    pub const fn is_unary(self) -> bool {
        matches!(self, Operator::IsNull | Operator::IsNotNull)
    }

    /// Whether the operand is a parenthesized list.
    pub const fn is_list(self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }
}

/// A condition with named placeholders, its binds and a combinator.
///
/// `and` decides how this criterion joins the conditions added before it;
/// it is ignored for the first criterion of a WHERE clause. Criteria built
/// by [`compare`](Criteria::compare) remember their leading column so the
/// statement renderer can quote it for its dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct Criteria {
    cond: String,
    binds: BindMap,
    and: bool,
    column: Option<String>,
}

impl Criteria {
    pub fn new(cond: impl Into<String>, binds: BindMap) -> Self {
        Self {
            cond: cond.into(),
            binds,
            and: true,
            column: None,
        }
    }

    /// A condition without binds.
    pub fn raw(cond: impl Into<String>) -> Self {
        Self::new(cond, BindMap::new())
    }

    /// Render `column <op> :column` with `value` bound under the column name.
    ///
    /// List operators expect a `Value::Array` and render `column IN (:column)`;
    /// the statement builder expands the array into one placeholder per item.
    pub fn compare(column: &str, op: Operator, value: Value) -> Self {
        let mut binds = BindMap::new();
        let cond = if op.is_unary() {
            format!("{} {}", column, op.as_sql())
        } else {
            binds.insert(column.to_string(), value);
            if op.is_list() {
                format!("{} {} (:{})", column, op.as_sql(), column)
            } else {
                format!("{} {} :{}", column, op.as_sql(), column)
            }
        };
        Self {
            column: Some(column.to_string()),
            ..Self::new(cond, binds)
        }
    }

    /// Combine with the preceding conditions using OR.
    pub fn or(mut self) -> Self {
        self.and = false;
        self
    }

    /// Combine with the preceding conditions using AND (the default).
    pub fn and(mut self) -> Self {
        self.and = true;
        self
    }

    pub fn is_and(&self) -> bool {
        self.and
    }

    pub fn cond(&self) -> &str {
        &self.cond
    }

    pub fn binds(&self) -> &BindMap {
        &self.binds
    }

    /// The column `cond` starts with, for criteria built by `compare`.
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }

    pub fn into_parts(self) -> (String, BindMap, bool) {
        (self.cond, self.binds, self.and)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare() {
        let c = Criteria::compare("id", Operator::Gte, Value::Int(3));
        assert_eq!(c.cond(), "id >= :id");
        assert_eq!(c.binds().get("id"), Some(&Value::Int(3)));
        assert_eq!(c.column(), Some("id"));
        assert!(c.is_and());
        assert_eq!(Criteria::raw("1 = 1").column(), None);
    }

    #[test]
    fn test_list_and_unary() {
        let c = Criteria::compare(
            "id",
            Operator::NotIn,
            Value::Array(vec![Value::Int(1), Value::Int(2)]),
        );
        assert_eq!(c.cond(), "id NOT IN (:id)");

        let c = Criteria::compare("title", Operator::IsNull, Value::Null);
        assert_eq!(c.cond(), "title IS NULL");
        assert!(c.binds().is_empty());
    }

    #[test]
    fn test_combinator() {
        let c = Criteria::raw("1 = 1").or();
        assert!(!c.is_and());
        assert!(c.and().is_and());
    }
}
