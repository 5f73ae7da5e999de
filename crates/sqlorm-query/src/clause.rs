//! SQL clause types (WHERE, ORDER BY).

use regex::{NoExpand, Regex};
use sqlorm_core::{BindMap, Criteria, Error, QueryError, QueryErrorKind, Result, Value};

use crate::dialect::Dialect;

/// WHERE clause folded from criteria, left to right.
///
/// The first criterion is the base condition; each later one joins with
/// `AND` or `OR` according to its own flag. No grouping parentheses are
/// added, so `a OR b AND c` follows SQL precedence.
///
/// Bind names are settled at render time: a bind colliding with a name
/// already taken (by an earlier criterion, or by the statement's column
/// binds) is renamed `name_1`, `name_2`, ... in both its condition text
/// and the bind map. `Value::Array` binds expand into one placeholder per
/// item (`:id_0, :id_1`).
///
/// Criteria built from a field comparison get their leading column quoted
/// for the dialect; raw conditions are emitted as written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WhereClause {
    criteria: Vec<Criteria>,
}

/// Final placement of one criterion bind.
#[derive(Debug)]
struct Slot<'a> {
    from: &'a str,
    names: Vec<String>,
    list: bool,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, criteria: Criteria) {
        self.criteria.push(criteria);
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn criteria(&self) -> &[Criteria] {
        &self.criteria
    }

    /// Decide every bind name, given names already used by the statement.
    fn plan<'a>(&'a self, reserved: &BindMap) -> (Vec<Vec<Slot<'a>>>, BindMap) {
        let mut binds = BindMap::new();
        let mut plan = Vec::with_capacity(self.criteria.len());

        for criteria in &self.criteria {
            let mut slots = Vec::with_capacity(criteria.binds().len());
            for (name, value) in criteria.binds() {
                let taken = |n: &str| reserved.contains_key(n) || binds.contains_key(n);
                let slot = match value {
                    Value::Array(items) => {
                        let base = fresh_base(name, |base| {
                            (0..items.len()).any(|i| taken(&format!("{}_{}", base, i)))
                        });
                        let names: Vec<String> =
                            (0..items.len()).map(|i| format!("{}_{}", base, i)).collect();
                        for (n, item) in names.iter().zip(items) {
                            binds.insert(n.clone(), item.clone());
                        }
                        Slot {
                            from: name,
                            names,
                            list: true,
                        }
                    }
                    scalar => {
                        let target = fresh_base(name, taken);
                        if target != *name {
                            tracing::trace!(from = %name, to = %target, "Renamed colliding bind");
                        }
                        binds.insert(target.clone(), scalar.clone());
                        Slot {
                            from: name,
                            names: vec![target],
                            list: false,
                        }
                    }
                };
                slots.push(slot);
            }
            plan.push(slots);
        }

        (plan, binds)
    }

    /// The bind values the rendered clause refers to.
    pub fn binds(&self, reserved: &BindMap) -> BindMap {
        self.plan(reserved).1
    }

    /// Render the condition text (without the `WHERE` keyword) and binds.
    ///
    /// Returns `None` when there are no criteria.
    pub fn render(
        &self,
        dialect: Dialect,
        reserved: &BindMap,
    ) -> Result<Option<(String, BindMap)>> {
        if self.criteria.is_empty() {
            return Ok(None);
        }

        let (plan, binds) = self.plan(reserved);
        let mut sql = String::new();
        for (i, (criteria, slots)) in self.criteria.iter().zip(plan).enumerate() {
            let mut cond = quote_leading_column(dialect, criteria);
            for slot in slots {
                if !slot.list && slot.names.first().map(String::as_str) == Some(slot.from) {
                    continue;
                }
                let replacement = if slot.names.is_empty() {
                    "NULL".to_string()
                } else {
                    slot.names
                        .iter()
                        .map(|n| format!(":{}", n))
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                cond = replace_placeholder(&cond, slot.from, &replacement)?;
            }

            if i > 0 {
                sql.push_str(if criteria.is_and() { " AND " } else { " OR " });
            }
            sql.push_str(&cond);
        }

        Ok(Some((sql, binds)))
    }
}

/// The condition text with its leading column quoted, when it has one.
fn quote_leading_column(dialect: Dialect, criteria: &Criteria) -> String {
    let cond = criteria.cond();
    match criteria.column() {
        Some(column) => match cond.strip_prefix(column) {
            Some(rest) => format!("{}{}", dialect.quote_identifier(column), rest),
            None => cond.to_string(),
        },
        None => cond.to_string(),
    }
}

/// `base`, or the first `base_N` (N >= 1) for which `taken` is false.
fn fresh_base(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    (1..)
        .map(|n| format!("{}_{}", base, n))
        .find(|candidate| !taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Replace every `:name` placeholder that is not a prefix of a longer name.
fn replace_placeholder(cond: &str, name: &str, replacement: &str) -> Result<String> {
    let pattern = Regex::new(&format!(r":{}\b", regex::escape(name))).map_err(|e| {
        Error::Query(QueryError {
            kind: QueryErrorKind::Bind,
            sql: Some(cond.to_string()),
            message: format!("invalid bind name '{}': {}", name, e),
            code: None,
            source: None,
        })
    })?;
    Ok(pattern.replace_all(cond, NoExpand(replacement)).into_owned())
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

/// ORDER BY clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    column: String,
    direction: OrderDirection,
}

impl OrderBy {
    /// Create an ascending order by clause.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: OrderDirection::Asc,
        }
    }

    /// Create a descending order by clause.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: OrderDirection::Desc,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn direction(&self) -> OrderDirection {
        self.direction
    }

    /// Generate SQL for this ORDER BY term.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        let direction = match self.direction {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        };
        format!("{} {}", dialect.quote_identifier(&self.column), direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlorm_core::Operator;

    fn eq(column: &str, value: impl Into<Value>) -> Criteria {
        Criteria::compare(column, Operator::Eq, value.into())
    }

    #[test]
    fn test_empty_clause_renders_nothing() {
        let clause = WhereClause::new();
        assert!(clause.render(Dialect::Sqlite, &BindMap::new()).unwrap().is_none());
        assert!(clause.binds(&BindMap::new()).is_empty());
    }

    #[test]
    fn test_and_or_fold() {
        let mut clause = WhereClause::new();
        clause.push(eq("id", 1_i64));
        clause.push(eq("title", "a").or());
        clause.push(eq("views", 3_i64));

        let (sql, binds) = clause.render(Dialect::Sqlite, &BindMap::new()).unwrap().unwrap();
        assert_eq!(sql, "\"id\" = :id OR \"title\" = :title AND \"views\" = :views");
        assert_eq!(binds.len(), 3);
    }

    #[test]
    fn test_first_criteria_flag_is_ignored() {
        let mut clause = WhereClause::new();
        clause.push(eq("id", 1_i64).or());
        let (sql, _) = clause.render(Dialect::Sqlite, &BindMap::new()).unwrap().unwrap();
        assert_eq!(sql, "\"id\" = :id");
    }

    #[test]
    fn test_in_expansion() {
        let mut clause = WhereClause::new();
        clause.push(Criteria::compare(
            "id",
            Operator::In,
            Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
        ));
        let (sql, binds) = clause.render(Dialect::Sqlite, &BindMap::new()).unwrap().unwrap();
        assert_eq!(sql, "\"id\" IN (:id_0, :id_1, :id_2)");
        assert_eq!(
            binds.keys().map(String::as_str).collect::<Vec<_>>(),
            ["id_0", "id_1", "id_2"]
        );
        assert_eq!(binds.get("id_2"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_empty_list_renders_null() {
        let mut clause = WhereClause::new();
        clause.push(Criteria::compare("id", Operator::NotIn, Value::Array(vec![])));
        let (sql, binds) = clause.render(Dialect::Sqlite, &BindMap::new()).unwrap().unwrap();
        assert_eq!(sql, "\"id\" NOT IN (NULL)");
        assert!(binds.is_empty());
    }

    #[test]
    fn test_collisions_are_renamed() {
        let mut clause = WhereClause::new();
        clause.push(Criteria::compare("id", Operator::Gt, Value::Int(1)));
        clause.push(Criteria::compare("id", Operator::Lt, Value::Int(9)));

        let mut reserved = BindMap::new();
        reserved.insert("id".to_string(), Value::Int(5));

        let (sql, binds) = clause.render(Dialect::Sqlite, &reserved).unwrap().unwrap();
        assert_eq!(sql, "\"id\" > :id_1 AND \"id\" < :id_2");
        assert_eq!(binds.get("id_1"), Some(&Value::Int(1)));
        assert_eq!(binds.get("id_2"), Some(&Value::Int(9)));
        assert_eq!(clause.binds(&reserved), binds);
    }

    #[test]
    fn test_rename_keeps_longer_names() {
        let mut binds = BindMap::new();
        binds.insert("id".to_string(), Value::Int(1));
        binds.insert("id_parent".to_string(), Value::Int(2));
        let mut clause = WhereClause::new();
        clause.push(Criteria::new("id = :id OR id_parent = :id_parent", binds));

        let mut reserved = BindMap::new();
        reserved.insert("id".to_string(), Value::Null);
        let (sql, _) = clause.render(Dialect::Sqlite, &reserved).unwrap().unwrap();
        assert_eq!(sql, "id = :id_1 OR id_parent = :id_parent");
    }

    #[test]
    fn test_raw_criteria_passes_through() {
        let mut clause = WhereClause::new();
        clause.push(Criteria::raw("deleted_at IS NULL"));
        let (sql, binds) = clause.render(Dialect::Sqlite, &BindMap::new()).unwrap().unwrap();
        assert_eq!(sql, "deleted_at IS NULL");
        assert!(binds.is_empty());
    }

    #[test]
    fn test_reserved_word_column_is_quoted() {
        let mut clause = WhereClause::new();
        clause.push(eq("order", 2_i64));
        clause.push(Criteria::compare("group", Operator::IsNull, Value::Null));

        let (sql, binds) = clause.render(Dialect::Sqlite, &BindMap::new()).unwrap().unwrap();
        assert_eq!(sql, "\"order\" = :order AND \"group\" IS NULL");
        assert_eq!(binds.get("order"), Some(&Value::Int(2)));

        let (sql, _) = clause.render(Dialect::Mysql, &BindMap::new()).unwrap().unwrap();
        assert_eq!(sql, "`order` = :order AND `group` IS NULL");
    }

    #[test]
    fn test_order_by() {
        assert_eq!(OrderBy::asc("title").to_sql(Dialect::Sqlite), "\"title\" ASC");
        assert_eq!(OrderBy::desc("id").to_sql(Dialect::Mysql), "`id` DESC");
    }
}
