//! Store-neutral row, filter and assignment types
//!
//! Every table the anonymizer touches holds either integer keys or text, so
//! [`SqlValue`] is deliberately narrow. Filters are conjunctions of simple
//! column predicates that every store adapter can express.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single cell value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    /// SQL `NULL`
    Null,
    /// Integer column (ids, flags, version parts)
    Integer(i64),
    /// Text column
    Text(String),
}

impl SqlValue {
    /// Returns the integer payload, if any
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Whether the value is `NULL`
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Integer(v) => write!(f, "{v}"),
            SqlValue::Text(v) => write!(f, "'{v}'"),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Integer(i64::from(v))
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

/// A row keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row(BTreeMap<String, SqlValue>);

impl Row {
    /// Creates an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column setter
    pub fn with(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.0.insert(column.to_string(), value.into());
        self
    }

    /// Sets a column value
    pub fn set(&mut self, column: &str, value: SqlValue) {
        self.0.insert(column.to_string(), value);
    }

    /// Raw column value; missing columns read as `NULL`
    pub fn get(&self, column: &str) -> &SqlValue {
        static NULL: SqlValue = SqlValue::Null;
        self.0.get(column).unwrap_or(&NULL)
    }

    /// Integer column value
    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).as_i64()
    }

    /// Text column value
    pub fn get_str(&self, column: &str) -> Option<&str> {
        self.get(column).as_str()
    }

    /// Projects the row onto the given columns
    pub fn project(&self, columns: &[&str]) -> Row {
        Row(columns
            .iter()
            .map(|c| (c.to_string(), self.get(c).clone()))
            .collect())
    }
}

impl FromIterator<(String, SqlValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, SqlValue)>>(iter: I) -> Self {
        Row(iter.into_iter().collect())
    }
}

/// A single column predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `column = value`
    Eq(String, SqlValue),
    /// `column <> value`
    NotEq(String, SqlValue),
    /// `column IN (values)`
    In(String, Vec<SqlValue>),
    /// `column IS NULL`
    IsNull(String),
}

impl Condition {
    /// Column the predicate applies to
    pub fn column(&self) -> &str {
        match self {
            Condition::Eq(c, _)
            | Condition::NotEq(c, _)
            | Condition::In(c, _)
            | Condition::IsNull(c) => c,
        }
    }

    /// Evaluates the predicate with SQL semantics: `NULL` never matches
    /// `=` or `<>`, and an empty `IN` list matches nothing.
    pub fn matches(&self, row: &Row) -> bool {
        let actual = row.get(self.column());
        match self {
            Condition::IsNull(_) => actual.is_null(),
            _ if actual.is_null() => false,
            Condition::Eq(_, v) => !v.is_null() && actual == v,
            Condition::NotEq(_, v) => !v.is_null() && actual != v,
            Condition::In(_, values) => values.iter().any(|v| !v.is_null() && actual == v),
        }
    }
}

/// Conjunction of column predicates
///
/// # Examples
///
/// ```
/// use pkp_anonymizer::domain::values::{Filter, Row};
///
/// let filter = Filter::new()
///     .eq("user_id", 7)
///     .is_in("setting_name", ["givenName", "familyName"]);
///
/// let row = Row::new().with("user_id", 7).with("setting_name", "givenName");
/// assert!(filter.matches(&row));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Filter matching every row
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `column = value`
    pub fn eq(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions
            .push(Condition::Eq(column.to_string(), value.into()));
        self
    }

    /// Adds `column <> value`
    pub fn not_eq(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.conditions
            .push(Condition::NotEq(column.to_string(), value.into()));
        self
    }

    /// Adds `column IN (values)`
    pub fn is_in<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        self.conditions.push(Condition::In(
            column.to_string(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Adds `column IS NULL`
    pub fn is_null(mut self, column: &str) -> Self {
        self.conditions.push(Condition::IsNull(column.to_string()));
        self
    }

    /// Adds `column = value`, or `column IS NULL` when `value` is `NULL`
    pub fn eq_or_null(self, column: &str, value: impl Into<SqlValue>) -> Self {
        match value.into() {
            SqlValue::Null => self.is_null(column),
            value => self.eq(column, value),
        }
    }

    /// The predicates of this filter
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Whether the filter has no predicates
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Whether every predicate matches the row
    pub fn matches(&self, row: &Row) -> bool {
        self.conditions.iter().all(|c| c.matches(row))
    }
}

/// `column = value` in an update's `SET` list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub column: String,
    pub value: SqlValue,
}

impl Assignment {
    pub fn new(column: &str, value: impl Into<SqlValue>) -> Self {
        Self {
            column: column.to_string(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_missing_column_is_null() {
        let row = Row::new().with("user_id", 1);
        assert!(row.get("email").is_null());
        assert_eq!(row.get_i64("user_id"), Some(1));
        assert_eq!(row.get_str("user_id"), None);
    }

    #[test]
    fn test_null_never_matches() {
        let row = Row::new().with("locale", SqlValue::Null);
        assert!(!Filter::new().eq("locale", "fr_FR").matches(&row));
        assert!(!Filter::new().not_eq("locale", "").matches(&row));
        assert!(!Filter::new().eq("locale", SqlValue::Null).matches(&row));
        assert!(Filter::new().is_null("locale").matches(&row));
        assert!(Filter::new().eq_or_null("locale", SqlValue::Null).matches(&row));
    }

    #[test]
    fn test_empty_in_matches_nothing() {
        let row = Row::new().with("plugin_name", "doajplugin");
        let empty: Vec<SqlValue> = Vec::new();
        assert!(!Filter::new().is_in("plugin_name", empty).matches(&row));
    }

    #[test]
    fn test_filter_conjunction() {
        let row = Row::new()
            .with("plugin_name", "crossrefplugin")
            .with("setting_name", "password");
        let filter = Filter::new()
            .is_in("plugin_name", ["crossrefexportplugin", "crossrefplugin"])
            .not_eq("setting_name", "testMode");
        assert!(filter.matches(&row));
        assert!(!filter.clone().eq("context_id", 1).matches(&row));
    }

    #[test]
    fn test_projection_keeps_requested_columns() {
        let row = Row::new().with("a", 1).with("b", "x").with("c", 3);
        let projected = row.project(&["a", "c", "d"]);
        assert_eq!(projected.get_i64("a"), Some(1));
        assert!(projected.get("b").is_null());
        assert!(projected.get("d").is_null());
    }

    #[test]
    fn test_option_into_sql_value() {
        let none: Option<&str> = None;
        assert_eq!(SqlValue::from(none), SqlValue::Null);
        assert_eq!(SqlValue::from(Some("x")), SqlValue::Text("x".into()));
    }
}
