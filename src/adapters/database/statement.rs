//! SQL rendering shared by the relational stores
//!
//! Statements are rendered from [`Filter`]s and [`Assignment`]s. Table and
//! column names are validated and quoted for the [`Dialect`], values are always
//! bound as parameters. A `NULL` value renders as the literal and binds
//! nothing.

use crate::domain::values::{Assignment, Condition, Filter, SqlValue};
use crate::domain::{Result, StoreError};

/// SQL dialect of a relational store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `"name"` identifiers, `$n::TYPE` placeholders
    Postgres,
    /// `` `name` `` identifiers, `?` placeholders
    MySql,
}

impl Dialect {
    /// Validates and quotes a table or column name
    pub fn quote(self, name: &str) -> Result<String> {
        let valid = !name.is_empty()
            && !name.starts_with(|c: char| c.is_ascii_digit())
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(StoreError::InvalidRequest(format!("Invalid identifier: {name:?}")).into());
        }
        Ok(match self {
            Dialect::Postgres => format!("\"{name}\""),
            Dialect::MySql => format!("`{name}`"),
        })
    }

    /// Placeholder for the `index`-th (1-based) parameter
    fn placeholder(self, index: usize, param: &Param) -> String {
        match self {
            Dialect::Postgres => {
                let cast = match param {
                    Param::Integer(_) => "BIGINT",
                    Param::Text(_) => "TEXT",
                };
                format!("${index}::{cast}")
            }
            Dialect::MySql => "?".to_string(),
        }
    }
}

/// Bound statement parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Integer(i64),
    Text(String),
}

/// Rendered statement with its parameters in placeholder order
#[derive(Debug)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Param>,
    dialect: Dialect,
}

impl Statement {
    fn new(dialect: Dialect, sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            dialect,
        }
    }

    fn quote(&self, name: &str) -> Result<String> {
        self.dialect.quote(name)
    }

    /// Placeholder for `value`, `NULL` binds nothing
    fn bind(&mut self, value: &SqlValue) -> String {
        let param = match value {
            SqlValue::Null => return "NULL".to_string(),
            SqlValue::Integer(v) => Param::Integer(*v),
            SqlValue::Text(v) => Param::Text(v.clone()),
        };
        let placeholder = self.dialect.placeholder(self.params.len() + 1, &param);
        self.params.push(param);
        placeholder
    }

    fn predicate(&mut self, condition: &Condition) -> Result<String> {
        let column = self.quote(condition.column())?;
        Ok(match condition {
            Condition::Eq(_, value) => format!("{column} = {}", self.bind(value)),
            Condition::NotEq(_, value) => format!("{column} <> {}", self.bind(value)),
            Condition::IsNull(_) => format!("{column} IS NULL"),
            Condition::In(_, values) => {
                let placeholders: Vec<String> = values
                    .iter()
                    .filter(|v| !v.is_null())
                    .map(|v| self.bind(v))
                    .collect();
                if placeholders.is_empty() {
                    "FALSE".to_string()
                } else {
                    format!("{column} IN ({})", placeholders.join(", "))
                }
            }
        })
    }

    /// Appends ` WHERE ...` for `filter` plus any leading predicates
    fn push_where(&mut self, mut predicates: Vec<String>, filter: &Filter) -> Result<()> {
        for condition in filter.conditions() {
            predicates.push(self.predicate(condition)?);
        }
        if !predicates.is_empty() {
            self.sql.push_str(" WHERE ");
            self.sql.push_str(&predicates.join(" AND "));
        }
        Ok(())
    }
}

pub fn select_statement(
    dialect: Dialect,
    table: &str,
    columns: &[&str],
    filter: &Filter,
) -> Result<Statement> {
    let columns = columns
        .iter()
        .map(|c| dialect.quote(c))
        .collect::<Result<Vec<_>>>()?;
    let mut statement = Statement::new(
        dialect,
        format!("SELECT {} FROM {}", columns.join(", "), dialect.quote(table)?),
    );
    statement.push_where(Vec::new(), filter)?;
    Ok(statement)
}

pub fn distinct_statement(
    dialect: Dialect,
    table: &str,
    column: &str,
    filter: &Filter,
) -> Result<Statement> {
    let quoted = dialect.quote(column)?;
    let mut statement = Statement::new(
        dialect,
        format!("SELECT DISTINCT {quoted} FROM {}", dialect.quote(table)?),
    );
    statement.push_where(vec![format!("{quoted} IS NOT NULL")], filter)?;
    statement.sql.push_str(&format!(" ORDER BY {quoted}"));
    Ok(statement)
}

/// Keyset page: rows with `key_column > after`, ascending, at most `limit`
pub fn chunk_statement(
    dialect: Dialect,
    table: &str,
    key_column: &str,
    after: Option<i64>,
    limit: usize,
    filter: &Filter,
) -> Result<Statement> {
    let key = dialect.quote(key_column)?;
    let mut statement = Statement::new(dialect, format!("SELECT * FROM {}", dialect.quote(table)?));
    let mut leading = Vec::new();
    if let Some(after) = after {
        leading.push(format!("{key} > {}", statement.bind(&SqlValue::Integer(after))));
    }
    statement.push_where(leading, filter)?;
    statement
        .sql
        .push_str(&format!(" ORDER BY {key} LIMIT {limit}"));
    Ok(statement)
}

pub fn update_statement(
    dialect: Dialect,
    table: &str,
    filter: &Filter,
    assignments: &[Assignment],
) -> Result<Statement> {
    if assignments.is_empty() {
        return Err(StoreError::InvalidRequest(format!("Empty update of {table}")).into());
    }
    let mut statement = Statement::new(dialect, format!("UPDATE {} SET ", dialect.quote(table)?));
    let mut sets = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        let column = dialect.quote(&assignment.column)?;
        sets.push(format!("{column} = {}", statement.bind(&assignment.value)));
    }
    statement.sql.push_str(&sets.join(", "));
    statement.push_where(Vec::new(), filter)?;
    Ok(statement)
}

pub fn delete_statement(dialect: Dialect, table: &str, filter: &Filter) -> Result<Statement> {
    let mut statement = Statement::new(dialect, format!("DELETE FROM {}", dialect.quote(table)?));
    statement.push_where(Vec::new(), filter)?;
    Ok(statement)
}
