//! PostgreSQL adapter implementing the tabular store trait
//!
//! Statements come from the shared renderer with double-quoted identifiers
//! and `$n` placeholders carrying an explicit `BIGINT` or `TEXT` cast.

use crate::adapters::database::statement::{
    chunk_statement, delete_statement, distinct_statement, select_statement, update_statement,
    Dialect, Param, Statement,
};
use crate::adapters::database::traits::TabularStore;
use crate::adapters::postgresql::client::PostgresClient;
use crate::domain::values::{Assignment, Filter, Row, SqlValue};
use crate::domain::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_postgres::types::{ToSql, Type};

/// PostgreSQL implementation of [`TabularStore`]
pub struct PostgresStore {
    client: Arc<PostgresClient>,
}

impl PostgresStore {
    /// Create a new PostgreSQL store
    pub fn new(client: PostgresClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgresClient> {
        &self.client
    }
}

const DIALECT: Dialect = Dialect::Postgres;

fn params(statement: &Statement) -> Vec<&(dyn ToSql + Sync)> {
    statement
        .params
        .iter()
        .map(|param| match param {
            Param::Integer(v) => v as &(dyn ToSql + Sync),
            Param::Text(v) => v as &(dyn ToSql + Sync),
        })
        .collect()
}

/// Reads one cell; column types outside integers, booleans and text read as `NULL`
fn read_value(row: &tokio_postgres::Row, idx: usize, ty: &Type) -> SqlValue {
    let value: std::result::Result<SqlValue, tokio_postgres::Error> = if *ty == Type::INT2 {
        row.try_get::<_, Option<i16>>(idx)
            .map(|v| v.map(i64::from).into())
    } else if *ty == Type::INT4 {
        row.try_get::<_, Option<i32>>(idx)
            .map(|v| v.map(i64::from).into())
    } else if *ty == Type::INT8 {
        row.try_get::<_, Option<i64>>(idx).map(SqlValue::from)
    } else if *ty == Type::BOOL {
        row.try_get::<_, Option<bool>>(idx)
            .map(|v| v.map(i64::from).into())
    } else if [Type::TEXT, Type::VARCHAR, Type::BPCHAR, Type::NAME].contains(ty) {
        row.try_get::<_, Option<String>>(idx).map(SqlValue::from)
    } else {
        return SqlValue::Null;
    };

    value.unwrap_or_else(|e| {
        tracing::trace!(column = idx, error = %e, "Unreadable column value");
        SqlValue::Null
    })
}

fn convert_row(row: &tokio_postgres::Row) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| (column.name().to_string(), read_value(row, idx, column.type_())))
        .collect()
}

#[async_trait]
impl TabularStore for PostgresStore {
    async fn select(&self, table: &str, columns: &[&str], filter: &Filter) -> Result<Vec<Row>> {
        let statement = select_statement(DIALECT, table, columns, filter)?;
        let rows = self
            .client
            .query(table, &statement.sql, &params(&statement))
            .await?;
        Ok(rows.iter().map(convert_row).collect())
    }

    async fn select_distinct(&self, table: &str, column: &str, filter: &Filter) -> Result<Vec<Row>> {
        let statement = distinct_statement(DIALECT, table, column, filter)?;
        let rows = self
            .client
            .query(table, &statement.sql, &params(&statement))
            .await?;
        Ok(rows.iter().map(convert_row).collect())
    }

    async fn select_chunk(
        &self,
        table: &str,
        key_column: &str,
        after: Option<i64>,
        limit: usize,
        filter: &Filter,
    ) -> Result<Vec<Row>> {
        let statement = chunk_statement(DIALECT, table, key_column, after, limit, filter)?;
        let rows = self
            .client
            .query(table, &statement.sql, &params(&statement))
            .await?;
        Ok(rows.iter().map(convert_row).collect())
    }

    async fn update(&self, table: &str, filter: &Filter, assignments: &[Assignment]) -> Result<u64> {
        let statement = update_statement(DIALECT, table, filter, assignments)?;
        self.client
            .execute(table, &statement.sql, &params(&statement))
            .await
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<u64> {
        let statement = delete_statement(DIALECT, table, filter)?;
        self.client
            .execute(table, &statement.sql, &params(&statement))
            .await
    }

    fn backend_name(&self) -> &str {
        "postgresql"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_follow_placeholder_order() {
        let statement = update_statement(
            DIALECT,
            "users",
            &Filter::new().eq("user_id", 3),
            &[Assignment::new("email", "a@example.com")],
        )
        .unwrap();

        assert_eq!(
            statement.sql,
            "UPDATE \"users\" SET \"email\" = $1::TEXT WHERE \"user_id\" = $2::BIGINT"
        );
        assert_eq!(params(&statement).len(), 2);
    }
}
