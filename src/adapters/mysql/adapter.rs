//! MySQL adapter implementing the tabular store trait
//!
//! Statements come from the shared renderer with backtick-quoted identifiers
//! and `?` placeholders.

use crate::adapters::database::statement::{
    chunk_statement, delete_statement, distinct_statement, select_statement, update_statement,
    Dialect,
};
use crate::adapters::database::traits::TabularStore;
use crate::adapters::mysql::client::MySqlClient;
use crate::domain::values::{Assignment, Filter, Row, SqlValue};
use crate::domain::Result;
use async_trait::async_trait;
use sqlx::mysql::MySqlRow;
use sqlx::{Column, Row as _};
use std::sync::Arc;

const DIALECT: Dialect = Dialect::MySql;

/// MySQL implementation of [`TabularStore`]
pub struct MySqlStore {
    client: Arc<MySqlClient>,
}

impl MySqlStore {
    /// Create a new MySQL store
    pub fn new(client: MySqlClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<MySqlClient> {
        &self.client
    }
}

/// Reads one cell; values that are neither integers nor text read as `NULL`
fn read_value(row: &MySqlRow, idx: usize) -> SqlValue {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.into();
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.into();
    }
    if let Ok(v) = row.try_get::<Option<u64>, _>(idx) {
        return v.and_then(|n| i64::try_from(n).ok()).into();
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
        return v.map(i64::from).into();
    }
    // Binary collations hand text back as bytes
    if let Ok(v) = row.try_get::<Option<Vec<u8>>, _>(idx) {
        return v.and_then(|bytes| String::from_utf8(bytes).ok()).into();
    }

    tracing::trace!(column = idx, "Unreadable column value");
    SqlValue::Null
}

fn convert_row(row: &MySqlRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, column)| (column.name().to_string(), read_value(row, idx)))
        .collect()
}

#[async_trait]
impl TabularStore for MySqlStore {
    async fn select(&self, table: &str, columns: &[&str], filter: &Filter) -> Result<Vec<Row>> {
        let statement = select_statement(DIALECT, table, columns, filter)?;
        let rows = self.client.query(table, &statement).await?;
        Ok(rows.iter().map(convert_row).collect())
    }

    async fn select_distinct(&self, table: &str, column: &str, filter: &Filter) -> Result<Vec<Row>> {
        let statement = distinct_statement(DIALECT, table, column, filter)?;
        let rows = self.client.query(table, &statement).await?;
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
        let rows = self.client.query(table, &statement).await?;
        Ok(rows.iter().map(convert_row).collect())
    }

    async fn update(&self, table: &str, filter: &Filter, assignments: &[Assignment]) -> Result<u64> {
        let statement = update_statement(DIALECT, table, filter, assignments)?;
        self.client.execute(table, &statement).await
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<u64> {
        let statement = delete_statement(DIALECT, table, filter)?;
        self.client.execute(table, &statement).await
    }

    fn backend_name(&self) -> &str {
        "mysql"
    }
}
