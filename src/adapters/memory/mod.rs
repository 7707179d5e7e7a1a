//! In-process tabular store
//!
//! [`MemoryStore`] keeps whole tables in memory and evaluates filters with SQL
//! semantics. Unique column constraints can be declared per table so that
//! uniqueness conflicts surface exactly as they would from a real database.
//! It backs the test suite and can be used to rehearse a scrub plan against a
//! hand-built fixture.

use crate::adapters::database::traits::TabularStore;
use crate::domain::values::{Assignment, Filter, Row, SqlValue};
use crate::domain::{Result, StoreError};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Table {
    rows: Vec<Row>,
    unique: Vec<String>,
}

/// Tabular store holding every table in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Table>>,
    mutations: AtomicU64,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style table creation with initial rows
    pub fn with_table(mut self, table: &str, rows: Vec<Row>) -> Self {
        self.tables.get_mut().entry(table.to_string()).or_default().rows.extend(rows);
        self
    }

    /// Builder-style unique constraint on `table.column`
    ///
    /// `NULL` values never conflict.
    pub fn with_unique(mut self, table: &str, column: &str) -> Self {
        self.tables
            .get_mut()
            .entry(table.to_string())
            .or_default()
            .unique
            .push(column.to_string());
        self
    }

    /// Appends a row, creating the table if needed
    pub async fn insert(&self, table: &str, row: Row) {
        self.tables
            .lock()
            .await
            .entry(table.to_string())
            .or_default()
            .rows
            .push(row);
    }

    /// Snapshot of every row of `table`, empty when the table is missing
    pub async fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .lock()
            .await
            .get(table)
            .map(|t| t.rows.clone())
            .unwrap_or_default()
    }

    /// Number of update and delete statements that changed at least one row
    pub fn mutations(&self) -> u64 {
        self.mutations.load(Ordering::SeqCst)
    }

    fn record_mutation(&self, affected: u64) {
        if affected > 0 {
            self.mutations.fetch_add(1, Ordering::SeqCst);
        }
    }
}

fn missing(table: &str) -> StoreError {
    StoreError::TableNotFound(table.to_string())
}

/// Rejects an update that would leave two rows sharing a unique value
fn check_unique(
    table_name: &str,
    table: &Table,
    matched: &[usize],
    assignments: &[Assignment],
) -> std::result::Result<(), StoreError> {
    let matched_set: HashSet<usize> = matched.iter().copied().collect();

    for assignment in assignments {
        if !table.unique.contains(&assignment.column) || assignment.value.is_null() {
            continue;
        }

        if matched.len() > 1 {
            return Err(StoreError::UniqueViolation {
                table: table_name.to_string(),
                message: format!(
                    "{} rows would share one value of unique column {}",
                    matched.len(),
                    assignment.column
                ),
            });
        }

        let taken = table.rows.iter().enumerate().any(|(idx, row)| {
            !matched_set.contains(&idx) && row.get(&assignment.column) == &assignment.value
        });
        if taken {
            return Err(StoreError::UniqueViolation {
                table: table_name.to_string(),
                message: format!("duplicate value for unique column {}", assignment.column),
            });
        }
    }

    Ok(())
}

#[async_trait]
impl TabularStore for MemoryStore {
    async fn select(&self, table: &str, columns: &[&str], filter: &Filter) -> Result<Vec<Row>> {
        let tables = self.tables.lock().await;
        let t = tables.get(table).ok_or_else(|| missing(table))?;

        Ok(t.rows
            .iter()
            .filter(|row| filter.matches(row))
            .map(|row| row.project(columns))
            .collect())
    }

    async fn select_distinct(&self, table: &str, column: &str, filter: &Filter) -> Result<Vec<Row>> {
        let tables = self.tables.lock().await;
        let t = tables.get(table).ok_or_else(|| missing(table))?;

        let values: BTreeSet<SqlValue> = t
            .rows
            .iter()
            .filter(|row| filter.matches(row))
            .map(|row| row.get(column).clone())
            .filter(|value| !value.is_null())
            .collect();

        Ok(values
            .into_iter()
            .map(|value| Row::new().with(column, value))
            .collect())
    }

    async fn select_chunk(
        &self,
        table: &str,
        key_column: &str,
        after: Option<i64>,
        limit: usize,
        filter: &Filter,
    ) -> Result<Vec<Row>> {
        let tables = self.tables.lock().await;
        let t = tables.get(table).ok_or_else(|| missing(table))?;

        let mut page: Vec<Row> = t
            .rows
            .iter()
            .filter(|row| filter.matches(row))
            .filter(|row| match (row.get_i64(key_column), after) {
                (Some(key), Some(last)) => key > last,
                (Some(_), None) => true,
                (None, _) => false,
            })
            .cloned()
            .collect();

        page.sort_by_key(|row| row.get_i64(key_column));
        page.truncate(limit);
        Ok(page)
    }

    async fn update(&self, table: &str, filter: &Filter, assignments: &[Assignment]) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        let t = tables.get_mut(table).ok_or_else(|| missing(table))?;

        let matched: Vec<usize> = t
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| filter.matches(row))
            .map(|(idx, _)| idx)
            .collect();

        check_unique(table, t, &matched, assignments)?;

        for idx in &matched {
            for assignment in assignments {
                t.rows[*idx].set(&assignment.column, assignment.value.clone());
            }
        }

        let affected = matched.len() as u64;
        self.record_mutation(affected);
        Ok(affected)
    }

    async fn delete(&self, table: &str, filter: &Filter) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        let t = tables.get_mut(table).ok_or_else(|| missing(table))?;

        let before = t.rows.len();
        t.rows.retain(|row| !filter.matches(row));

        let affected = (before - t.rows.len()) as u64;
        self.record_mutation(affected);
        Ok(affected)
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
