//! Keyset pagination over large tables

use crate::adapters::database::traits::TabularStore;
use crate::domain::values::{Filter, Row};
use crate::domain::{Result, StoreError};

/// Reads a table in ascending key order, one bounded page at a time
///
/// Each page is requested as `key > last_seen ORDER BY key LIMIT batch`, so
/// rewriting non-key columns between pages never shifts the window.
pub struct KeysetPager<'a> {
    store: &'a dyn TabularStore,
    table: &'static str,
    key: &'static str,
    batch_size: usize,
    filter: Filter,
    last: Option<i64>,
    done: bool,
}

impl<'a> KeysetPager<'a> {
    pub fn new(
        store: &'a dyn TabularStore,
        table: &'static str,
        key: &'static str,
        batch_size: usize,
        filter: Filter,
    ) -> Self {
        Self {
            store,
            table,
            key,
            batch_size: batch_size.max(1),
            filter,
            last: None,
            done: false,
        }
    }

    /// Next page, `None` once the table is exhausted
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or a row has no integer key.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Row>>> {
        if self.done {
            return Ok(None);
        }

        let page = self
            .store
            .select_chunk(self.table, self.key, self.last, self.batch_size, &self.filter)
            .await?;

        if page.len() < self.batch_size {
            self.done = true;
        }
        let Some(last) = page.last() else {
            return Ok(None);
        };

        self.last = Some(row_key(last, self.key)?);
        crate::log_batch_processing!(self.table, page.len(), self.last);
        Ok(Some(page))
    }
}

/// Integer primary key of `row`
///
/// # Errors
///
/// Returns [`StoreError::InvalidRequest`] when the column is missing or not
/// an integer.
pub fn row_key(row: &Row, key: &str) -> Result<i64> {
    row.get_i64(key).ok_or_else(|| {
        StoreError::InvalidRequest(format!("row has no integer key column {key}")).into()
    })
}
