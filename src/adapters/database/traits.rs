//! Tabular store abstraction
//!
//! This module defines the trait that store adapters must implement to be
//! scrubbed by the anonymizer. The engine only needs filtered reads, keyset
//! pagination, filtered updates and filtered deletes.

use crate::domain::values::{Assignment, Filter, Row};
use crate::domain::Result;
use async_trait::async_trait;

/// Relational store the anonymizer reads from and writes to
///
/// Adapters classify uniqueness conflicts as
/// [`StoreError::UniqueViolation`](crate::domain::StoreError::UniqueViolation);
/// every other failure maps to one of the remaining store error variants.
#[async_trait]
pub trait TabularStore: Send + Sync {
    /// Select the given columns of every row matching `filter`
    ///
    /// # Arguments
    ///
    /// * `table` - Table to read
    /// * `columns` - Columns to project
    /// * `filter` - Row predicate
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn select(&self, table: &str, columns: &[&str], filter: &Filter) -> Result<Vec<Row>>;

    /// Select the distinct non-null values of one column
    ///
    /// Values are returned in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn select_distinct(&self, table: &str, column: &str, filter: &Filter) -> Result<Vec<Row>>;

    /// Read one keyset page
    ///
    /// Returns at most `limit` rows matching `filter` whose `key_column` is
    /// greater than `after`, in ascending key order. Every column of the
    /// table is returned.
    ///
    /// # Arguments
    ///
    /// * `table` - Table to read
    /// * `key_column` - Integer primary key used for ordering
    /// * `after` - Last key seen on the previous page, `None` for the first page
    /// * `limit` - Maximum page size
    /// * `filter` - Additional row predicate
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn select_chunk(
        &self,
        table: &str,
        key_column: &str,
        after: Option<i64>,
        limit: usize,
        filter: &Filter,
    ) -> Result<Vec<Row>>;

    /// Apply `assignments` to every row matching `filter`
    ///
    /// # Returns
    ///
    /// Returns the number of rows updated.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UniqueViolation`](crate::domain::StoreError::UniqueViolation)
    /// if the update conflicts with a uniqueness constraint.
    async fn update(&self, table: &str, filter: &Filter, assignments: &[Assignment]) -> Result<u64>;

    /// Delete every row matching `filter`
    ///
    /// # Returns
    ///
    /// Returns the number of rows deleted.
    async fn delete(&self, table: &str, filter: &Filter) -> Result<u64>;

    /// Short backend name used in logs
    fn backend_name(&self) -> &str;
}
