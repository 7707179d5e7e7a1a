//! PostgreSQL store
//!
//! This module provides the PostgreSQL implementation of the tabular store,
//! built on a `deadpool-postgres` connection pool.

pub mod adapter;
pub mod client;

pub use adapter::PostgresStore;
pub use client::PostgresClient;
