//! MySQL store
//!
//! This module provides the MySQL implementation of the tabular store, built
//! on a `sqlx` connection pool. MySQL is the most common PKP deployment.

pub mod adapter;
pub mod client;

pub use adapter::MySqlStore;
pub use client::MySqlClient;
