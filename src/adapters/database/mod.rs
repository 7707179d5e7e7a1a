//! Store abstraction layer
//!
//! This module provides a trait-based abstraction over the relational store
//! being scrubbed, so the engine runs unchanged against PostgreSQL, MySQL or
//! the in-memory store.

pub mod factory;
pub mod statement;
pub mod traits;

pub use factory::create_store;
pub use traits::TabularStore;
