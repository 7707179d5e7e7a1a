//! MySQL client implementation
//!
//! This module provides the pooled `sqlx` client the [`MySqlStore`] runs its
//! statements through.
//!
//! [`MySqlStore`]: crate::adapters::mysql::MySqlStore

use crate::adapters::database::statement::{Param, Statement};
use crate::config::{redact_connection_string, DatabaseConfig};
use crate::domain::{AnonymizerError, Result, StoreError};
use secrecy::ExposeSecret;
use sqlx::mysql::{MySql, MySqlArguments, MySqlConnectOptions, MySqlDatabaseError, MySqlPoolOptions};
use sqlx::mysql::{MySqlPool, MySqlRow};
use sqlx::query::Query;
use sqlx::Executor;
use std::time::Duration;

/// `ER_DUP_ENTRY`
const ER_DUP_ENTRY: u16 = 1062;
/// `ER_DUP_ENTRY_WITH_KEY_NAME`
const ER_DUP_ENTRY_WITH_KEY_NAME: u16 = 1586;
/// `ER_NO_SUCH_TABLE`
const ER_NO_SUCH_TABLE: u16 = 1146;
const SQLSTATE_NO_SUCH_TABLE: &str = "42S02";

/// MySQL client for the anonymizer
///
/// Every pooled connection caps `SELECT` run time with the configured
/// statement timeout when it is opened.
pub struct MySqlClient {
    /// Connection pool
    pool: MySqlPool,

    /// Connection string with the credentials redacted
    safe_connection_string: String,
}

impl MySqlClient {
    /// Create a new MySQL client
    ///
    /// No connection is opened until the first statement.
    ///
    /// # Arguments
    ///
    /// * `config` - Database configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string cannot be parsed.
    pub fn new(config: &DatabaseConfig) -> Result<Self> {
        let connection_string = config.connection_string.expose_secret().as_ref();

        // Parse connection string
        let options: MySqlConnectOptions = connection_string.parse().map_err(|e| {
            AnonymizerError::Configuration(format!("Invalid MySQL connection string: {e}"))
        })?;

        let statement_timeout_ms = config.statement_timeout_seconds * 1000;
        let pool = MySqlPoolOptions::new()
            .max_connections(u32::try_from(config.max_connections).unwrap_or(u32::MAX))
            .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
            .test_before_acquire(true)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    // Set statement timeout
                    conn.execute(
                        format!("SET SESSION max_execution_time = {statement_timeout_ms}").as_str(),
                    )
                    .await?;
                    Ok(())
                })
            })
            .connect_lazy_with(options);

        Ok(Self {
            pool,
            safe_connection_string: redact_connection_string(connection_string),
        })
    }

    /// Test the connection to MySQL
    ///
    /// Attempts to get a connection from the pool and execute a simple query.
    pub async fn test_connection(&self) -> Result<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::ConnectionFailed(format!("Connection test failed: {e}")))?;

        tracing::info!(
            connection = %self.safe_connection_string,
            "MySQL connection test successful"
        );
        Ok(())
    }

    /// Execute a query and return rows
    ///
    /// # Arguments
    ///
    /// * `table` - Table the query reads, used to classify errors
    /// * `statement` - Rendered statement with its parameters
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn query(&self, table: &str, statement: &Statement) -> Result<Vec<MySqlRow>> {
        bind(statement)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| classify(table, e, StoreError::QueryFailed).into())
    }

    /// Execute a statement and return the number of affected rows
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UniqueViolation`] on a duplicate key.
    pub async fn execute(&self, table: &str, statement: &Statement) -> Result<u64> {
        bind(statement)
            .execute(&self.pool)
            .await
            .map(|done| done.rows_affected())
            .map_err(|e| classify(table, e, StoreError::StatementFailed).into())
    }

    /// Get the connection string (without password)
    pub fn connection_string_safe(&self) -> &str {
        &self.safe_connection_string
    }

    /// Number of open connections
    pub fn pool_size(&self) -> u32 {
        self.pool.size()
    }
}

fn bind(statement: &Statement) -> Query<'_, MySql, MySqlArguments> {
    statement
        .params
        .iter()
        .fold(sqlx::query(&statement.sql), |query, param| match param {
            Param::Integer(v) => query.bind(*v),
            Param::Text(v) => query.bind(v.as_str()),
        })
}

/// Maps a driver error onto the store error taxonomy
fn classify(table: &str, error: sqlx::Error, otherwise: fn(String) -> StoreError) -> StoreError {
    if let sqlx::Error::Database(db_error) = &error {
        let number = db_error
            .try_downcast_ref::<MySqlDatabaseError>()
            .map(MySqlDatabaseError::number);
        if let Some(classified) =
            classify_code(table, number, db_error.code().as_deref(), db_error.message())
        {
            return classified;
        }
    }
    otherwise(format!("{table}: {error}"))
}

/// SQLSTATE 23000 also covers NOT NULL and foreign key failures, so only
/// the duplicate-key error numbers count as uniqueness conflicts
fn classify_code(
    table: &str,
    number: Option<u16>,
    sqlstate: Option<&str>,
    message: &str,
) -> Option<StoreError> {
    match (number, sqlstate) {
        (Some(ER_DUP_ENTRY | ER_DUP_ENTRY_WITH_KEY_NAME), _) => Some(StoreError::UniqueViolation {
            table: table.to_string(),
            message: message.to_string(),
        }),
        (Some(ER_NO_SUCH_TABLE), _) | (_, Some(SQLSTATE_NO_SUCH_TABLE)) => {
            Some(StoreError::TableNotFound(table.to_string()))
        }
        _ => None,
    }
}
