//! Store factory
//!
//! This module provides the factory function that creates the tabular store
//! from configuration.

use crate::adapters::database::traits::TabularStore;
use crate::adapters::mysql::{MySqlClient, MySqlStore};
use crate::adapters::postgresql::{PostgresClient, PostgresStore};
use crate::config::{DatabaseConfig, StoreBackend};
use crate::domain::{AnonymizerError, Result};
use std::sync::Arc;

/// Create the tabular store described by the configuration
///
/// The backend follows the connection string scheme. The connection is
/// tested before the store is returned, so a bad host or credential fails
/// here rather than halfway through a scrub.
///
/// # Arguments
///
/// * `config` - Database configuration
///
/// # Returns
///
/// Returns an Arc-wrapped trait object that implements [`TabularStore`]
///
/// # Errors
///
/// Returns an error if the scheme is unknown, the pool cannot be created or
/// the connection test fails
pub async fn create_store(config: &DatabaseConfig) -> Result<Arc<dyn TabularStore>> {
    let backend = config.backend().ok_or_else(|| {
        AnonymizerError::Configuration(
            "database.connection_string must start with postgresql://, postgres:// or mysql://"
                .to_string(),
        )
    })?;

    match backend {
        StoreBackend::PostgreSql => {
            let client = PostgresClient::new(config)?;
            tracing::info!(
                backend = backend.name(),
                connection = %client.connection_string_safe(),
                max_connections = config.max_connections,
                "Creating store"
            );
            client.test_connection().await?;
            Ok(Arc::new(PostgresStore::new(client)) as Arc<dyn TabularStore>)
        }
        StoreBackend::MySql => {
            let client = MySqlClient::new(config)?;
            tracing::info!(
                backend = backend.name(),
                connection = %client.connection_string_safe(),
                max_connections = config.max_connections,
                "Creating store"
            );
            client.test_connection().await?;
            Ok(Arc::new(MySqlStore::new(client)) as Arc<dyn TabularStore>)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    #[tokio::test]
    async fn test_unknown_scheme_is_a_configuration_error() {
        let config = DatabaseConfig {
            connection_string: secret_string("sqlite:///tmp/ojs.db".to_string()),
            max_connections: 1,
            connection_timeout_seconds: 1,
            statement_timeout_seconds: 1,
        };

        let Err(err) = create_store(&config).await else {
            panic!("sqlite has no store");
        };
        assert!(matches!(err, AnonymizerError::Configuration(_)));
    }
}
