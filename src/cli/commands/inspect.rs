//! Inspect command implementation
//!
//! This module implements the `inspect` command, which reports what the
//! anonymizer detects in a database without writing to it.

use crate::adapters::database::create_store;
use crate::anonymization::integrations::catalog;
use crate::anonymization::{Operation, SchemaInspector};
use crate::cli::commands::{setup_exit_code, EXIT_CONFIG, EXIT_OK};
use crate::config::load_config;
use crate::domain::SchemaVersion;
use clap::Args;

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {}

impl InspectArgs {
    /// Execute the inspect command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Inspecting database");

        println!("🔍 Inspecting database");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let store = match create_store(&config.database).await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to connect to database");
                println!("   Error: {e}");
                return Ok(setup_exit_code(&e));
            }
        };

        let schema = match SchemaInspector::inspect(store.as_ref()).await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Schema not supported");
                println!("   Error: {e}");
                return Ok(setup_exit_code(&e));
            }
        };

        println!("  Product: {}", schema.product());
        println!("  Schema Version: {}", schema.version());
        println!(
            "  Context Settings: {} ({})",
            schema.context_settings_table(),
            schema.context_id_column()
        );
        println!();
        println!("Integrations:");
        for (operation, supported) in integration_support(schema.version()) {
            let marker = if supported { "✅" } else { "⚠️ " };
            let note = if supported { "known layout" } else { "no known layout" };
            println!("  {marker} {operation}: {note}");
        }
        println!();

        Ok(EXIT_OK)
    }
}

/// Whether each integration has a known settings layout at `version`
fn integration_support(version: SchemaVersion) -> Vec<(Operation, bool)> {
    Operation::ALL
        .into_iter()
        .filter_map(|op| catalog::integration(op).map(|i| (op, i.supports(version))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integration_support_lists_every_integration() {
        let support = integration_support(SchemaVersion::new(3, 4, 0, 0));
        assert_eq!(support.len(), 8);
        assert!(support.iter().all(|(_, supported)| *supported));
    }

    #[test]
    fn test_integration_support_after_last_known_layout() {
        let support = integration_support(SchemaVersion::new(3, 6, 0, 0));
        assert!(support.iter().all(|(_, supported)| !*supported));
        assert!(support.iter().any(|(op, _)| *op == Operation::Orcid));
    }
}
