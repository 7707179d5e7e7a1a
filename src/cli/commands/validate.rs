//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the anonymizer configuration file.

use crate::cli::commands::{EXIT_CONFIG, EXIT_OK};
use crate::config::{load_config, redact_connection_string};
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // load_config validates every section before returning
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!(
            "  Database: {}",
            redact_connection_string(config.database.connection_string.expose_secret().as_ref())
        );
        println!("  Max Connections: {}", config.database.max_connections);
        println!("  Batch Size: {}", config.scrub.batch_size);
        println!("  Collision Strategy: {:?}", config.scrub.collision_strategy);
        println!(
            "  Operations: {}",
            config
                .scrub
                .operations
                .iter()
                .map(|op| op.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("  Continue On Error: {}", config.scrub.continue_on_error);
        if !config.locales.overrides.is_empty() {
            println!("  Locale Overrides: {:?}", config.locales.overrides);
        }
        println!();

        Ok(EXIT_OK)
    }
}
