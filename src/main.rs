// PKP Anonymizer - Personal data scrubber for PKP application databases
// Copyright (c) 2025 PKP Anonymizer Contributors
// Licensed under the MIT License

use clap::Parser;
use pkp_anonymizer::cli::{Cli, Commands};
use pkp_anonymizer::config::{load_config, LoggingConfig};
use pkp_anonymizer::logging::init_logging;
use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load environment variables from .env file if present
    // This is optional - if .env doesn't exist, it's silently ignored
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging settings come from the configuration file when it loads; the
    // command itself reports a broken file.
    let file_config = load_config(&cli.config).ok();
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| file_config.as_ref().map(|c| c.application.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    let logging_config = file_config
        .map(|c| c.logging)
        .unwrap_or_else(LoggingConfig::default);

    let logging_guard = match init_logging(&log_level, &logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(5);
        }
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "PKP Anonymizer - Personal data scrubber for PKP application databases"
    );

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            5 // Fatal error exit code
        }
    };

    // Flush file logs before exiting
    drop(logging_guard);
    process::exit(exit_code);
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    match &cli.command {
        Commands::Run(args) => args.execute(&cli.config).await,
        Commands::Inspect(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
