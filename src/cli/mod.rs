//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for the anonymizer using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// PKP Anonymizer - scrubs personal data from OJS, OMP and OPS databases
#[derive(Parser, Debug)]
#[command(name = "pkp-anonymizer")]
#[command(version, about, long_about = None)]
#[command(author = "PKP Anonymizer Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        default_value = "anonymizer.toml",
        env = "PKP_ANONYMIZER_CONFIG"
    )]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "PKP_ANONYMIZER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scrub the configured database in place
    Run(commands::run::RunArgs),

    /// Show the detected product, version and integration support
    Inspect(commands::inspect::InspectArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
