// PKP Anonymizer - Personal data scrubber for PKP application databases
// Copyright (c) 2025 PKP Anonymizer Contributors
// Licensed under the MIT License

//! # PKP Anonymizer
//!
//! Replaces personal data and third-party credentials in a copy of an Open
//! Journal Systems (OJS), Open Monograph Press (OMP) or Open Preprint Systems
//! (OPS) database with synthetic, locale-appropriate values, so the copy can
//! be shared with developers and testers.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Detecting** the installed product and its four-part schema version
//! - **Scrubbing** users, authors, publications, reviews and the email log
//! - **Neutralizing** integration credentials (Crossref, DataCite, ORCID, ...)
//!   using the settings layout of the detected version
//! - **Reporting** every operation's outcome in a [`anonymization::RunReport`]
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`anonymization`] - Schema detection, scrubbers and the run engine
//! - [`adapters`] - Store abstraction with PostgreSQL, MySQL and in-memory backends
//! - [`domain`] - Versions, row values and error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pkp_anonymizer::adapters::database::create_store;
//! use pkp_anonymizer::anonymization::locale::FakerFactory;
//! use pkp_anonymizer::anonymization::{Anonymizer, EngineSettings};
//! use pkp_anonymizer::config::load_config;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("anonymizer.toml")?;
//!     let store = create_store(&config.database).await?;
//!
//!     let anonymizer = Anonymizer::new(
//!         store,
//!         Arc::new(FakerFactory::new()),
//!         EngineSettings::from_config(&config.scrub, &config.locales),
//!     )
//!     .await?;
//!
//!     let report = anonymizer.run(&config.scrub.operations, false).await;
//!     println!("Updated {} rows", report.totals().rows_updated);
//!     Ok(())
//! }
//! ```
//!
//! ## Version Gating
//!
//! Construction fails before any write when the `versions` table holds no
//! single current row or the version is below 3.0. Integrations whose
//! settings layout is unknown at the detected version fail individually
//! with [`domain::AnonymizerError::UnsupportedIntegrationVersion`].
//!
//! ## Error Handling
//!
//! Library code returns [`domain::Result`]; only the CLI layer uses `anyhow`.

pub mod adapters;
pub mod anonymization;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
