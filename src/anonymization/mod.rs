//! Anonymization of PKP databases
//!
//! This module rewrites the personal data of an OJS, OMP or OPS database in
//! place so that a production snapshot can be handed to developers.
//!
//! # Architecture
//!
//! - **Schema**: detects product and version from the `versions` table
//! - **Locale**: binds one synthetic value generator per discovered locale
//! - **Identity**: keeps emails and usernames unique across a run
//! - **Entities**: users, authors, publications, reviews, email log
//! - **Integrations**: credentials of third-party plugins, per version layout
//! - **Engine**: runs operations in order and produces a [`RunReport`]
//!
//! # Usage
//!
//! ```rust,ignore
//! use pkp_anonymizer::anonymization::{Anonymizer, EngineSettings, Operation};
//!
//! let anonymizer = Anonymizer::new(store, factory, EngineSettings::default()).await?;
//! let report = anonymizer.run(&Operation::default_plan(), false).await;
//! ```

pub mod engine;
pub mod entities;
pub mod identity;
pub mod integrations;
pub mod locale;
pub mod operation;
pub mod report;
pub mod schema;
pub mod scrubber;

// Re-export main types
pub use engine::{Anonymizer, EngineSettings};
pub use operation::Operation;
pub use report::{OperationOutcome, OperationStatus, RunReport, ScrubStats};
pub use schema::SchemaInspector;
pub use scrubber::{ScrubContext, Scrubber};
