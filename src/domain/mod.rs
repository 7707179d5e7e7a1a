//! Domain types for the anonymizer.
//!
//! The domain layer provides:
//! - **Error types** ([`AnonymizerError`], [`StoreError`])
//! - **Result type alias** ([`Result`])
//! - **Schema versions** ([`SchemaVersion`], [`VersionRange`], [`Product`])
//! - **Store-neutral values** ([`SqlValue`], [`Row`], [`Filter`], [`Assignment`])
//!
//! # Error Handling
//!
//! All fallible library operations return [`Result<T, AnonymizerError>`]:
//!
//! ```rust
//! use pkp_anonymizer::domain::{AnonymizerError, Result, SchemaVersion};
//!
//! fn require_v3(version: SchemaVersion) -> Result<()> {
//!     let minimum = SchemaVersion::new(3, 0, 0, 0);
//!     if version < minimum {
//!         return Err(AnonymizerError::UnsupportedVersion { version, minimum });
//!     }
//!     Ok(())
//! }
//! # assert!(require_v3(SchemaVersion::new(2, 4, 8, 0)).is_err());
//! ```

pub mod errors;
pub mod result;
pub mod values;
pub mod version;

// Re-export commonly used types for convenience
pub use errors::{AnonymizerError, StoreError};
pub use result::Result;
pub use values::{Assignment, Condition, Filter, Row, SqlValue};
pub use version::{Product, SchemaVersion, VersionRange};
