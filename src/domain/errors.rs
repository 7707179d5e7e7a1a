//! Domain error types
//!
//! This module defines the error hierarchy for the anonymizer. Errors are
//! domain-specific and don't expose third-party driver types.

use crate::domain::version::SchemaVersion;
use thiserror::Error;

/// Main anonymizer error type
///
/// This is the primary error type used throughout the library. Precondition
/// errors (`AmbiguousVersion`, `UnsupportedVersion`, `UnknownProduct`) are
/// raised before any mutation happens.
#[derive(Debug, Error)]
pub enum AnonymizerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Zero or several current core version rows were found
    #[error("Expected exactly one current version row for a recognized product, found {count}")]
    AmbiguousVersion { count: usize },

    /// The detected schema version is below the supported range
    #[error("Unsupported schema version {version}: the minimum supported version is {minimum}")]
    UnsupportedVersion {
        version: SchemaVersion,
        minimum: SchemaVersion,
    },

    /// A product tag outside the recognized set
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    /// A locale with no override and no synthetic value generator
    #[error("Unsupported locale '{locale}' (resolved to generator tag '{tag}')")]
    UnsupportedLocale { locale: String, tag: String },

    /// An integration has no known settings layout for the detected version
    #[error("The {integration} integration has no known settings layout for version {version}")]
    UnsupportedIntegrationVersion {
        integration: String,
        version: SchemaVersion,
    },

    /// Store-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl AnonymizerError {
    /// Whether this error is a store uniqueness conflict
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, AnonymizerError::Store(e) if e.is_unique_violation())
    }

    /// Whether this error is raised before any mutation takes place
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            AnonymizerError::AmbiguousVersion { .. }
                | AnonymizerError::UnsupportedVersion { .. }
                | AnonymizerError::UnknownProduct(_)
        )
    }
}

/// Tabular store errors
///
/// Store adapters classify driver failures into these variants. Only
/// [`StoreError::UniqueViolation`] is recoverable, and only by the identity
/// pool's write-and-retry loop.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A write violated a uniqueness constraint
    #[error("Uniqueness constraint violated on {table}: {message}")]
    UniqueViolation { table: String, message: String },

    /// Failed to connect to the store
    #[error("Failed to connect to store: {0}")]
    ConnectionFailed(String),

    /// Query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Statement (update/delete) failed
    #[error("Statement execution failed: {0}")]
    StatementFailed(String),

    /// The table does not exist
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Invalid identifier or value shape
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl StoreError {
    /// Whether the store reported a uniqueness conflict
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, StoreError::UniqueViolation { .. })
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for AnonymizerError {
    fn from(err: std::io::Error) -> Self {
        AnonymizerError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for AnonymizerError {
    fn from(err: serde_json::Error) -> Self {
        AnonymizerError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for AnonymizerError {
    fn from(err: toml::de::Error) -> Self {
        AnonymizerError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymizer_error_display() {
        let err = AnonymizerError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_ambiguous_version_display() {
        let err = AnonymizerError::AmbiguousVersion { count: 2 };
        assert!(err.to_string().contains("found 2"));
        assert!(err.is_precondition());
    }

    #[test]
    fn test_unsupported_version_display() {
        let err = AnonymizerError::UnsupportedVersion {
            version: SchemaVersion::new(2, 4, 8, 0),
            minimum: SchemaVersion::new(3, 0, 0, 0),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported schema version 2.4.8.0: the minimum supported version is 3.0.0.0"
        );
    }

    #[test]
    fn test_store_error_conversion() {
        let store_err = StoreError::QueryFailed("syntax error".to_string());
        let err: AnonymizerError = store_err.into();
        assert!(matches!(err, AnonymizerError::Store(_)));
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn test_unique_violation_classification() {
        let err: AnonymizerError = StoreError::UniqueViolation {
            table: "users".to_string(),
            message: "duplicate key".to_string(),
        }
        .into();
        assert!(err.is_unique_violation());
        assert!(!err.is_precondition());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: AnonymizerError = io_err.into();
        assert!(matches!(err, AnonymizerError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: AnonymizerError = json_err.into();
        assert!(matches!(err, AnonymizerError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: AnonymizerError = toml_err.into();
        assert!(matches!(err, AnonymizerError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }
}
