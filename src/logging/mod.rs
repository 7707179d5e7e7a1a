//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output with configurable levels
//! - JSON-formatted rolling log files
//!
//! Generated values and original personal data are never logged; log
//! record counts, keys and table names instead.
//!
//! # Example
//!
//! ```no_run
//! use pkp_anonymizer::logging::init_logging;
//! use pkp_anonymizer::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(table = "users", "Scrubbing started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a scrub operation
///
/// # Example
///
/// ```no_run
/// use pkp_anonymizer::log_operation_start;
///
/// log_operation_start!("users", "3.4.0.5");
/// ```
#[macro_export]
macro_rules! log_operation_start {
    ($operation:expr, $version:expr) => {
        tracing::info!(
            operation = %$operation,
            version = %$version,
            "Starting operation"
        );
    };
}

/// Log the completion of a scrub operation
///
/// # Example
///
/// ```no_run
/// use pkp_anonymizer::log_operation_complete;
/// use std::time::Duration;
///
/// log_operation_complete!("portico", 12, 3, Duration::from_millis(40));
/// ```
#[macro_export]
macro_rules! log_operation_complete {
    ($operation:expr, $updated:expr, $deleted:expr, $duration:expr) => {
        tracing::info!(
            operation = %$operation,
            rows_updated = $updated,
            rows_deleted = $deleted,
            duration_ms = $duration.as_millis() as u64,
            "Operation completed"
        );
    };
}

/// Log one processed keyset page
///
/// # Example
///
/// ```no_run
/// use pkp_anonymizer::log_batch_processing;
///
/// log_batch_processing!("email_log", 1000, Some(48_213i64));
/// ```
#[macro_export]
macro_rules! log_batch_processing {
    ($table:expr, $rows:expr, $last_key:expr) => {
        tracing::debug!(
            table = %$table,
            rows = $rows,
            last_key = ?$last_key,
            "Processed batch"
        );
    };
}

/// Log a discarded identity candidate
///
/// # Example
///
/// ```no_run
/// use pkp_anonymizer::log_retry_attempt;
///
/// log_retry_attempt!(2, "email", "uniqueness conflict");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $domain:expr, $reason:expr) => {
        tracing::debug!(
            attempt = $attempt,
            domain = %$domain,
            reason = $reason,
            "Retrying identity candidate"
        );
    };
}
