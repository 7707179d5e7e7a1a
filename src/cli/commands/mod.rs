//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod init;
pub mod inspect;
pub mod run;
pub mod validate;

use crate::domain::{AnonymizerError, StoreError};

/// Success
pub const EXIT_OK: i32 = 0;
/// Run finished, some operations failed
pub const EXIT_PARTIAL: i32 = 1;
/// Configuration error
pub const EXIT_CONFIG: i32 = 2;
/// Connection or schema precondition failure
pub const EXIT_PRECONDITION: i32 = 4;
/// Fatal error
pub const EXIT_FATAL: i32 = 5;

/// Exit code for an error raised while connecting or inspecting the schema
pub(crate) fn setup_exit_code(err: &AnonymizerError) -> i32 {
    match err {
        AnonymizerError::Configuration(_) | AnonymizerError::UnsupportedLocale { .. } => {
            EXIT_CONFIG
        }
        AnonymizerError::Store(StoreError::ConnectionFailed(_)) => EXIT_PRECONDITION,
        e if e.is_precondition() => EXIT_PRECONDITION,
        _ => EXIT_FATAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SchemaVersion;

    #[test]
    fn test_setup_exit_codes() {
        assert_eq!(
            setup_exit_code(&AnonymizerError::AmbiguousVersion { count: 2 }),
            EXIT_PRECONDITION
        );
        assert_eq!(
            setup_exit_code(&AnonymizerError::UnsupportedVersion {
                version: SchemaVersion::new(2, 4, 8, 0),
                minimum: SchemaVersion::new(3, 0, 0, 0),
            }),
            EXIT_PRECONDITION
        );
        assert_eq!(
            setup_exit_code(&StoreError::ConnectionFailed("refused".into()).into()),
            EXIT_PRECONDITION
        );
        assert_eq!(
            setup_exit_code(&AnonymizerError::Configuration("bad".into())),
            EXIT_CONFIG
        );
        assert_eq!(
            setup_exit_code(&StoreError::QueryFailed("boom".into()).into()),
            EXIT_FATAL
        );
    }
}
