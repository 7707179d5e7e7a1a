//! Scrub statistics and run reporting
//!
//! Every invoked operation contributes one [`OperationOutcome`] to the
//! [`RunReport`], in invocation order. The report is logged at the end of a
//! run and can be written out as JSON for auditing.

use crate::anonymization::operation::Operation;
use crate::domain::{Product, Result, SchemaVersion};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

/// Row counts of one scrubber invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrubStats {
    /// Rows rewritten in place
    pub rows_updated: u64,

    /// Rows removed
    pub rows_deleted: u64,

    /// Forced settings (sandbox and test-mode flags) a context has no row
    /// for, so its live default stays in effect
    #[serde(default)]
    pub flags_unset: u64,
}

impl ScrubStats {
    pub fn updated(rows: u64) -> Self {
        Self {
            rows_updated: rows,
            ..Self::default()
        }
    }

    pub fn deleted(rows: u64) -> Self {
        Self {
            rows_deleted: rows,
            ..Self::default()
        }
    }
}

impl AddAssign for ScrubStats {
    fn add_assign(&mut self, other: Self) {
        self.rows_updated += other.rows_updated;
        self.rows_deleted += other.rows_deleted;
        self.flags_unset += other.flags_unset;
    }
}

/// Final state of one operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    Completed,
    Failed,
    /// Not run because an earlier operation failed
    Skipped,
}

/// Outcome of one operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationOutcome {
    pub operation: Operation,
    pub status: OperationStatus,
    pub rows_updated: u64,
    pub rows_deleted: u64,
    pub duration_ms: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub flags_unset: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn is_zero(n: &u64) -> bool {
    *n == 0
}

impl OperationOutcome {
    pub fn completed(operation: Operation, stats: ScrubStats, duration: Duration) -> Self {
        Self {
            operation,
            status: OperationStatus::Completed,
            rows_updated: stats.rows_updated,
            rows_deleted: stats.rows_deleted,
            duration_ms: duration.as_millis() as u64,
            flags_unset: stats.flags_unset,
            error: None,
        }
    }

    pub fn failed(operation: Operation, error: String, duration: Duration) -> Self {
        Self {
            operation,
            status: OperationStatus::Failed,
            rows_updated: 0,
            rows_deleted: 0,
            duration_ms: duration.as_millis() as u64,
            flags_unset: 0,
            error: Some(error),
        }
    }

    pub fn skipped(operation: Operation) -> Self {
        Self {
            operation,
            status: OperationStatus::Skipped,
            rows_updated: 0,
            rows_deleted: 0,
            duration_ms: 0,
            flags_unset: 0,
            error: None,
        }
    }
}

/// Ordered record of a scrub run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub product: Product,
    pub version: String,
    pub outcomes: Vec<OperationOutcome>,
}

impl RunReport {
    /// Create an empty report for a run against `product` at `version`
    pub fn new(product: Product, version: SchemaVersion) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            product,
            version: version.to_string(),
            outcomes: Vec::new(),
        }
    }

    pub fn push(&mut self, outcome: OperationOutcome) {
        self.outcomes.push(outcome);
    }

    /// Whether every operation completed
    pub fn is_successful(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| o.status == OperationStatus::Completed)
    }

    /// Number of operations with the given status
    pub fn count(&self, status: OperationStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    /// Sum of row counts over completed operations
    pub fn totals(&self) -> ScrubStats {
        let mut totals = ScrubStats::default();
        for outcome in &self.outcomes {
            totals += ScrubStats {
                rows_updated: outcome.rows_updated,
                rows_deleted: outcome.rows_deleted,
                flags_unset: outcome.flags_unset,
            };
        }
        totals
    }

    /// Log the summary
    pub fn log_summary(&self) {
        let totals = self.totals();
        tracing::info!(
            run_id = %self.run_id,
            product = %self.product,
            version = %self.version,
            completed = self.count(OperationStatus::Completed),
            failed = self.count(OperationStatus::Failed),
            skipped = self.count(OperationStatus::Skipped),
            rows_updated = totals.rows_updated,
            rows_deleted = totals.rows_deleted,
            flags_unset = totals.flags_unset,
            "Scrub run finished"
        );

        for outcome in &self.outcomes {
            if outcome.flags_unset > 0 {
                tracing::warn!(
                    operation = %outcome.operation,
                    flags_unset = outcome.flags_unset,
                    "Forced settings had no row to overwrite"
                );
            }
            if let Some(error) = &outcome.error {
                tracing::warn!(
                    operation = %outcome.operation,
                    error = %error,
                    "Operation failed"
                );
            }
        }
    }

    /// Write the report as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
