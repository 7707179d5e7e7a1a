//! Scrub orchestration
//!
//! The [`Anonymizer`] detects the schema once, when it is created, and then
//! runs scrub operations in the order the caller asks for them. There is no
//! global transaction: every operation commits as it goes and a failed
//! operation never undoes the ones before it.
//!
//! # Examples
//!
//! ```no_run
//! use pkp_anonymizer::adapters::memory::MemoryStore;
//! use pkp_anonymizer::anonymization::locale::FakerFactory;
//! use pkp_anonymizer::anonymization::{Anonymizer, EngineSettings, Operation};
//! use std::sync::Arc;
//!
//! # async fn example() -> pkp_anonymizer::domain::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let anonymizer = Anonymizer::new(
//!     store,
//!     Arc::new(FakerFactory::new()),
//!     EngineSettings::default(),
//! )
//! .await?;
//!
//! let report = anonymizer
//!     .run(&[Operation::Users, Operation::Crossref], false)
//!     .await;
//! report.log_summary();
//! # Ok(())
//! # }
//! ```

use crate::adapters::database::traits::TabularStore;
use crate::anonymization::entities::{
    AuthorScrubber, EmailLogScrubber, PublicationScrubber, ReviewScrubber, UserScrubber,
};
use crate::anonymization::identity::CollisionStrategy;
use crate::anonymization::integrations::{catalog, IntegrationScrubber};
use crate::anonymization::locale::generator::GeneratorFactory;
use crate::anonymization::locale::LocaleOverrides;
use crate::anonymization::operation::Operation;
use crate::anonymization::report::{OperationOutcome, RunReport, ScrubStats};
use crate::anonymization::schema::SchemaInspector;
use crate::anonymization::scrubber::{ScrubContext, Scrubber};
use crate::config::{LocalesConfig, ScrubConfig};
use crate::domain::Result;
use std::sync::Arc;
use std::time::Instant;

/// Tunables of an [`Anonymizer`]
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Keyset page size for large tables
    pub batch_size: usize,
    pub strategy: CollisionStrategy,
    pub overrides: LocaleOverrides,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            strategy: CollisionStrategy::default(),
            overrides: LocaleOverrides::default(),
        }
    }
}

impl EngineSettings {
    pub fn from_config(scrub: &ScrubConfig, locales: &LocalesConfig) -> Self {
        Self {
            batch_size: scrub.batch_size,
            strategy: scrub.collision_strategy,
            overrides: LocaleOverrides::with_overrides(&locales.overrides),
        }
    }
}

/// Runs scrub operations against one store
pub struct Anonymizer {
    store: Arc<dyn TabularStore>,
    factory: Arc<dyn GeneratorFactory>,
    schema: SchemaInspector,
    settings: EngineSettings,
}

impl Anonymizer {
    /// Create an anonymizer bound to `store`
    ///
    /// Detects the product and schema version before returning. Nothing is
    /// written here.
    ///
    /// # Errors
    ///
    /// Returns a precondition error (ambiguous version, unsupported version,
    /// unknown product) or the store error of the version read.
    pub async fn new(
        store: Arc<dyn TabularStore>,
        factory: Arc<dyn GeneratorFactory>,
        settings: EngineSettings,
    ) -> Result<Self> {
        let schema = SchemaInspector::inspect(store.as_ref()).await?;
        Ok(Self {
            store,
            factory,
            schema,
            settings,
        })
    }

    /// Detected product and version
    pub fn schema(&self) -> &SchemaInspector {
        &self.schema
    }

    /// Scrubber implementing `operation`
    pub fn scrubber(operation: Operation) -> Box<dyn Scrubber> {
        match operation {
            Operation::Users => Box::new(UserScrubber),
            Operation::Authors => Box::new(AuthorScrubber),
            Operation::Publications => Box::new(PublicationScrubber),
            Operation::Reviews => Box::new(ReviewScrubber),
            Operation::EmailLog => Box::new(EmailLogScrubber),
            Operation::Crossref => Box::new(IntegrationScrubber::new(&catalog::CROSSREF)),
            Operation::Datacite => Box::new(IntegrationScrubber::new(&catalog::DATACITE)),
            Operation::Orcid => Box::new(IntegrationScrubber::new(&catalog::ORCID)),
            Operation::Lucene => Box::new(IntegrationScrubber::new(&catalog::LUCENE)),
            Operation::Ithenticate => Box::new(IntegrationScrubber::new(&catalog::ITHENTICATE)),
            Operation::Doaj => Box::new(IntegrationScrubber::new(&catalog::DOAJ)),
            Operation::Portico => Box::new(IntegrationScrubber::new(&catalog::PORTICO)),
            Operation::Paypal => Box::new(IntegrationScrubber::new(&catalog::PAYPAL)),
        }
    }

    /// Run a single operation
    ///
    /// # Errors
    ///
    /// Returns the scrubber's error. Rows it rewrote before failing stay
    /// rewritten.
    pub async fn invoke(&self, operation: Operation) -> Result<ScrubStats> {
        let started = Instant::now();
        crate::log_operation_start!(operation, self.schema.version());

        let ctx = ScrubContext {
            store: self.store.as_ref(),
            schema: &self.schema,
            factory: self.factory.as_ref(),
            overrides: &self.settings.overrides,
            batch_size: self.settings.batch_size,
            strategy: self.settings.strategy,
        };
        let stats = Self::scrubber(operation).scrub(&ctx).await?;

        crate::log_operation_complete!(
            operation,
            stats.rows_updated,
            stats.rows_deleted,
            started.elapsed()
        );
        Ok(stats)
    }

    /// Run `plan` in order and report every outcome
    ///
    /// Without `continue_on_error` the run stops at the first failure and
    /// the remaining operations are reported as skipped.
    pub async fn run(&self, plan: &[Operation], continue_on_error: bool) -> RunReport {
        let mut report = RunReport::new(self.schema.product(), self.schema.version());

        let mut remaining = plan.iter().copied();
        while let Some(operation) = remaining.next() {
            let started = Instant::now();
            match self.invoke(operation).await {
                Ok(stats) => {
                    report.push(OperationOutcome::completed(operation, stats, started.elapsed()));
                }
                Err(e) => {
                    tracing::error!(operation = %operation, error = %e, "Operation failed");
                    report.push(OperationOutcome::failed(
                        operation,
                        e.to_string(),
                        started.elapsed(),
                    ));
                    if !continue_on_error {
                        report.outcomes.extend(remaining.by_ref().map(OperationOutcome::skipped));
                        break;
                    }
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::anonymization::locale::FakerFactory;
    use crate::anonymization::report::OperationStatus;
    use crate::domain::values::Row;
    use crate::domain::{AnonymizerError, Product, SchemaVersion};

    fn store(version: [i64; 4]) -> MemoryStore {
        MemoryStore::new()
            .with_table(
                "versions",
                vec![Row::new()
                    .with("product", "ojs2")
                    .with("product_type", "core")
                    .with("current", 1)
                    .with("major", version[0])
                    .with("minor", version[1])
                    .with("revision", version[2])
                    .with("build", version[3])],
            )
            .with_table(
                "plugin_settings",
                vec![Row::new()
                    .with("plugin_name", "porticoexportplugin")
                    .with("context_id", 1)
                    .with("setting_name", "porticoPassword")
                    .with("setting_value", "hunter2")],
            )
    }

    async fn anonymizer(store: MemoryStore) -> Result<Anonymizer> {
        Anonymizer::new(
            Arc::new(store),
            Arc::new(FakerFactory::seeded(1)),
            EngineSettings::default(),
        )
        .await
    }

    #[tokio::test]
    async fn test_new_detects_schema() {
        let anonymizer = anonymizer(store([3, 4, 0, 5])).await.unwrap();
        assert_eq!(anonymizer.schema().product(), Product::Ojs);
        assert_eq!(anonymizer.schema().version(), SchemaVersion::new(3, 4, 0, 5));
    }

    #[tokio::test]
    async fn test_new_rejects_old_schema() {
        let result = anonymizer(store([2, 4, 8, 0])).await;
        assert!(matches!(result, Err(AnonymizerError::UnsupportedVersion { .. })));
    }

    #[tokio::test]
    async fn test_run_stops_at_first_failure() {
        let anonymizer = anonymizer(store([3, 6, 0, 0])).await.unwrap();
        let report = anonymizer
            .run(&[Operation::Orcid, Operation::Portico], false)
            .await;

        assert!(!report.is_successful());
        assert_eq!(report.outcomes[0].status, OperationStatus::Failed);
        assert_eq!(report.outcomes[1].status, OperationStatus::Skipped);
    }

    #[tokio::test]
    async fn test_run_continues_when_asked() {
        // Neither integration has a layout at 3.6.
        let anonymizer = anonymizer(store([3, 6, 0, 0])).await.unwrap();
        let report = anonymizer
            .run(&[Operation::Orcid, Operation::Portico], true)
            .await;

        assert_eq!(report.count(OperationStatus::Failed), 2);
        assert_eq!(report.count(OperationStatus::Skipped), 0);
    }

    #[tokio::test]
    async fn test_invoke_reports_counts() {
        let anonymizer = anonymizer(store([3, 3, 0, 0])).await.unwrap();
        let stats = anonymizer.invoke(Operation::Portico).await.unwrap();
        assert_eq!(stats, ScrubStats::deleted(1));
    }

    #[test]
    fn test_scrubber_names_match_operations() {
        for op in Operation::ALL {
            assert_eq!(Anonymizer::scrubber(op).name(), op.name());
        }
    }
}
