//! Scrubber trait and the context every scrubber runs in

use crate::adapters::database::traits::TabularStore;
use crate::anonymization::entities::chunk::KeysetPager;
use crate::anonymization::identity::CollisionStrategy;
use crate::anonymization::locale::generator::GeneratorFactory;
use crate::anonymization::locale::{LocaleCatalog, LocaleOverrides};
use crate::anonymization::report::ScrubStats;
use crate::anonymization::schema::SchemaInspector;
use crate::domain::values::Filter;
use crate::domain::{Result, SchemaVersion};
use async_trait::async_trait;

/// Everything a scrubber needs for one invocation
///
/// The context is rebuilt per invocation, so locale catalogs and identity
/// pools discovered from it always reflect the store's current state.
pub struct ScrubContext<'a> {
    pub store: &'a dyn TabularStore,
    pub schema: &'a SchemaInspector,
    pub factory: &'a dyn GeneratorFactory,
    pub overrides: &'a LocaleOverrides,
    pub batch_size: usize,
    pub strategy: CollisionStrategy,
}

impl<'a> ScrubContext<'a> {
    /// Detected schema version
    pub fn version(&self) -> SchemaVersion {
        self.schema.version()
    }

    /// Discovers the locales of a settings table
    pub async fn catalog(&self, table: &str) -> Result<LocaleCatalog> {
        LocaleCatalog::discover(self.store, table, self.overrides, self.factory).await
    }

    /// Keyset pager over `table` ordered by `key`
    pub fn pager(&self, table: &'static str, key: &'static str, filter: Filter) -> KeysetPager<'a> {
        KeysetPager::new(self.store, table, key, self.batch_size, filter)
    }
}

/// One named scrub operation
///
/// Scrubbers are stateless; every call to [`Scrubber::scrub`] reads the
/// store afresh and generates new values.
#[async_trait]
pub trait Scrubber: Send + Sync {
    /// Operation name used in logs
    fn name(&self) -> &'static str;

    /// Rewrites the personal data this scrubber owns
    ///
    /// # Errors
    ///
    /// Returns the first store, locale or version error encountered. Rows
    /// already rewritten stay rewritten.
    async fn scrub(&self, ctx: &ScrubContext<'_>) -> Result<ScrubStats>;
}
