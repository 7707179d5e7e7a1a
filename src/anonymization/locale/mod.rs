//! Locale discovery and generator binding
//!
//! Every EAV settings table carries a `locale` column. A [`LocaleCatalog`] is
//! discovered per settings table and per scrubber invocation: it holds one
//! generator for each distinct non-empty locale of that table plus a default
//! generator for values with no locale dimension.

pub mod generator;

use crate::adapters::database::traits::TabularStore;
use crate::domain::values::Filter;
use crate::domain::{AnonymizerError, Result};
use generator::{GeneratorFactory, ValueGenerator};
use std::collections::BTreeMap;

pub use generator::{FakerFactory, FakerGenerator, FakerLocale, DEFAULT_TAG};

/// Locale code to generator tag mapping
///
/// Codes without an entry are used as the tag unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleOverrides(BTreeMap<String, String>);

impl Default for LocaleOverrides {
    fn default() -> Self {
        Self(
            [
                ("en", "en_US"),
                ("fr", "fr_FR"),
                ("pt", "pt_BR"),
                ("ja", "ja_JP"),
                ("zh", "zh_CN"),
                ("ar", "ar_SA"),
            ]
            .into_iter()
            .map(|(code, tag)| (code.to_string(), tag.to_string()))
            .collect(),
        )
    }
}

impl LocaleOverrides {
    /// Built-in overrides extended (and corrected) by `extra`
    pub fn with_overrides(extra: &BTreeMap<String, String>) -> Self {
        let mut overrides = Self::default();
        overrides
            .0
            .extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        overrides
    }

    /// Generator tag for `locale`
    pub fn resolve<'a>(&'a self, locale: &'a str) -> &'a str {
        self.0.get(locale).map(String::as_str).unwrap_or(locale)
    }
}

/// Locale to generator binding for one settings table
pub struct LocaleCatalog {
    table: String,
    generators: BTreeMap<String, Box<dyn ValueGenerator>>,
    default: Box<dyn ValueGenerator>,
}

impl LocaleCatalog {
    /// Discovers the locales of `table` and binds a generator to each
    ///
    /// # Arguments
    ///
    /// * `store` - Store to read from (read only)
    /// * `table` - Settings table carrying a `locale` column
    /// * `overrides` - Locale code to generator tag mapping
    /// * `factory` - Generator source
    ///
    /// # Errors
    ///
    /// Returns [`AnonymizerError::UnsupportedLocale`] if a discovered locale
    /// resolves to a tag the factory has no generator for.
    pub async fn discover(
        store: &dyn TabularStore,
        table: &str,
        overrides: &LocaleOverrides,
        factory: &dyn GeneratorFactory,
    ) -> Result<Self> {
        let rows = store
            .select_distinct(table, "locale", &Filter::new().not_eq("locale", ""))
            .await?;

        let mut generators = BTreeMap::new();
        for locale in rows.iter().filter_map(|row| row.get_str("locale")) {
            let tag = overrides.resolve(locale);
            let generator =
                factory
                    .generator(tag)
                    .ok_or_else(|| AnonymizerError::UnsupportedLocale {
                        locale: locale.to_string(),
                        tag: tag.to_string(),
                    })?;
            generators.insert(locale.to_string(), generator);
        }

        tracing::debug!(
            table = %table,
            locales = ?generators.keys().collect::<Vec<_>>(),
            "Discovered locales"
        );

        Ok(Self {
            table: table.to_string(),
            generators,
            default: factory.default_generator(),
        })
    }

    /// Settings table this catalog was discovered from
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Discovered locale codes in ascending order
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.generators.keys().map(String::as_str)
    }

    /// Generator bound to `locale`; an empty locale selects the default
    ///
    /// # Errors
    ///
    /// Returns [`AnonymizerError::UnsupportedLocale`] for a locale that was
    /// not present at discovery time.
    pub fn generator(&mut self, locale: &str) -> Result<&mut dyn ValueGenerator> {
        if locale.is_empty() {
            return Ok(self.default.as_mut());
        }
        match self.generators.get_mut(locale) {
            Some(generator) => Ok(generator.as_mut()),
            None => Err(AnonymizerError::UnsupportedLocale {
                locale: locale.to_string(),
                tag: format!("not discovered in {}", self.table),
            }),
        }
    }

    /// Generator for values with no locale dimension
    pub fn default_generator(&mut self) -> &mut dyn ValueGenerator {
        self.default.as_mut()
    }
}
