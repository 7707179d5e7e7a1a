//! Integration credential scrubbers
//!
//! Each third-party integration keeps its credentials as `setting_name` /
//! `setting_value` rows, either in the generic `plugin_settings` table under
//! one of its historical plugin names, or in the product's context settings
//! table. Every key is handled by one [`KeyAction`]:
//!
//! - `Replace` rewrites each existing row with a generated credential
//! - `Fixed` forces a literal, typically a test-mode or sandbox flag. Only
//!   existing rows can be forced; a context holding settings for the
//!   integration but no row for the flag is counted in
//!   [`ScrubStats::flags_unset`] and logged.
//! - `Delete` removes the rows
//!
//! Which keys exist where depends on the schema version, so every
//! [`Integration`] carries a table of [`IntegrationRule`]s. A version outside
//! every rule fails with
//! [`AnonymizerError::UnsupportedIntegrationVersion`] before anything is
//! written.

pub mod catalog;

use crate::adapters::database::traits::TabularStore;
use crate::anonymization::locale::generator::ValueGenerator;
use crate::anonymization::report::ScrubStats;
use crate::anonymization::scrubber::{ScrubContext, Scrubber};
use crate::domain::values::{Assignment, Filter, Row, SqlValue};
use crate::domain::{AnonymizerError, Result, SchemaVersion, VersionRange};
use async_trait::async_trait;

const PLUGIN_SETTINGS: &str = "plugin_settings";

/// Kind of generated replacement credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    Username,
    Password,
    Email,
    /// Opaque API key, client id or secret
    Token,
    /// Display name of a contact person
    Name,
}

impl Credential {
    fn generate(self, generator: &mut dyn ValueGenerator) -> String {
        match self {
            Credential::Username => {
                let email = generator.email();
                email.split('@').next().unwrap_or_default().to_string()
            }
            Credential::Password => generator.password(),
            Credential::Email => generator.email(),
            Credential::Token => generator.token(),
            Credential::Name => generator.full_name(),
        }
    }
}

/// What happens to one setting key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Replace(Credential),
    Fixed(&'static str),
    Delete,
}

/// Table holding an integration's settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsLocation {
    /// `plugin_settings` rows under any of these plugin names
    PluginSettings(&'static [&'static str]),
    /// The product's context settings table
    ContextSettings,
}

/// Keys handled in one settings location
#[derive(Debug, Clone, Copy)]
pub struct ScrubTarget {
    pub location: SettingsLocation,
    pub keys: &'static [(&'static str, KeyAction)],
}

impl ScrubTarget {
    fn names(&self, wanted: impl Fn(&KeyAction) -> bool) -> Vec<&'static str> {
        self.keys
            .iter()
            .filter(|(_, action)| wanted(action))
            .map(|(name, _)| *name)
            .collect()
    }
}

/// Targets for one schema version range
#[derive(Debug, Clone, Copy)]
pub struct IntegrationRule {
    pub range: VersionRange,
    pub targets: &'static [ScrubTarget],
}

/// A third-party integration and its versioned settings layouts
#[derive(Debug)]
pub struct Integration {
    pub name: &'static str,
    pub rules: &'static [IntegrationRule],
}

impl Integration {
    /// Rule covering `version`
    pub fn rule_for(&self, version: SchemaVersion) -> Option<&'static IntegrationRule> {
        self.rules.iter().find(|rule| rule.range.contains(&version))
    }

    /// Whether the layout at `version` is known
    pub fn supports(&self, version: SchemaVersion) -> bool {
        self.rule_for(version).is_some()
    }
}

/// Resolved table and row identity of a [`SettingsLocation`]
struct ResolvedTarget {
    table: &'static str,
    base: Filter,
    identity: [&'static str; 2],
    /// Column naming the context a row belongs to
    context: &'static str,
}

impl ResolvedTarget {
    fn resolve(location: SettingsLocation, ctx: &ScrubContext<'_>) -> Self {
        match location {
            SettingsLocation::PluginSettings(aliases) => Self {
                table: PLUGIN_SETTINGS,
                base: Filter::new().is_in("plugin_name", aliases.iter().copied()),
                identity: ["plugin_name", "context_id"],
                context: "context_id",
            },
            SettingsLocation::ContextSettings => Self {
                table: ctx.schema.context_settings_table(),
                base: Filter::new(),
                identity: [ctx.schema.context_id_column(), "locale"],
                context: ctx.schema.context_id_column(),
            },
        }
    }

    /// Filter addressing exactly the setting `name` of `row`
    fn row_filter(&self, row: &Row, name: &str) -> Filter {
        let mut filter = self.base.clone();
        for column in self.identity {
            filter = filter.eq_or_null(column, row.get(column).clone());
        }
        filter.eq("setting_name", name)
    }
}

/// Contexts among `rows` with no `name` setting
fn contexts_without(rows: &[Row], context: &str, name: &str) -> Vec<SqlValue> {
    let mut all: Vec<&SqlValue> = Vec::new();
    let mut with_name: Vec<&SqlValue> = Vec::new();
    for row in rows {
        let owner = row.get(context);
        if !all.contains(&owner) {
            all.push(owner);
        }
        if row.get_str("setting_name") == Some(name) && !with_name.contains(&owner) {
            with_name.push(owner);
        }
    }
    all.into_iter()
        .filter(|owner| !with_name.contains(owner))
        .cloned()
        .collect()
}

/// Scrubs the credentials of one [`Integration`]
pub struct IntegrationScrubber {
    integration: &'static Integration,
}

impl IntegrationScrubber {
    pub fn new(integration: &'static Integration) -> Self {
        Self { integration }
    }

    async fn apply(
        &self,
        store: &dyn TabularStore,
        target: &ResolvedTarget,
        keys: &ScrubTarget,
        generator: &mut dyn ValueGenerator,
    ) -> Result<ScrubStats> {
        let mut stats = ScrubStats::default();

        let replaced = keys.names(|action| matches!(action, KeyAction::Replace(_)));
        if !replaced.is_empty() {
            let mut columns = target.identity.to_vec();
            columns.push("setting_name");
            let rows = store
                .select(
                    target.table,
                    &columns,
                    &target.base.clone().is_in("setting_name", replaced),
                )
                .await?;

            for row in &rows {
                let Some(name) = row.get_str("setting_name") else {
                    continue;
                };
                let Some(KeyAction::Replace(credential)) = keys
                    .keys
                    .iter()
                    .find(|(key, _)| *key == name)
                    .map(|(_, action)| *action)
                else {
                    continue;
                };
                stats.rows_updated += store
                    .update(
                        target.table,
                        &target.row_filter(row, name),
                        &[Assignment::new("setting_value", credential.generate(generator))],
                    )
                    .await?;
            }
        }

        let fixed: Vec<(&str, &str)> = keys
            .keys
            .iter()
            .filter_map(|(name, action)| match action {
                KeyAction::Fixed(literal) => Some((*name, *literal)),
                _ => None,
            })
            .collect();
        if !fixed.is_empty() {
            let present = store
                .select(target.table, &[target.context, "setting_name"], &target.base)
                .await?;
            for (name, literal) in fixed {
                stats.rows_updated += store
                    .update(
                        target.table,
                        &target.base.clone().eq("setting_name", name),
                        &[Assignment::new("setting_value", literal)],
                    )
                    .await?;

                for context in contexts_without(&present, target.context, name) {
                    tracing::warn!(
                        integration = self.integration.name,
                        table = target.table,
                        context = %context,
                        setting = name,
                        forced = literal,
                        "No row to force; the live default stays in effect"
                    );
                    stats.flags_unset += 1;
                }
            }
        }

        let deleted = keys.names(|action| matches!(action, KeyAction::Delete));
        if !deleted.is_empty() {
            stats.rows_deleted += store
                .delete(target.table, &target.base.clone().is_in("setting_name", deleted))
                .await?;
        }

        Ok(stats)
    }
}

#[async_trait]
impl Scrubber for IntegrationScrubber {
    fn name(&self) -> &'static str {
        self.integration.name
    }

    async fn scrub(&self, ctx: &ScrubContext<'_>) -> Result<ScrubStats> {
        let version = ctx.version();
        let rule = self.integration.rule_for(version).ok_or_else(|| {
            AnonymizerError::UnsupportedIntegrationVersion {
                integration: self.integration.name.to_string(),
                version,
            }
        })?;

        let mut generator = ctx.factory.default_generator();
        let mut stats = ScrubStats::default();
        for keys in rule.targets {
            let target = ResolvedTarget::resolve(keys.location, ctx);
            let applied = self
                .apply(ctx.store, &target, keys, generator.as_mut())
                .await?;
            tracing::debug!(
                integration = self.integration.name,
                table = target.table,
                rows_updated = applied.rows_updated,
                rows_deleted = applied.rows_deleted,
                "Scrubbed integration settings"
            );
            stats += applied;
        }

        Ok(stats)
    }
}
