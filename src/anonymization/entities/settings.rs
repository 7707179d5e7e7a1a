//! Versioned rewrites of EAV settings rows
//!
//! PKP stores localized entity attributes as `(owner_id, locale, setting_name,
//! setting_value)` rows. Each entity scrubber declares which setting names it
//! rewrites, per schema version range, as a table of [`FieldRule`]s. Only rows
//! that already exist are rewritten; a missing setting is not an error.

use crate::adapters::database::traits::TabularStore;
use crate::anonymization::locale::generator::ValueGenerator;
use crate::anonymization::locale::LocaleCatalog;
use crate::domain::values::{Assignment, Filter, SqlValue};
use crate::domain::{Result, SchemaVersion, VersionRange};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// An EAV settings table and the column pointing at its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingsTable {
    pub table: &'static str,
    pub owner_column: &'static str,
}

impl SettingsTable {
    pub const fn new(table: &'static str, owner_column: &'static str) -> Self {
        Self {
            table,
            owner_column,
        }
    }
}

/// Kind of replacement text for a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    GivenName,
    FamilyName,
    FullName,
    Sentence,
    /// 2 to 5 words
    Phrase,
    Paragraph,
    /// Placeholder external identifier
    Identifier,
    /// Same value as the named setting of the same owner and locale
    Mirror(&'static str),
}

impl TextKind {
    fn generate(self, generator: &mut dyn ValueGenerator) -> String {
        match self {
            TextKind::GivenName => generator.first_name(),
            TextKind::FamilyName => generator.last_name(),
            TextKind::FullName => generator.full_name(),
            TextKind::Sentence | TextKind::Mirror(_) => generator.sentence(),
            TextKind::Phrase => generator.phrase(),
            TextKind::Paragraph => generator.paragraph(),
            TextKind::Identifier => generator.identifier(),
        }
    }
}

/// Settings rewritten for one schema version range
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub range: VersionRange,
    pub fields: &'static [(&'static str, TextKind)],
}

/// Union of the fields of every rule whose range contains `version`,
/// in declaration order
pub fn fields_for(rules: &[FieldRule], version: SchemaVersion) -> Vec<(&'static str, TextKind)> {
    rules
        .iter()
        .filter(|rule| rule.range.contains(&version))
        .flat_map(|rule| rule.fields.iter().copied())
        .collect()
}

/// Rewrites the targeted settings of `owners`
///
/// Rows are grouped by owner and locale. Each group draws from the generator
/// bound to its locale, or from the default generator when the locale is
/// empty or `NULL`.
///
/// # Returns
///
/// Returns the number of settings rows updated.
///
/// # Errors
///
/// Returns an error if a read or write fails, or a row's locale was not
/// present when `catalog` was discovered.
pub async fn rewrite_settings(
    store: &dyn TabularStore,
    settings: SettingsTable,
    owners: &[i64],
    fields: &[(&'static str, TextKind)],
    catalog: &mut LocaleCatalog,
) -> Result<u64> {
    if owners.is_empty() || fields.is_empty() {
        return Ok(0);
    }

    let names: Vec<&str> = fields.iter().map(|(name, _)| *name).collect();
    let rows = store
        .select(
            settings.table,
            &[settings.owner_column, "locale", "setting_name"],
            &Filter::new()
                .is_in(settings.owner_column, owners.iter().copied())
                .is_in("setting_name", names),
        )
        .await?;

    let mut groups: BTreeMap<(i64, SqlValue), BTreeSet<String>> = BTreeMap::new();
    for row in &rows {
        let (Some(owner), Some(name)) = (row.get_i64(settings.owner_column), row.get_str("setting_name"))
        else {
            continue;
        };
        groups
            .entry((owner, row.get("locale").clone()))
            .or_default()
            .insert(name.to_string());
    }

    let mut writes = Vec::new();
    for ((owner, locale), present) in groups {
        let generator = catalog.generator(locale.as_str().unwrap_or_default())?;
        let mut generated: HashMap<&str, String> = HashMap::new();

        for &(name, kind) in fields {
            let value = match kind {
                TextKind::Mirror(source) => match generated.get(source) {
                    Some(value) => value.clone(),
                    None => kind.generate(generator),
                },
                _ => kind.generate(generator),
            };
            generated.insert(name, value.clone());
            if present.contains(name) {
                writes.push((owner, locale.clone(), name, value));
            }
        }
    }

    let mut updated = 0;
    for (owner, locale, name, value) in writes {
        let filter = Filter::new()
            .eq(settings.owner_column, owner)
            .eq_or_null("locale", locale)
            .eq("setting_name", name);
        updated += store
            .update(settings.table, &filter, &[Assignment::new("setting_value", value)])
            .await?;
    }

    tracing::debug!(
        table = settings.table,
        owners = owners.len(),
        updated,
        "Rewrote settings"
    );
    Ok(updated)
}
