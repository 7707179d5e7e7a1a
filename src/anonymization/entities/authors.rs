//! Submission authors

use super::settings::{fields_for, rewrite_settings, FieldRule, SettingsTable, TextKind};
use crate::anonymization::entities::chunk::row_key;
use crate::anonymization::identity::{IdentityDomain, IdentityPool};
use crate::anonymization::report::ScrubStats;
use crate::anonymization::scrubber::{ScrubContext, Scrubber};
use crate::domain::values::{Assignment, Filter};
use crate::domain::{Result, SchemaVersion, VersionRange};
use async_trait::async_trait;

const AUTHORS: &str = "authors";
const AUTHOR_SETTINGS: SettingsTable = SettingsTable::new("author_settings", "author_id");

const AUTHOR_FIELDS: &[FieldRule] = &[FieldRule {
    range: VersionRange::since(SchemaVersion::new(3, 0, 0, 0)),
    fields: &[
        ("givenName", TextKind::GivenName),
        ("familyName", TextKind::FamilyName),
    ],
}];

/// Replaces author emails and names
///
/// Author emails only have to avoid the emails of registered users; two
/// authors may end up sharing one.
pub struct AuthorScrubber;

#[async_trait]
impl Scrubber for AuthorScrubber {
    fn name(&self) -> &'static str {
        "authors"
    }

    async fn scrub(&self, ctx: &ScrubContext<'_>) -> Result<ScrubStats> {
        let store = ctx.store;
        let fields = fields_for(AUTHOR_FIELDS, ctx.version());
        let mut catalog = ctx.catalog(AUTHOR_SETTINGS.table).await?;
        let pool = IdentityPool::preload(
            store,
            "users",
            &[(IdentityDomain::Email, "email")],
            ctx.strategy,
        )
        .await?;

        let mut ids = store
            .select(AUTHORS, &["author_id"], &Filter::new())
            .await?
            .iter()
            .map(|row| row_key(row, "author_id"))
            .collect::<Result<Vec<_>>>()?;
        ids.sort_unstable();

        let mut stats = ScrubStats::default();
        for batch in ids.chunks(ctx.batch_size.max(1)) {
            for &author_id in batch {
                let generator = catalog.default_generator();
                let email = pool.generate_avoiding(IdentityDomain::Email, || generator.email());
                stats.rows_updated += store
                    .update(
                        AUTHORS,
                        &Filter::new().eq("author_id", author_id),
                        &[Assignment::new("email", email)],
                    )
                    .await?;
            }
            stats.rows_updated +=
                rewrite_settings(store, AUTHOR_SETTINGS, batch, &fields, &mut catalog).await?;
            crate::log_batch_processing!(AUTHORS, batch.len(), batch.last());
        }

        Ok(stats)
    }
}
