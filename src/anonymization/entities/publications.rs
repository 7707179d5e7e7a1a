//! Publication metadata and citations

use super::settings::{fields_for, rewrite_settings, FieldRule, SettingsTable, TextKind};
use crate::anonymization::entities::chunk::row_key;
use crate::anonymization::report::ScrubStats;
use crate::anonymization::scrubber::{ScrubContext, Scrubber};
use crate::domain::values::{Assignment, Filter};
use crate::domain::{Result, SchemaVersion, VersionRange};
use async_trait::async_trait;

const PUBLICATIONS: &str = "publications";
const CITATIONS: &str = "citations";
const PUBLICATION_SETTINGS: SettingsTable =
    SettingsTable::new("publication_settings", "publication_id");

const PUBLICATION_FIELDS: &[FieldRule] = &[
    FieldRule {
        range: VersionRange::since(SchemaVersion::new(3, 0, 0, 0)),
        fields: &[
            ("title", TextKind::Sentence),
            ("subtitle", TextKind::Phrase),
            ("abstract", TextKind::Paragraph),
        ],
    },
    FieldRule {
        range: VersionRange::since(SchemaVersion::new(3, 4, 0, 0)),
        fields: &[("cleanTitle", TextKind::Mirror("title"))],
    },
];

/// Replaces titles, subtitles, abstracts and raw citations
///
/// Keywords, subjects and other publication settings are left as they are.
pub struct PublicationScrubber;

#[async_trait]
impl Scrubber for PublicationScrubber {
    fn name(&self) -> &'static str {
        "publications"
    }

    async fn scrub(&self, ctx: &ScrubContext<'_>) -> Result<ScrubStats> {
        let store = ctx.store;
        let fields = fields_for(PUBLICATION_FIELDS, ctx.version());
        let mut catalog = ctx.catalog(PUBLICATION_SETTINGS.table).await?;

        let mut ids = store
            .select(PUBLICATIONS, &["publication_id"], &Filter::new())
            .await?
            .iter()
            .map(|row| row_key(row, "publication_id"))
            .collect::<Result<Vec<_>>>()?;
        ids.sort_unstable();

        let mut stats = ScrubStats::default();
        for batch in ids.chunks(ctx.batch_size.max(1)) {
            stats.rows_updated +=
                rewrite_settings(store, PUBLICATION_SETTINGS, batch, &fields, &mut catalog).await?;
        }

        let mut pager = ctx.pager(CITATIONS, "citation_id", Filter::new());
        while let Some(page) = pager.next_page().await? {
            for row in &page {
                let citation_id = row_key(row, "citation_id")?;
                let generator = catalog.default_generator();
                let citation = format!(
                    "{}, {}. {}",
                    generator.last_name(),
                    generator.first_name(),
                    generator.sentence()
                );
                stats.rows_updated += store
                    .update(
                        CITATIONS,
                        &Filter::new().eq("citation_id", citation_id),
                        &[Assignment::new("raw_citation", citation)],
                    )
                    .await?;
            }
        }

        Ok(stats)
    }
}
