//! Sent email archive

use crate::anonymization::entities::chunk::row_key;
use crate::anonymization::report::ScrubStats;
use crate::anonymization::scrubber::{ScrubContext, Scrubber};
use crate::domain::values::{Assignment, Filter};
use crate::domain::Result;
use async_trait::async_trait;

const EMAIL_LOG: &str = "email_log";

/// Rewrites senders, recipients, subjects and bodies of logged emails
pub struct EmailLogScrubber;

#[async_trait]
impl Scrubber for EmailLogScrubber {
    fn name(&self) -> &'static str {
        "email-log"
    }

    async fn scrub(&self, ctx: &ScrubContext<'_>) -> Result<ScrubStats> {
        let mut generator = ctx.factory.default_generator();
        let mut stats = ScrubStats::default();

        let mut pager = ctx.pager(EMAIL_LOG, "log_id", Filter::new());
        while let Some(page) = pager.next_page().await? {
            for row in &page {
                let log_id = row_key(row, "log_id")?;
                let recipient = format!("{} <{}>", generator.full_name(), generator.email());
                let assignments = [
                    Assignment::new("from_address", generator.email()),
                    Assignment::new("recipients", recipient),
                    Assignment::new("cc_recipients", ""),
                    Assignment::new("bcc_recipients", ""),
                    Assignment::new("subject", generator.sentence()),
                    Assignment::new("body", generator.paragraph()),
                ];
                stats.rows_updated += ctx
                    .store
                    .update(EMAIL_LOG, &Filter::new().eq("log_id", log_id), &assignments)
                    .await?;
            }
        }

        Ok(stats)
    }
}
