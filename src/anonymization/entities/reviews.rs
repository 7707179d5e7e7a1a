//! Review form responses and submission comments

use crate::anonymization::entities::chunk::row_key;
use crate::anonymization::report::ScrubStats;
use crate::anonymization::scrubber::{ScrubContext, Scrubber};
use crate::domain::values::{Assignment, Filter, SqlValue};
use crate::domain::Result;
use async_trait::async_trait;

const REVIEW_ASSIGNMENTS: &str = "review_assignments";
const REVIEW_FORM_RESPONSES: &str = "review_form_responses";
const SUBMISSION_COMMENTS: &str = "submission_comments";

/// Free-text review form responses are regenerated; every other response,
/// including one with no recorded type, is cleared
const FREE_TEXT_RESPONSE: &str = "string";

/// Replaces reviewer responses and editorial comments
pub struct ReviewScrubber;

#[async_trait]
impl Scrubber for ReviewScrubber {
    fn name(&self) -> &'static str {
        "reviews"
    }

    async fn scrub(&self, ctx: &ScrubContext<'_>) -> Result<ScrubStats> {
        let store = ctx.store;
        let mut generator = ctx.factory.default_generator();
        let mut stats = ScrubStats::default();

        let mut assignments = ctx.pager(REVIEW_ASSIGNMENTS, "review_id", Filter::new());
        while let Some(page) = assignments.next_page().await? {
            let review_ids = page
                .iter()
                .map(|row| row_key(row, "review_id"))
                .collect::<Result<Vec<_>>>()?;

            let responses = store
                .select(
                    REVIEW_FORM_RESPONSES,
                    &["review_id", "review_form_element_id"],
                    &Filter::new()
                        .is_in("review_id", review_ids.iter().copied())
                        .eq("response_type", FREE_TEXT_RESPONSE),
                )
                .await?;
            for response in &responses {
                let filter = Filter::new()
                    .eq("review_id", response.get("review_id").clone())
                    .eq("review_form_element_id", response.get("review_form_element_id").clone());
                stats.rows_updated += store
                    .update(
                        REVIEW_FORM_RESPONSES,
                        &filter,
                        &[Assignment::new("response_value", generator.paragraph())],
                    )
                    .await?;
            }

            // `<>` never matches a NULL type, so untyped responses need their own pass.
            let structured = [
                Filter::new()
                    .is_in("review_id", review_ids.iter().copied())
                    .not_eq("response_type", FREE_TEXT_RESPONSE),
                Filter::new()
                    .is_in("review_id", review_ids.iter().copied())
                    .is_null("response_type"),
            ];
            for filter in &structured {
                stats.rows_updated += store
                    .update(
                        REVIEW_FORM_RESPONSES,
                        filter,
                        &[Assignment::new("response_value", SqlValue::Null)],
                    )
                    .await?;
            }
        }

        let mut comments = ctx.pager(SUBMISSION_COMMENTS, "comment_id", Filter::new());
        while let Some(page) = comments.next_page().await? {
            for row in &page {
                let comment_id = row_key(row, "comment_id")?;
                stats.rows_updated += store
                    .update(
                        SUBMISSION_COMMENTS,
                        &Filter::new().eq("comment_id", comment_id),
                        &[
                            Assignment::new("comment_title", generator.sentence()),
                            Assignment::new("comments", generator.paragraph()),
                        ],
                    )
                    .await?;
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::anonymization::identity::CollisionStrategy;
    use crate::anonymization::locale::{FakerFactory, LocaleOverrides};
    use crate::anonymization::schema::SchemaInspector;
    use crate::domain::values::Row;
    use crate::domain::{Product, SchemaVersion};

    fn response(review_id: i64, element: i64, kind: &str, value: &str) -> Row {
        Row::new()
            .with("review_id", review_id)
            .with("review_form_element_id", element)
            .with("response_type", kind)
            .with("response_value", value)
    }

    #[tokio::test]
    async fn test_responses_and_comments() {
        let store = MemoryStore::new()
            .with_table(
                "review_assignments",
                (1..=3).map(|id| Row::new().with("review_id", id)).collect(),
            )
            .with_table(
                "review_form_responses",
                vec![
                    response(1, 10, "string", "The method is flawed"),
                    response(1, 11, "int", "2"),
                    response(2, 10, "string", "Accept"),
                    response(9, 10, "string", "Orphaned response"),
                    response(2, 12, "string", "Secret reviewer opinion")
                        .with("response_type", SqlValue::Null),
                ],
            )
            .with_table(
                "submission_comments",
                vec![Row::new()
                    .with("comment_id", 4)
                    .with("comment_title", "Re: decision")
                    .with("comments", "Private note")],
            );

        let schema = SchemaInspector::from_parts(Product::Ojs, SchemaVersion::new(3, 3, 0, 0)).unwrap();
        let factory = FakerFactory::seeded(1);
        let overrides = LocaleOverrides::default();
        let ctx = ScrubContext {
            store: &store,
            schema: &schema,
            factory: &factory,
            overrides: &overrides,
            batch_size: 2,
            strategy: CollisionStrategy::default(),
        };

        let stats = ReviewScrubber.scrub(&ctx).await.unwrap();
        assert_eq!(stats.rows_updated, 5);

        let responses = store.rows("review_form_responses").await;
        assert_ne!(responses[0].get_str("response_value"), Some("The method is flawed"));
        assert!(responses[1].get("response_value").is_null());
        assert_ne!(responses[2].get_str("response_value"), Some("Accept"));
        // Not attached to any review assignment
        assert_eq!(responses[3].get_str("response_value"), Some("Orphaned response"));
        // A response with no type is cleared like a structured one
        assert!(responses[4].get("response_value").is_null());

        let comments = store.rows("submission_comments").await;
        assert_ne!(comments[0].get_str("comments"), Some("Private note"));
        assert_ne!(comments[0].get_str("comment_title"), Some("Re: decision"));
    }
}
