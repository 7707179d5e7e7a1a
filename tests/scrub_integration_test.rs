//! End-to-end scrub runs against an in-memory OJS installation

mod common;

use common::{ojs_store, setting_value, version_row, TaggingFactory, USERS};
use pkp_anonymizer::adapters::memory::MemoryStore;
use pkp_anonymizer::anonymization::{
    Anonymizer, EngineSettings, Operation, OperationStatus, RunReport,
};
use pkp_anonymizer::domain::{AnonymizerError, Product, Row, SchemaVersion};
use std::collections::HashSet;
use std::sync::Arc;

async fn anonymizer(store: &Arc<MemoryStore>) -> Result<Anonymizer, AnonymizerError> {
    Anonymizer::new(
        store.clone(),
        Arc::new(TaggingFactory::en_fr()),
        EngineSettings::default(),
    )
    .await
}

async fn full_run(version: [i64; 4]) -> (Arc<MemoryStore>, RunReport) {
    let store = Arc::new(ojs_store(version));
    let anonymizer = anonymizer(&store).await.unwrap();
    let report = anonymizer.run(&Operation::default_plan(), false).await;
    (store, report)
}

#[tokio::test]
async fn test_detects_product_and_version() {
    let store = Arc::new(ojs_store([3, 3, 0, 14]));
    let anonymizer = anonymizer(&store).await.unwrap();

    assert_eq!(anonymizer.schema().product(), Product::Ojs);
    assert_eq!(anonymizer.schema().version(), SchemaVersion::new(3, 3, 0, 14));
    assert_eq!(anonymizer.schema().context_settings_table(), "journal_settings");
}

#[tokio::test]
async fn test_version_below_minimum_is_rejected_before_any_write() {
    let store = Arc::new(ojs_store([2, 4, 8, 5]));

    let Err(err) = anonymizer(&store).await else {
        panic!("2.4.8.5 must be rejected");
    };
    assert!(matches!(err, AnonymizerError::UnsupportedVersion { .. }));
    assert!(err.is_precondition());
    assert_eq!(store.mutations(), 0);
}

#[tokio::test]
async fn test_two_current_versions_are_ambiguous() {
    let store = Arc::new(
        MemoryStore::new().with_table(
            "versions",
            vec![
                version_row("ojs2", [3, 3, 0, 0]),
                version_row("ojs2", [3, 4, 0, 0]),
            ],
        ),
    );

    let Err(err) = anonymizer(&store).await else {
        panic!("two current rows must be rejected");
    };
    assert!(matches!(err, AnonymizerError::AmbiguousVersion { count: 2 }));
}

#[tokio::test]
async fn test_missing_current_version_is_ambiguous() {
    let store = Arc::new(MemoryStore::new().with_table(
        "versions",
        vec![version_row("ojs2", [3, 3, 0, 0]).with("current", 0)],
    ));

    let Err(err) = anonymizer(&store).await else {
        panic!("no current row must be rejected");
    };
    assert!(matches!(err, AnonymizerError::AmbiguousVersion { count: 0 }));
}

#[tokio::test]
async fn test_plugin_version_rows_are_ignored() {
    let plugin_row = Row::new()
        .with("product", "crossref")
        .with("product_type", "plugins.importexport")
        .with("current", 1)
        .with("major", 1)
        .with("minor", 0)
        .with("revision", 0)
        .with("build", 0);
    let store = Arc::new(ojs_store([3, 4, 0, 3]));
    store.insert("versions", plugin_row).await;

    let anonymizer = anonymizer(&store).await.unwrap();
    assert_eq!(anonymizer.schema().version(), SchemaVersion::new(3, 4, 0, 3));
}

#[tokio::test]
async fn test_full_plan_completes() {
    let (_, report) = full_run([3, 4, 0, 0]).await;

    assert!(report.is_successful(), "{report:?}");
    assert_eq!(report.outcomes.len(), Operation::ALL.len());
    assert_eq!(report.product, Product::Ojs);
    assert_eq!(report.version, "3.4.0.0");
    assert!(report.totals().rows_updated > 0);
}

#[tokio::test]
async fn test_user_identities_are_unique_and_fresh() {
    let (store, _) = full_run([3, 4, 0, 0]).await;
    let users = store.rows("users").await;

    let emails: HashSet<_> = users.iter().filter_map(|r| r.get_str("email")).collect();
    let usernames: HashSet<_> = users.iter().filter_map(|r| r.get_str("username")).collect();
    assert_eq!(emails.len(), USERS as usize);
    assert_eq!(usernames.len(), USERS as usize);

    for id in 1..=USERS {
        assert!(!emails.contains(format!("person{id}@university.edu").as_str()));
        assert!(!usernames.contains(format!("person{id}").as_str()));
    }
    for user in &users {
        let email = user.get_str("email").unwrap();
        let username = user.get_str("username").unwrap();
        assert_eq!(email.split('@').next(), Some(username));
    }
}

#[tokio::test]
async fn test_author_emails_avoid_user_emails() {
    let (store, _) = full_run([3, 4, 0, 0]).await;

    let user_emails: HashSet<String> = store
        .rows("users")
        .await
        .iter()
        .filter_map(|r| r.get_str("email").map(str::to_lowercase))
        .collect();
    for author in store.rows("authors").await {
        let email = author.get_str("email").unwrap();
        assert!(!email.ends_with("@university.edu"));
        assert!(!user_emails.contains(&email.to_lowercase()));
    }
}

#[tokio::test]
async fn test_settings_keep_their_locale() {
    let (store, _) = full_run([3, 4, 0, 0]).await;
    let settings = store.rows("user_settings").await;

    for id in 1..=USERS {
        let fr = setting_value(&settings, "user_id", id, "fr", "givenName").unwrap();
        let en = setting_value(&settings, "user_id", id, "en_US", "familyName").unwrap();
        assert!(fr.starts_with("fr_FR "), "{fr}");
        assert!(en.starts_with("en_US "), "{en}");
    }
    // No row is created for a setting the user never had
    assert_eq!(settings.len(), USERS as usize * 5);
}

#[tokio::test]
async fn test_unlisted_settings_are_untouched() {
    let (store, _) = full_run([3, 4, 0, 0]).await;

    let users = store.rows("user_settings").await;
    assert_eq!(
        setting_value(&users, "user_id", 1, "en_US", "affiliation"),
        Some("Analytical Society")
    );

    let authors = store.rows("author_settings").await;
    assert_eq!(
        setting_value(&authors, "author_id", 2, "en_US", "affiliation"),
        Some("Navy")
    );
    assert_ne!(
        setting_value(&authors, "author_id", 2, "en_US", "familyName"),
        Some("Hopper")
    );

    let publications = store.rows("publication_settings").await;
    assert_eq!(
        setting_value(&publications, "publication_id", 1, "en_US", "keywords"),
        Some("computability")
    );
    assert_eq!(
        setting_value(&publications, "publication_id", 1, "", "pub-id::doi"),
        Some("10.1234/abc")
    );
    assert_ne!(
        setting_value(&publications, "publication_id", 1, "en_US", "title"),
        Some("On Computable Numbers")
    );
}

#[tokio::test]
async fn test_free_text_is_replaced() {
    let (store, _) = full_run([3, 2, 1, 0]).await;

    let responses = store.rows("review_form_responses").await;
    assert_ne!(
        responses[0].get_str("response_value"),
        Some("Reviewer is Dr. Smith")
    );

    let comments = store.rows("submission_comments").await;
    assert_ne!(comments[0].get_str("comments"), Some("Thanks, Smith"));

    let log = store.rows("email_log").await;
    assert_ne!(log[0].get_str("from_address"), Some("editor@university.edu"));
    assert!(!log[0].get_str("recipients").unwrap().contains("person1"));

    let citations = store.rows("citations").await;
    assert!(!citations[0].get_str("raw_citation").unwrap().contains("Turing"));
}

#[tokio::test]
async fn test_failure_stops_run_and_skips_the_rest() {
    let store = Arc::new(ojs_store([3, 6, 0, 0]));
    let anonymizer = anonymizer(&store).await.unwrap();

    let report = anonymizer
        .run(&[Operation::Users, Operation::Orcid, Operation::EmailLog], false)
        .await;

    let statuses: Vec<_> = report.outcomes.iter().map(|o| o.status).collect();
    assert_eq!(
        statuses,
        vec![
            OperationStatus::Completed,
            OperationStatus::Failed,
            OperationStatus::Skipped
        ]
    );
    // Users stays scrubbed after the later failure
    let users = store.rows("users").await;
    assert!(users
        .iter()
        .all(|r| !r.get_str("email").unwrap().ends_with("@university.edu")));
    let log = store.rows("email_log").await;
    assert_eq!(log[0].get_str("subject"), Some("Decision"));
}

#[tokio::test]
async fn test_continue_on_error_runs_every_operation() {
    let store = Arc::new(ojs_store([3, 6, 0, 0]));
    let anonymizer = anonymizer(&store).await.unwrap();

    let report = anonymizer
        .run(&[Operation::Orcid, Operation::EmailLog], true)
        .await;

    assert_eq!(report.count(OperationStatus::Failed), 1);
    assert_eq!(report.count(OperationStatus::Completed), 1);
    assert!(report.outcomes[0]
        .error
        .as_deref()
        .unwrap()
        .contains("orcid"));
}

#[tokio::test]
async fn test_report_is_written_as_json() {
    let (_, report) = full_run([3, 4, 0, 0]).await;
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("report.json");

    report.write_json(&path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["product"], "ojs");
    assert_eq!(json["outcomes"][0]["operation"], "users");
    assert_eq!(json["outcomes"][0]["status"], "completed");
}
