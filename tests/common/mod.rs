//! Shared fixtures for integration tests
//!
//! [`ojs_store`] builds a small OJS installation on the in-memory store.
//! [`TaggingFactory`] produces deterministic values that carry the tag of
//! the generator that made them, so tests can tell which locale wrote what.

#![allow(dead_code)]

use pkp_anonymizer::adapters::memory::MemoryStore;
use pkp_anonymizer::anonymization::locale::generator::{GeneratorFactory, ValueGenerator};
use pkp_anonymizer::domain::Row;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub const USERS: i64 = 12;

/// One current core `versions` row
pub fn version_row(product: &str, version: [i64; 4]) -> Row {
    Row::new()
        .with("product", product)
        .with("product_type", "core")
        .with("current", 1)
        .with("major", version[0])
        .with("minor", version[1])
        .with("revision", version[2])
        .with("build", version[3])
}

pub fn setting(owner_column: &str, owner: i64, locale: &str, name: &str, value: &str) -> Row {
    Row::new()
        .with(owner_column, owner)
        .with("locale", locale)
        .with("setting_name", name)
        .with("setting_value", value)
}

pub fn plugin_setting(plugin: &str, context_id: i64, name: &str, value: &str) -> Row {
    Row::new()
        .with("plugin_name", plugin)
        .with("context_id", context_id)
        .with("setting_name", name)
        .with("setting_value", value)
}

/// An OJS installation at `version` with users, authors, publications,
/// reviews, logged email and integration settings
pub fn ojs_store(version: [i64; 4]) -> MemoryStore {
    let mut users = Vec::new();
    let mut user_settings = Vec::new();
    for id in 1..=USERS {
        users.push(
            Row::new()
                .with("user_id", id)
                .with("email", format!("person{id}@university.edu"))
                .with("username", format!("person{id}"))
                .with("password", "$2y$10$originalhash"),
        );
        user_settings.push(setting("user_id", id, "en_US", "givenName", "Ada"));
        user_settings.push(setting("user_id", id, "en_US", "familyName", "Lovelace"));
        user_settings.push(setting("user_id", id, "fr", "givenName", "Adèle"));
        user_settings.push(setting("user_id", id, "fr", "familyName", "Lefèvre"));
        user_settings.push(setting("user_id", id, "en_US", "affiliation", "Analytical Society"));
    }

    let authors = (1..=5)
        .map(|id| {
            Row::new()
                .with("author_id", id)
                .with("publication_id", 1)
                .with("email", format!("author{id}@university.edu"))
        })
        .collect();
    let author_settings = (1..=5)
        .flat_map(|id| {
            [
                setting("author_id", id, "en_US", "givenName", "Grace"),
                setting("author_id", id, "en_US", "familyName", "Hopper"),
                setting("author_id", id, "en_US", "affiliation", "Navy"),
            ]
        })
        .collect();

    MemoryStore::new()
        .with_table("versions", vec![version_row("ojs2", version)])
        .with_table("users", users)
        .with_unique("users", "email")
        .with_unique("users", "username")
        .with_table("user_settings", user_settings)
        .with_table("authors", authors)
        .with_table("author_settings", author_settings)
        .with_table("publications", vec![Row::new().with("publication_id", 1)])
        .with_table(
            "publication_settings",
            vec![
                setting("publication_id", 1, "en_US", "title", "On Computable Numbers"),
                setting("publication_id", 1, "en_US", "abstract", "We show that..."),
                setting("publication_id", 1, "en_US", "keywords", "computability"),
                setting("publication_id", 1, "", "pub-id::doi", "10.1234/abc"),
            ],
        )
        .with_table(
            "citations",
            vec![Row::new()
                .with("citation_id", 1)
                .with("publication_id", 1)
                .with("raw_citation", "Turing, A. On Computable Numbers.")],
        )
        .with_table("review_assignments", vec![Row::new().with("review_id", 1)])
        .with_table(
            "review_form_responses",
            vec![Row::new()
                .with("review_id", 1)
                .with("review_form_element_id", 1)
                .with("response_type", "string")
                .with("response_value", "Reviewer is Dr. Smith")],
        )
        .with_table(
            "submission_comments",
            vec![Row::new()
                .with("comment_id", 1)
                .with("comment_title", "Re: revisions")
                .with("comments", "Thanks, Smith")],
        )
        .with_table(
            "email_log",
            vec![Row::new()
                .with("log_id", 1)
                .with("from_address", "editor@university.edu")
                .with("recipients", "Ada Lovelace <person1@university.edu>")
                .with("cc_recipients", "")
                .with("bcc_recipients", "")
                .with("subject", "Decision")
                .with("body", "Dear Ada")],
        )
        .with_table(
            "plugin_settings",
            vec![
                plugin_setting("crossrefexportplugin", 1, "username", "realdepositor"),
                plugin_setting("crossrefexportplugin", 1, "password", "realpass"),
                plugin_setting("crossrefexportplugin", 1, "testMode", "0"),
                plugin_setting("doajexportplugin", 1, "apiKey", "doaj-real-key"),
                plugin_setting("doajexportplugin", 1, "testMode", "0"),
                plugin_setting("porticoexportplugin", 1, "porticoHost", "ftp.portico.org"),
                plugin_setting("porticoexportplugin", 1, "porticoUsername", "journal"),
                plugin_setting("porticoexportplugin", 1, "porticoPassword", "secret"),
                plugin_setting("porticoexportplugin", 1, "enabled", "1"),
                plugin_setting("orcidprofileplugin", 1, "orcidClientId", "APP-REAL"),
                plugin_setting("orcidprofileplugin", 1, "orcidClientSecret", "real-secret"),
                plugin_setting("orcidprofileplugin", 1, "orcidProfileAPIPath", "https://api.orcid.org/"),
                plugin_setting("orcidprofileplugin", 1, "isSandBox", "0"),
            ],
        )
        .with_table(
            "journal_settings",
            vec![
                setting("journal_id", 1, "", "orcidClientId", "APP-CORE"),
                setting("journal_id", 1, "", "orcidClientSecret", "core-secret"),
                setting("journal_id", 1, "", "orcidApiUrl", "https://api.orcid.org/"),
                setting("journal_id", 1, "", "orcidApiType", "memberProduction"),
                setting("journal_id", 1, "en_US", "name", "Journal of Computing"),
            ],
        )
}

/// Value of `name` for `owner` in `rows`
pub fn setting_value<'r>(
    rows: &'r [Row],
    owner_column: &str,
    owner: i64,
    locale: &str,
    name: &str,
) -> Option<&'r str> {
    rows.iter()
        .find(|r| {
            r.get_i64(owner_column) == Some(owner)
                && r.get_str("locale") == Some(locale)
                && r.get_str("setting_name") == Some(name)
        })
        .and_then(|r| r.get_str("setting_value"))
}

/// Deterministic generators whose text starts with their tag
///
/// Emails come from a shared counter, so they never repeat. Emails queued
/// with [`TaggingFactory::with_scripted_emails`] are handed out first.
#[derive(Clone)]
pub struct TaggingFactory {
    tags: Vec<&'static str>,
    counter: Arc<AtomicU64>,
    scripted: Arc<Mutex<VecDeque<String>>>,
}

impl TaggingFactory {
    pub fn new(tags: &[&'static str]) -> Self {
        Self {
            tags: tags.to_vec(),
            counter: Arc::new(AtomicU64::new(0)),
            scripted: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Factory knowing `en_US` and `fr_FR`
    pub fn en_fr() -> Self {
        Self::new(&["en_US", "fr_FR"])
    }

    pub fn with_scripted_emails(self, emails: &[&str]) -> Self {
        self.scripted
            .lock()
            .unwrap()
            .extend(emails.iter().map(|e| e.to_string()));
        self
    }

    fn build(&self, tag: &'static str) -> Box<dyn ValueGenerator> {
        Box::new(TaggingGenerator {
            tag,
            counter: Arc::clone(&self.counter),
            scripted: Arc::clone(&self.scripted),
        })
    }
}

impl GeneratorFactory for TaggingFactory {
    fn generator(&self, tag: &str) -> Option<Box<dyn ValueGenerator>> {
        self.tags
            .iter()
            .copied()
            .find(|known| *known == tag)
            .map(|known| self.build(known))
    }

    fn default_generator(&self) -> Box<dyn ValueGenerator> {
        self.build("en_US")
    }
}

pub struct TaggingGenerator {
    tag: &'static str,
    counter: Arc<AtomicU64>,
    scripted: Arc<Mutex<VecDeque<String>>>,
}

impl TaggingGenerator {
    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn text(&self, kind: &str) -> String {
        format!("{} {} {}", self.tag, kind, self.next())
    }
}

impl ValueGenerator for TaggingGenerator {
    fn locale_tag(&self) -> &str {
        self.tag
    }

    fn first_name(&mut self) -> String {
        self.text("given")
    }

    fn last_name(&mut self) -> String {
        self.text("family")
    }

    fn email(&mut self) -> String {
        if let Some(email) = self.scripted.lock().unwrap().pop_front() {
            return email;
        }
        format!("synthetic{}@example.test", self.next())
    }

    fn sentence(&mut self) -> String {
        self.text("sentence")
    }

    fn paragraph(&mut self) -> String {
        self.text("paragraph")
    }

    fn phrase(&mut self) -> String {
        format!("{} phrase", self.tag)
    }

    fn password(&mut self) -> String {
        format!("pw{}", self.next())
    }

    fn token(&mut self) -> String {
        format!("{:032x}", self.next())
    }

    fn identifier(&mut self) -> String {
        format!("https://orcid.org/0000-0000-0000-{:04}", self.next() % 10_000)
    }
}
