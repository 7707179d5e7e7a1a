//! User accounts

use super::settings::{fields_for, rewrite_settings, FieldRule, SettingsTable, TextKind};
use crate::adapters::database::traits::TabularStore;
use crate::anonymization::entities::chunk::row_key;
use crate::anonymization::identity::{Candidate, IdentityDomain, IdentityPool};
use crate::anonymization::report::ScrubStats;
use crate::anonymization::scrubber::{ScrubContext, Scrubber};
use crate::domain::values::{Assignment, Filter};
use crate::domain::{Result, SchemaVersion, VersionRange};
use async_trait::async_trait;
use futures::FutureExt;
use sha1::{Digest, Sha1};

const USERS: &str = "users";
const USER_SETTINGS: SettingsTable = SettingsTable::new("user_settings", "user_id");

const USER_FIELDS: &[FieldRule] = &[
    FieldRule {
        range: VersionRange::since(SchemaVersion::new(3, 0, 0, 0)),
        fields: &[
            ("givenName", TextKind::GivenName),
            ("familyName", TextKind::FamilyName),
            ("biography", TextKind::Paragraph),
            ("signature", TextKind::Sentence),
            ("orcid", TextKind::Identifier),
        ],
    },
    FieldRule {
        range: VersionRange::since(SchemaVersion::new(3, 2, 0, 0)),
        fields: &[("preferredPublicName", TextKind::FullName)],
    },
];

/// Replaces every user's email, username, password and personal settings
///
/// Emails and usernames are unique across the run and never reuse a value
/// that existed before it. The username is the local part of the email.
pub struct UserScrubber;

#[async_trait]
impl Scrubber for UserScrubber {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn scrub(&self, ctx: &ScrubContext<'_>) -> Result<ScrubStats> {
        let store = ctx.store;
        let fields = fields_for(USER_FIELDS, ctx.version());
        let mut catalog = ctx.catalog(USER_SETTINGS.table).await?;
        let mut pool = IdentityPool::preload(
            store,
            USERS,
            &[
                (IdentityDomain::Email, "email"),
                (IdentityDomain::Username, "username"),
            ],
            ctx.strategy,
        )
        .await?;

        let mut stats = ScrubStats::default();
        let mut pager = ctx.pager(USERS, "user_id", Filter::new());
        while let Some(page) = pager.next_page().await? {
            let mut owners = Vec::with_capacity(page.len());
            for row in &page {
                let user_id = row_key(row, "user_id")?;
                let generator = catalog.default_generator();
                pool.reserve(
                    || {
                        let email = generator.email();
                        let username = local_part(&email).to_string();
                        Candidate::new()
                            .with(IdentityDomain::Email, email)
                            .with(IdentityDomain::Username, username)
                    },
                    |candidate| write_identity(store, user_id, candidate).boxed(),
                )
                .await?;
                stats.rows_updated += 1;
                owners.push(user_id);
            }
            stats.rows_updated +=
                rewrite_settings(store, USER_SETTINGS, &owners, &fields, &mut catalog).await?;
        }

        Ok(stats)
    }
}

fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}

/// Legacy PKP password hash for `username` whose password is the username
///
/// PKP's oldest hashing scheme is SHA-1 over username followed by password,
/// and existing installs still accept it at login.
pub fn legacy_password(username: &str) -> String {
    format!("{:x}", Sha1::digest(format!("{username}{username}").as_bytes()))
}

async fn write_identity(store: &dyn TabularStore, user_id: i64, candidate: Candidate) -> Result<()> {
    let email = candidate.get(IdentityDomain::Email).unwrap_or_default();
    let username = candidate.get(IdentityDomain::Username).unwrap_or_default();

    store
        .update(
            USERS,
            &Filter::new().eq("user_id", user_id),
            &[
                Assignment::new("email", email),
                Assignment::new("username", username),
                Assignment::new("password", legacy_password(username)),
            ],
        )
        .await?;
    Ok(())
}
