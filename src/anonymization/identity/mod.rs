//! Collision-free identity values
//!
//! The [`IdentityPool`] remembers every email and username observed in the
//! store when it was created plus every value it handed out since. A value is
//! never handed out twice within a domain during a run, and never equals a
//! value that existed before the run.
//!
//! Two collision strategies are supported:
//!
//! - [`CollisionStrategy::WriteAndRetry`] writes optimistically and treats a
//!   store uniqueness violation as "try another candidate". It stays correct
//!   when something else writes to the same table during the run.
//! - [`CollisionStrategy::PreCheck`] trusts the in-memory pool alone. It is
//!   faster to reason about but unsafe if other writers touch the table
//!   concurrently, since their values are invisible to the pool.
//!
//! Neither strategy caps the number of attempts.

use crate::adapters::database::traits::TabularStore;
use crate::domain::values::Filter;
use crate::domain::{AnonymizerError, Result};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// How reserved values are protected against uniqueness conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionStrategy {
    /// Write first, retry with a fresh candidate on a uniqueness violation
    #[default]
    WriteAndRetry,
    /// Reject candidates in memory before writing
    PreCheck,
}

impl fmt::Display for CollisionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionStrategy::WriteAndRetry => write!(f, "write_and_retry"),
            CollisionStrategy::PreCheck => write!(f, "pre_check"),
        }
    }
}

impl FromStr for CollisionStrategy {
    type Err = AnonymizerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "write_and_retry" => Ok(CollisionStrategy::WriteAndRetry),
            "pre_check" => Ok(CollisionStrategy::PreCheck),
            other => Err(AnonymizerError::Configuration(format!(
                "Invalid collision strategy '{other}'. Must be one of: write_and_retry, pre_check"
            ))),
        }
    }
}

/// Uniqueness domain of an identity value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IdentityDomain {
    Email,
    Username,
}

impl IdentityDomain {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityDomain::Email => "email",
            IdentityDomain::Username => "username",
        }
    }
}

impl fmt::Display for IdentityDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pool keys are case-insensitive, matching the collation PKP installs use
fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// A set of related values reserved together, e.g. an email and the
/// username derived from it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    parts: Vec<(IdentityDomain, String)>,
}

impl Candidate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style part setter
    pub fn with(mut self, domain: IdentityDomain, value: impl Into<String>) -> Self {
        self.parts.push((domain, value.into()));
        self
    }

    /// Value of `domain`, if the candidate carries one
    pub fn get(&self, domain: IdentityDomain) -> Option<&str> {
        self.parts
            .iter()
            .find(|(d, _)| *d == domain)
            .map(|(_, v)| v.as_str())
    }

    fn domains(&self) -> String {
        self.parts
            .iter()
            .map(|(d, _)| d.as_str())
            .collect::<Vec<_>>()
            .join("+")
    }
}

/// Used values per uniqueness domain
#[derive(Debug, Default)]
pub struct IdentityPool {
    used: HashMap<IdentityDomain, HashSet<String>>,
    strategy: CollisionStrategy,
}

impl IdentityPool {
    /// Empty pool
    pub fn new(strategy: CollisionStrategy) -> Self {
        Self {
            used: HashMap::new(),
            strategy,
        }
    }

    /// Pool seeded with the existing values of `table`
    ///
    /// # Arguments
    ///
    /// * `store` - Store to read from
    /// * `table` - Table holding the identity columns
    /// * `columns` - Domain and column pairs to preload
    /// * `strategy` - Collision strategy for [`IdentityPool::reserve`]
    pub async fn preload(
        store: &dyn TabularStore,
        table: &str,
        columns: &[(IdentityDomain, &str)],
        strategy: CollisionStrategy,
    ) -> Result<Self> {
        let mut pool = Self::new(strategy);
        for (domain, column) in columns {
            let rows = store.select_distinct(table, column, &Filter::new()).await?;
            pool.seed(
                *domain,
                rows.iter().filter_map(|row| row.get_str(column)),
            );
            tracing::debug!(
                table = %table,
                domain = %domain,
                preloaded = pool.len(*domain),
                "Preloaded identity pool"
            );
        }
        Ok(pool)
    }

    /// Marks `values` as used
    pub fn seed<'v>(&mut self, domain: IdentityDomain, values: impl IntoIterator<Item = &'v str>) {
        let set = self.used.entry(domain).or_default();
        set.extend(values.into_iter().map(normalize));
    }

    /// Whether `value` is already used in `domain`
    pub fn contains(&self, domain: IdentityDomain, value: &str) -> bool {
        self.used
            .get(&domain)
            .is_some_and(|set| set.contains(&normalize(value)))
    }

    /// Number of used values in `domain`
    pub fn len(&self, domain: IdentityDomain) -> usize {
        self.used.get(&domain).map_or(0, HashSet::len)
    }

    /// Whether no value is used in any domain
    pub fn is_empty(&self) -> bool {
        self.used.values().all(HashSet::is_empty)
    }

    pub fn strategy(&self) -> CollisionStrategy {
        self.strategy
    }

    /// Every part of the candidate must be free
    fn is_free(&self, candidate: &Candidate) -> bool {
        candidate
            .parts
            .iter()
            .all(|(domain, value)| !self.contains(*domain, value))
    }

    fn claim(&mut self, candidate: &Candidate) {
        for (domain, value) in &candidate.parts {
            self.used.entry(*domain).or_default().insert(normalize(value));
        }
    }

    /// Reserves a candidate and writes it to the store
    ///
    /// `candidate_fn` is called until it yields a candidate whose parts are
    /// all free. `write_fn` persists the candidate. Under
    /// [`CollisionStrategy::WriteAndRetry`], a uniqueness violation returned
    /// by `write_fn` discards the candidate and the loop continues.
    ///
    /// # Errors
    ///
    /// Returns any error from `write_fn` other than a uniqueness violation
    /// (and, under [`CollisionStrategy::PreCheck`], that one too).
    pub async fn reserve<'a, C, W>(&mut self, mut candidate_fn: C, mut write_fn: W) -> Result<Candidate>
    where
        C: FnMut() -> Candidate,
        W: FnMut(Candidate) -> BoxFuture<'a, Result<()>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let candidate = candidate_fn();

            if !self.is_free(&candidate) {
                crate::log_retry_attempt!(attempt, candidate.domains(), "local collision");
                // Keep other tasks on the runtime moving through a long run of collisions.
                tokio::task::yield_now().await;
                continue;
            }

            match self.strategy {
                CollisionStrategy::PreCheck => {
                    self.claim(&candidate);
                    write_fn(candidate.clone()).await?;
                    return Ok(candidate);
                }
                CollisionStrategy::WriteAndRetry => match write_fn(candidate.clone()).await {
                    Ok(()) => {
                        self.claim(&candidate);
                        return Ok(candidate);
                    }
                    Err(e) if e.is_unique_violation() => {
                        // Taken in the store by a writer the pool never saw.
                        self.claim(&candidate);
                        crate::log_retry_attempt!(
                            attempt,
                            candidate.domains(),
                            "store uniqueness violation"
                        );
                    }
                    Err(e) => return Err(e),
                },
            }
        }
    }

    /// Claims the first free value produced by `candidate_fn`
    pub fn reserve_value(
        &mut self,
        domain: IdentityDomain,
        mut candidate_fn: impl FnMut() -> String,
    ) -> String {
        let value = self.generate_avoiding(domain, &mut candidate_fn);
        self.claim(&Candidate::new().with(domain, value.clone()));
        value
    }

    /// First value from `candidate_fn` not in the pool, without claiming it
    pub fn generate_avoiding(
        &self,
        domain: IdentityDomain,
        mut candidate_fn: impl FnMut() -> String,
    ) -> String {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let value = candidate_fn();
            if !self.contains(domain, &value) {
                return value;
            }
            crate::log_retry_attempt!(attempt, domain, "local collision");
        }
    }
}
