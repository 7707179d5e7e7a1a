//! Credential handling for the database connection string
//!
//! The connection string usually embeds a password, so it is held in a
//! `secrecy` container: memory is zeroed on drop, `Debug` output is redacted
//! and reading the value requires an explicit `expose_secret()`.
//!
//! # Example
//!
//! ```rust
//! use pkp_anonymizer::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let dsn = secret_string("postgresql://ojs:hunter2@db/ojs".to_string());
//! assert!(!format!("{dsn:?}").contains("hunter2"));
//! assert!(dsn.expose_secret().as_ref().starts_with("postgresql://"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret, SerializableSecret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

/// String newtype satisfying the trait bounds of [`Secret`]
#[derive(Clone, Debug, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}
impl SerializableSecret for SecretValue {}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        SecretValue(s)
    }
}

impl AsRef<str> for SecretValue {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl SecretValue {
    /// Check if the secret value is empty
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Serialize for SecretValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue)
    }
}

/// Zeroizing, debug-redacted string
pub type SecretString = Secret<SecretValue>;

/// Wraps a plain string into a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}

/// Connection string with credentials stripped, safe to log
///
/// Everything up to the last `@` is replaced, so both URL and
/// `user:password@host` forms are covered.
pub fn redact_connection_string(connection_string: &str) -> String {
    let scheme = connection_string
        .split_once("://")
        .map_or("postgresql", |(scheme, _)| scheme);
    match connection_string.rsplit_once('@') {
        Some((_, host)) => format!("{scheme}://***@{host}"),
        None => format!("{scheme}://***"),
    }
}
