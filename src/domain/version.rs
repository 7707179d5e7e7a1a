//! Schema version and product types
//!
//! A PKP installation records its schema version in the `versions` table as a
//! four-part number plus a product tag. [`SchemaVersion`] orders
//! lexicographically over `(major, minor, revision, build)` so that version
//! gates can be expressed as half-open [`VersionRange`]s.

use crate::domain::errors::AnonymizerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Four-part schema version
///
/// # Examples
///
/// ```
/// use pkp_anonymizer::domain::version::SchemaVersion;
///
/// let v: SchemaVersion = "3.4.0.7".parse().unwrap();
/// assert!(v >= SchemaVersion::new(3, 4, 0, 0));
/// assert_eq!(v.to_string(), "3.4.0.7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
    /// Revision
    pub revision: u32,
    /// Build
    pub build: u32,
}

impl SchemaVersion {
    /// Creates a version from its four parts
    pub const fn new(major: u32, minor: u32, revision: u32, build: u32) -> Self {
        Self {
            major,
            minor,
            revision,
            build,
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.revision, self.build
        )
    }
}

impl FromStr for SchemaVersion {
    type Err = String;

    /// Parses `major[.minor[.revision[.build]]]`; missing parts are zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.is_empty() || parts.len() > 4 || parts.iter().any(|p| p.is_empty()) {
            return Err(format!("Invalid schema version: '{s}'"));
        }

        let mut numbers = [0u32; 4];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| format!("Invalid schema version component '{part}' in '{s}'"))?;
        }

        Ok(Self::new(numbers[0], numbers[1], numbers[2], numbers[3]))
    }
}

/// Half-open version range `[from, until)`
///
/// `until = None` leaves the range open above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRange {
    /// Inclusive lower bound
    pub from: SchemaVersion,
    /// Exclusive upper bound
    pub until: Option<SchemaVersion>,
}

impl VersionRange {
    /// Range `[from, until)`
    pub const fn between(from: SchemaVersion, until: SchemaVersion) -> Self {
        Self {
            from,
            until: Some(until),
        }
    }

    /// Range `[from, ∞)`
    pub const fn since(from: SchemaVersion) -> Self {
        Self { from, until: None }
    }

    /// Whether `version` falls inside the range
    pub fn contains(&self, version: &SchemaVersion) -> bool {
        *version >= self.from && self.until.map_or(true, |until| *version < until)
    }
}

impl fmt::Display for VersionRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.until {
            Some(until) => write!(f, "[{}, {})", self.from, until),
            None => write!(f, "[{}, ∞)", self.from),
        }
    }
}

/// PKP product recorded in the `versions` table
///
/// The set is closed: each product owns a differently named per-tenant
/// context settings table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    /// Open Journal Systems (`ojs2`)
    Ojs,
    /// Open Monograph Press (`omp`)
    Omp,
    /// Open Preprint Systems (`ops`)
    Ops,
}

impl Product {
    /// Every recognized product
    pub const ALL: [Product; 3] = [Product::Ojs, Product::Omp, Product::Ops];

    /// Tag stored in `versions.product`
    pub fn tag(&self) -> &'static str {
        match self {
            Product::Ojs => "ojs2",
            Product::Omp => "omp",
            Product::Ops => "ops",
        }
    }

    /// Per-tenant context settings table
    pub fn context_settings_table(&self) -> &'static str {
        match self {
            Product::Ojs => "journal_settings",
            Product::Omp => "press_settings",
            Product::Ops => "server_settings",
        }
    }

    /// Owning context id column of the context settings table
    pub fn context_id_column(&self) -> &'static str {
        match self {
            Product::Ojs => "journal_id",
            Product::Omp => "press_id",
            Product::Ops => "server_id",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for Product {
    type Err = AnonymizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Product::ALL
            .into_iter()
            .find(|p| p.tag() == s)
            .ok_or_else(|| AnonymizerError::UnknownProduct(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_ordering() {
        let v3 = SchemaVersion::new(3, 0, 0, 0);
        let v34 = SchemaVersion::new(3, 4, 0, 0);
        let v34_build = SchemaVersion::new(3, 4, 0, 9);
        assert!(v3 < v34);
        assert!(v34 < v34_build);
        assert!(SchemaVersion::new(2, 9, 9, 9) < v3);
    }

    #[test]
    fn test_version_parse() {
        assert_eq!(
            "3.3.0.14".parse::<SchemaVersion>().unwrap(),
            SchemaVersion::new(3, 3, 0, 14)
        );
        assert_eq!(
            "3.5".parse::<SchemaVersion>().unwrap(),
            SchemaVersion::new(3, 5, 0, 0)
        );
        assert!("3..1".parse::<SchemaVersion>().is_err());
        assert!("3.x".parse::<SchemaVersion>().is_err());
        assert!("1.2.3.4.5".parse::<SchemaVersion>().is_err());
    }

    #[test]
    fn test_version_range_contains() {
        let range = VersionRange::between(SchemaVersion::new(3, 0, 0, 0), SchemaVersion::new(3, 5, 0, 0));
        assert!(range.contains(&SchemaVersion::new(3, 0, 0, 0)));
        assert!(range.contains(&SchemaVersion::new(3, 4, 9, 9)));
        assert!(!range.contains(&SchemaVersion::new(3, 5, 0, 0)));
        assert!(!range.contains(&SchemaVersion::new(2, 4, 8, 0)));

        let open = VersionRange::since(SchemaVersion::new(3, 4, 0, 0));
        assert!(open.contains(&SchemaVersion::new(9, 0, 0, 0)));
        assert_eq!(open.to_string(), "[3.4.0.0, ∞)");
    }

    #[test]
    fn test_product_tables() {
        assert_eq!(Product::Ojs.context_settings_table(), "journal_settings");
        assert_eq!(Product::Omp.context_settings_table(), "press_settings");
        assert_eq!(Product::Ops.context_settings_table(), "server_settings");
        assert_eq!(Product::Omp.context_id_column(), "press_id");
    }

    #[test]
    fn test_product_from_tag() {
        assert_eq!("ojs2".parse::<Product>().unwrap(), Product::Ojs);
        assert_eq!("ops".parse::<Product>().unwrap(), Product::Ops);
        let err = "ojs".parse::<Product>().unwrap_err();
        assert!(matches!(err, AnonymizerError::UnknownProduct(tag) if tag == "ojs"));
    }
}
