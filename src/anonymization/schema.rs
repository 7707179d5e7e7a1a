//! Schema version detection
//!
//! The [`SchemaInspector`] reads the `versions` table once, before anything
//! is mutated, and refuses to continue unless exactly one current core row
//! exists for a recognized product and its version is supported.

use crate::adapters::database::traits::TabularStore;
use crate::domain::values::{Filter, Row};
use crate::domain::{AnonymizerError, Product, Result, SchemaVersion, StoreError};

/// Oldest schema version the scrubbers know how to handle
pub const MINIMUM_SUPPORTED_VERSION: SchemaVersion = SchemaVersion::new(3, 0, 0, 0);

const VERSIONS_TABLE: &str = "versions";

/// Detected product and schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaInspector {
    product: Product,
    version: SchemaVersion,
}

impl SchemaInspector {
    /// Reads and validates the current core version row
    ///
    /// # Errors
    ///
    /// - [`AnonymizerError::AmbiguousVersion`] if zero or several rows match
    /// - [`AnonymizerError::UnsupportedVersion`] below [`MINIMUM_SUPPORTED_VERSION`]
    /// - [`AnonymizerError::UnknownProduct`] for a product outside the closed set
    pub async fn inspect(store: &dyn TabularStore) -> Result<Self> {
        let filter = Filter::new()
            .eq("current", 1)
            .eq("product_type", "core")
            .is_in("product", Product::ALL.iter().map(Product::tag));

        let rows = store
            .select(
                VERSIONS_TABLE,
                &["product", "major", "minor", "revision", "build"],
                &filter,
            )
            .await?;

        let [row] = rows.as_slice() else {
            return Err(AnonymizerError::AmbiguousVersion { count: rows.len() });
        };

        let product: Product = row.get_str("product").unwrap_or_default().parse()?;
        let version = SchemaVersion::new(
            version_part(row, "major")?,
            version_part(row, "minor")?,
            version_part(row, "revision")?,
            version_part(row, "build")?,
        );

        let inspector = Self::from_parts(product, version)?;
        tracing::info!(
            product = %product,
            version = %version,
            backend = store.backend_name(),
            "Detected schema version"
        );
        Ok(inspector)
    }

    /// Builds an inspector from an already known product and version
    ///
    /// # Errors
    ///
    /// Returns [`AnonymizerError::UnsupportedVersion`] below the minimum.
    pub fn from_parts(product: Product, version: SchemaVersion) -> Result<Self> {
        if version < MINIMUM_SUPPORTED_VERSION {
            return Err(AnonymizerError::UnsupportedVersion {
                version,
                minimum: MINIMUM_SUPPORTED_VERSION,
            });
        }
        Ok(Self { product, version })
    }

    pub fn product(&self) -> Product {
        self.product
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    /// Per-tenant settings table of the detected product
    pub fn context_settings_table(&self) -> &'static str {
        self.product.context_settings_table()
    }

    /// Owner column of [`SchemaInspector::context_settings_table`]
    pub fn context_id_column(&self) -> &'static str {
        self.product.context_id_column()
    }
}

fn version_part(row: &Row, column: &str) -> Result<u32> {
    row.get_i64(column)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            StoreError::InvalidRequest(format!(
                "{VERSIONS_TABLE}.{column} is not a non-negative integer: {}",
                row.get(column)
            ))
            .into()
        })
}
