//! Named scrub operations

use crate::domain::AnonymizerError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One entity or integration scrubber the engine can invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    Users,
    Authors,
    Publications,
    Reviews,
    EmailLog,
    Crossref,
    Datacite,
    Orcid,
    Lucene,
    Ithenticate,
    Doaj,
    Portico,
    Paypal,
}

impl Operation {
    /// Every operation, entities first
    pub const ALL: [Operation; 13] = [
        Operation::Users,
        Operation::Authors,
        Operation::Publications,
        Operation::Reviews,
        Operation::EmailLog,
        Operation::Crossref,
        Operation::Datacite,
        Operation::Orcid,
        Operation::Lucene,
        Operation::Ithenticate,
        Operation::Doaj,
        Operation::Portico,
        Operation::Paypal,
    ];

    /// Plan used when neither the command line nor the configuration names one
    pub fn default_plan() -> Vec<Operation> {
        Self::ALL.to_vec()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Users => "users",
            Operation::Authors => "authors",
            Operation::Publications => "publications",
            Operation::Reviews => "reviews",
            Operation::EmailLog => "email-log",
            Operation::Crossref => "crossref",
            Operation::Datacite => "datacite",
            Operation::Orcid => "orcid",
            Operation::Lucene => "lucene",
            Operation::Ithenticate => "ithenticate",
            Operation::Doaj => "doaj",
            Operation::Portico => "portico",
            Operation::Paypal => "paypal",
        }
    }

    /// Whether this operation rewrites integration settings
    pub fn is_integration(&self) -> bool {
        !matches!(
            self,
            Operation::Users
                | Operation::Authors
                | Operation::Publications
                | Operation::Reviews
                | Operation::EmailLog
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = AnonymizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|op| op.name() == wanted)
            .ok_or_else(|| {
                AnonymizerError::Configuration(format!(
                    "Unknown operation '{s}'. Must be one of: {}",
                    Self::ALL.map(|op| op.name()).join(", ")
                ))
            })
    }
}
