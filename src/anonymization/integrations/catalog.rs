//! Known settings layouts of third-party integrations
//!
//! Layouts are documented through 3.5.x. A detected version at or above
//! [`LAST_KNOWN_LAYOUT`] is only handled by integrations whose rules are
//! open-ended.

use super::{Credential, Integration, IntegrationRule, KeyAction, ScrubTarget, SettingsLocation};
use crate::anonymization::operation::Operation;
use crate::domain::{SchemaVersion, VersionRange};

const V3_0: SchemaVersion = SchemaVersion::new(3, 0, 0, 0);
const V3_4: SchemaVersion = SchemaVersion::new(3, 4, 0, 0);
const V3_5: SchemaVersion = SchemaVersion::new(3, 5, 0, 0);

/// First version whose integration layouts are not catalogued
pub const LAST_KNOWN_LAYOUT: SchemaVersion = SchemaVersion::new(3, 6, 0, 0);

const KNOWN: VersionRange = VersionRange::between(V3_0, LAST_KNOWN_LAYOUT);

pub static CROSSREF: Integration = Integration {
    name: "crossref",
    rules: &[IntegrationRule {
        range: KNOWN,
        targets: &[ScrubTarget {
            location: SettingsLocation::PluginSettings(&["crossrefexportplugin", "crossrefplugin"]),
            keys: &[
                ("username", KeyAction::Replace(Credential::Username)),
                ("password", KeyAction::Replace(Credential::Password)),
                ("depositorName", KeyAction::Replace(Credential::Name)),
                ("depositorEmail", KeyAction::Replace(Credential::Email)),
                ("testMode", KeyAction::Fixed("1")),
            ],
        }],
    }],
};

pub static DATACITE: Integration = Integration {
    name: "datacite",
    rules: &[IntegrationRule {
        range: KNOWN,
        targets: &[ScrubTarget {
            location: SettingsLocation::PluginSettings(&["dataciteexportplugin", "dataciteplugin"]),
            keys: &[
                ("username", KeyAction::Replace(Credential::Username)),
                ("password", KeyAction::Replace(Credential::Password)),
                ("testUsername", KeyAction::Replace(Credential::Username)),
                ("testPassword", KeyAction::Replace(Credential::Password)),
                ("testMode", KeyAction::Fixed("1")),
            ],
        }],
    }],
};

const ORCID_PLUGIN: ScrubTarget = ScrubTarget {
    location: SettingsLocation::PluginSettings(&["orcidprofileplugin"]),
    keys: &[
        ("orcidClientId", KeyAction::Replace(Credential::Token)),
        ("orcidClientSecret", KeyAction::Replace(Credential::Token)),
        ("isSandBox", KeyAction::Fixed("1")),
        ("orcidProfileAPIPath", KeyAction::Delete),
    ],
};

pub static ORCID: Integration = Integration {
    name: "orcid",
    rules: &[
        IntegrationRule {
            range: VersionRange::between(V3_0, V3_5),
            targets: &[ORCID_PLUGIN],
        },
        // 3.5 moved ORCID into core context settings; plugin rows may linger.
        IntegrationRule {
            range: VersionRange::between(V3_5, LAST_KNOWN_LAYOUT),
            targets: &[
                ScrubTarget {
                    location: SettingsLocation::ContextSettings,
                    keys: &[
                        ("orcidClientId", KeyAction::Replace(Credential::Token)),
                        ("orcidClientSecret", KeyAction::Replace(Credential::Token)),
                        ("orcidApiType", KeyAction::Fixed("memberSandbox")),
                        ("orcidApiUrl", KeyAction::Delete),
                    ],
                },
                ORCID_PLUGIN,
            ],
        },
    ],
};

pub static LUCENE: Integration = Integration {
    name: "lucene",
    rules: &[IntegrationRule {
        range: KNOWN,
        targets: &[ScrubTarget {
            location: SettingsLocation::PluginSettings(&["luceneplugin"]),
            keys: &[
                ("username", KeyAction::Replace(Credential::Username)),
                ("password", KeyAction::Replace(Credential::Password)),
                ("instId", KeyAction::Replace(Credential::Token)),
                ("searchEndpoint", KeyAction::Delete),
            ],
        }],
    }],
};

const ITHENTICATE_ALIASES: &[&str] = &["ithenticateplugin", "plagiarismplugin"];

pub static ITHENTICATE: Integration = Integration {
    name: "ithenticate",
    rules: &[
        IntegrationRule {
            range: VersionRange::between(V3_0, V3_4),
            targets: &[ScrubTarget {
                location: SettingsLocation::PluginSettings(ITHENTICATE_ALIASES),
                keys: &[
                    ("ithenticateUser", KeyAction::Replace(Credential::Username)),
                    ("ithenticatePass", KeyAction::Replace(Credential::Password)),
                ],
            }],
        },
        IntegrationRule {
            range: VersionRange::between(V3_4, LAST_KNOWN_LAYOUT),
            targets: &[ScrubTarget {
                location: SettingsLocation::PluginSettings(ITHENTICATE_ALIASES),
                keys: &[
                    ("ithenticateApiKey", KeyAction::Replace(Credential::Token)),
                    ("ithenticateApiUrl", KeyAction::Delete),
                ],
            }],
        },
    ],
};

pub static DOAJ: Integration = Integration {
    name: "doaj",
    rules: &[IntegrationRule {
        range: KNOWN,
        targets: &[ScrubTarget {
            location: SettingsLocation::PluginSettings(&["doajexportplugin", "doajplugin"]),
            keys: &[
                ("apiKey", KeyAction::Replace(Credential::Token)),
                ("testMode", KeyAction::Fixed("1")),
            ],
        }],
    }],
};

pub static PORTICO: Integration = Integration {
    name: "portico",
    rules: &[IntegrationRule {
        range: KNOWN,
        targets: &[ScrubTarget {
            location: SettingsLocation::PluginSettings(&["porticoexportplugin"]),
            keys: &[
                ("porticoHost", KeyAction::Delete),
                ("porticoUsername", KeyAction::Delete),
                ("porticoPassword", KeyAction::Delete),
            ],
        }],
    }],
};

pub static PAYPAL: Integration = Integration {
    name: "paypal",
    rules: &[IntegrationRule {
        range: KNOWN,
        targets: &[ScrubTarget {
            location: SettingsLocation::PluginSettings(&["paypalpaymentplugin"]),
            keys: &[
                ("accountName", KeyAction::Replace(Credential::Email)),
                ("clientId", KeyAction::Replace(Credential::Token)),
                ("secret", KeyAction::Replace(Credential::Token)),
                ("testMode", KeyAction::Fixed("1")),
                ("webhookId", KeyAction::Delete),
            ],
        }],
    }],
};

/// Integration scrubbed by `operation`, `None` for entity operations
pub fn integration(operation: Operation) -> Option<&'static Integration> {
    match operation {
        Operation::Crossref => Some(&CROSSREF),
        Operation::Datacite => Some(&DATACITE),
        Operation::Orcid => Some(&ORCID),
        Operation::Lucene => Some(&LUCENE),
        Operation::Ithenticate => Some(&ITHENTICATE),
        Operation::Doaj => Some(&DOAJ),
        Operation::Portico => Some(&PORTICO),
        Operation::Paypal => Some(&PAYPAL),
        Operation::Users
        | Operation::Authors
        | Operation::Publications
        | Operation::Reviews
        | Operation::EmailLog => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_every_integration_operation_has_a_catalog_entry() {
        for op in Operation::ALL {
            assert_eq!(integration(op).is_some(), op.is_integration(), "{op}");
            if let Some(found) = integration(op) {
                assert_eq!(found.name, op.name());
            }
        }
    }

    #[test_case("3.0.0.0", true; "oldest supported")]
    #[test_case("3.4.0.9", true; "plain 3.4")]
    #[test_case("3.5.0.3", true; "core orcid layout")]
    #[test_case("3.6.0.0", false; "first unknown")]
    #[test_case("2.4.8.0", false; "pre 3.0")]
    fn test_orcid_support(version: &str, supported: bool) {
        let version: SchemaVersion = version.parse().unwrap();
        assert_eq!(ORCID.supports(version), supported);
    }

    #[test]
    fn test_orcid_rule_switches_location_at_3_5() {
        let old = ORCID.rule_for(SchemaVersion::new(3, 4, 0, 0)).unwrap();
        assert_eq!(old.targets.len(), 1);
        assert!(matches!(old.targets[0].location, SettingsLocation::PluginSettings(_)));

        let new = ORCID.rule_for(SchemaVersion::new(3, 5, 0, 0)).unwrap();
        assert_eq!(new.targets.len(), 2);
        assert!(matches!(new.targets[0].location, SettingsLocation::ContextSettings));
    }

    #[test]
    fn test_ithenticate_keys_by_version() {
        let keys = |v: SchemaVersion| {
            ITHENTICATE.rule_for(v).unwrap().targets[0]
                .keys
                .iter()
                .map(|(k, _)| *k)
                .collect::<Vec<_>>()
        };
        assert_eq!(keys(SchemaVersion::new(3, 3, 0, 0)), ["ithenticateUser", "ithenticatePass"]);
        assert_eq!(keys(SchemaVersion::new(3, 4, 0, 0)), ["ithenticateApiKey", "ithenticateApiUrl"]);
    }

    #[test]
    fn test_rule_ranges_do_not_overlap() {
        for op in Operation::ALL {
            let Some(integration) = integration(op) else { continue };
            for (i, a) in integration.rules.iter().enumerate() {
                for b in &integration.rules[i + 1..] {
                    assert!(!a.range.contains(&b.range.from), "{op}: {} overlaps {}", a.range, b.range);
                    assert!(!b.range.contains(&a.range.from), "{op}: {} overlaps {}", b.range, a.range);
                }
            }
        }
    }
}
