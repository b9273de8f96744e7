//! VLAN classification.
//!
//! Publishers sharing a VLAN are grouped into buckets by naming convention.
//! The rules form an ordered table evaluated first match wins:
//!
//! | Match | Use-case | Service name |
//! |---|---|---|
//! | name starts with a slow bus prefix | Bus | `Bus/Bay GOOSE Slow` |
//! | name starts with a fast control prefix | Bus | `Bus/Bay GOOSE Fast` |
//! | name starts with an inter-protection prefix | Bus (InterProt tag) | `P1 to P2 ARecl/SwgrPos` |
//! | SMV function suffix is a bus SV suffix | Bus | `Bus/Bay SV` |
//! | name starts with a station GOOSE prefix | Station | `Station GOOSE` |
//! | SMV function suffix is a station SV suffix | Station | `Station SV` |
//!
//! Bus rules need the device's bus. When the device sits on no bus the
//! [`UnmappedBusPolicy`] either places it in a shared "no bus" bucket or
//! skips the bus rule and keeps evaluating the table.

pub mod fields;
pub mod identifier;
pub mod rules;

pub use fields::FieldPolicy;
pub use identifier::normalized_identifier;
pub use rules::{smv_function, ClassificationRule, Matcher};

use log::debug;

use crate::config::{NamingConfig, UnmappedBusPolicy};
use crate::document::Publisher;
use crate::vlan::{ServiceTag, UseCase, VlanBucket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationEngine {
    rules: Vec<ClassificationRule>,
    unmapped_bus_policy: UnmappedBusPolicy,
}

impl Default for ClassificationEngine {
    fn default() -> Self {
        Self::new(&NamingConfig::default(), UnmappedBusPolicy::default())
    }
}

impl ClassificationEngine {
    pub fn new(naming: &NamingConfig, unmapped_bus_policy: UnmappedBusPolicy) -> Self {
        let rules = vec![
            ClassificationRule::new(
                Matcher::NamePrefix(naming.bus_slow_prefixes.clone()),
                UseCase::Bus,
                rules::BUS_GOOSE_SLOW,
            ),
            ClassificationRule::new(
                Matcher::NamePrefix(naming.bus_fast_prefixes.clone()),
                UseCase::Bus,
                rules::BUS_GOOSE_FAST,
            ),
            ClassificationRule::new(
                Matcher::NamePrefix(naming.inter_protection_prefixes.clone()),
                UseCase::Bus,
                rules::INTER_PROTECTION,
            )
            .with_tag(ServiceTag::InterProt),
            ClassificationRule::new(
                Matcher::SmvFunction(naming.bus_sv_suffixes.clone()),
                UseCase::Bus,
                rules::BUS_SV,
            ),
            ClassificationRule::new(
                Matcher::NamePrefix(naming.station_goose_prefixes.clone()),
                UseCase::Station,
                rules::STATION_GOOSE,
            ),
            ClassificationRule::new(
                Matcher::SmvFunction(naming.station_sv_suffixes.clone()),
                UseCase::Station,
                rules::STATION_SV,
            ),
        ];

        Self::with_rules(rules, unmapped_bus_policy)
    }

    pub fn with_rules(rules: Vec<ClassificationRule>, unmapped_bus_policy: UnmappedBusPolicy) -> Self {
        Self {
            rules,
            unmapped_bus_policy,
        }
    }

    pub fn rules(&self) -> &[ClassificationRule] {
        &self.rules
    }

    pub fn unmapped_bus_policy(&self) -> UnmappedBusPolicy {
        self.unmapped_bus_policy
    }

    /// Bucket a publisher shares its VLAN through, if any.
    ///
    /// `bus_name` is the bus of the publisher's device.
    pub fn classify(&self, publisher: &Publisher, bus_name: Option<&str>) -> Option<VlanBucket> {
        for rule in self.rules.iter().filter(|rule| rule.matcher.matches(publisher)) {
            let bus_name = match (rule.use_case, bus_name) {
                (UseCase::Station, _) => None,
                (UseCase::Bus, Some(bus)) => Some(bus.to_string()),
                (UseCase::Bus, None) => match self.unmapped_bus_policy {
                    UnmappedBusPolicy::Share => None,
                    UnmappedBusPolicy::Skip => {
                        debug!("{}: no bus for '{}', rule skipped", publisher.key, rule.service_name);
                        continue;
                    }
                },
            };

            return Some(VlanBucket {
                service_name: rule.service_name.clone(),
                service_tag: rule.tag_for(publisher),
                use_case: rule.use_case,
                bus_name,
            });
        }

        None
    }
}
