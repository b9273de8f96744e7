//! Classification rules.

use crate::document::{Publisher, ServiceFamily};
use crate::vlan::{ServiceTag, UseCase};

pub const BUS_GOOSE_SLOW: &str = "Bus/Bay GOOSE Slow";
pub const BUS_GOOSE_FAST: &str = "Bus/Bay GOOSE Fast";
pub const INTER_PROTECTION: &str = "P1 to P2 ARecl/SwgrPos";
pub const BUS_SV: &str = "Bus/Bay SV";
pub const STATION_GOOSE: &str = "Station GOOSE";
pub const STATION_SV: &str = "Station SV";

/// SMV function suffix: the smvID with the device name and one separator
/// removed, e.g. `BAY1_P1_Phase` on `BAY1_P1` gives `Phase`.
///
/// GOOSE publishers have no function suffix.
pub fn smv_function(publisher: &Publisher) -> Option<String> {
    match publisher.family() {
        ServiceFamily::Smv => Some(
            publisher
                .identifier
                .replacen(publisher.device(), "", 1)
                .replacen('_', "", 1),
        ),
        ServiceFamily::Gse => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// Control block name starts with one of the prefixes (case-sensitive)
    NamePrefix(Vec<String>),
    /// SMV publisher whose function suffix equals one of the values
    SmvFunction(Vec<String>),
}

impl Matcher {
    pub fn matches(&self, publisher: &Publisher) -> bool {
        match self {
            Matcher::NamePrefix(prefixes) => prefixes.iter().any(|p| publisher.name().starts_with(p.as_str())),
            Matcher::SmvFunction(suffixes) => match smv_function(publisher) {
                Some(function) => suffixes.iter().any(|s| *s == function),
                None => false,
            },
        }
    }
}

/// One ordered entry of the classification table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRule {
    pub matcher: Matcher,
    pub use_case: UseCase,
    pub service_name: String,
    /// Overrides the publisher's own family tag
    pub forced_tag: Option<ServiceTag>,
}

impl ClassificationRule {
    pub fn new(matcher: Matcher, use_case: UseCase, service_name: &str) -> Self {
        Self {
            matcher,
            use_case,
            service_name: service_name.to_string(),
            forced_tag: None,
        }
    }

    pub fn with_tag(mut self, tag: ServiceTag) -> Self {
        self.forced_tag = Some(tag);
        self
    }

    pub fn tag_for(&self, publisher: &Publisher) -> ServiceTag {
        self.forced_tag.unwrap_or_else(|| ServiceTag::from(publisher.family()))
    }
}
