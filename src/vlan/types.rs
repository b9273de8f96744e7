//! VLAN allocation types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::document::ServiceFamily;
use crate::protection::ProtectionGroup;

/// Scope of a shared VLAN allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UseCase {
    Station,
    Bus,
}

impl UseCase {
    pub fn all() -> [UseCase; 2] {
        [UseCase::Station, UseCase::Bus]
    }
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UseCase::Station => f.write_str("Station"),
            UseCase::Bus => f.write_str("Bus"),
        }
    }
}

/// Service family tag stored on a VLAN record.
///
/// `InterProt` marks traffic exchanged between the two protection groups,
/// which shares one VLAN id across both groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ServiceTag {
    #[serde(rename = "GSE")]
    Gse,
    #[serde(rename = "SMV")]
    Smv,
    InterProt,
}

impl ServiceTag {
    pub fn all() -> [ServiceTag; 3] {
        [ServiceTag::InterProt, ServiceTag::Gse, ServiceTag::Smv]
    }
}

impl From<ServiceFamily> for ServiceTag {
    fn from(family: ServiceFamily) -> Self {
        match family {
            ServiceFamily::Gse => ServiceTag::Gse,
            ServiceFamily::Smv => ServiceTag::Smv,
        }
    }
}

impl fmt::Display for ServiceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceTag::Gse => f.write_str("GSE"),
            ServiceTag::Smv => f.write_str("SMV"),
            ServiceTag::InterProt => f.write_str("InterProt"),
        }
    }
}

/// Classification key under which a VLAN allocation is shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VlanBucket {
    pub service_name: String,
    pub service_tag: ServiceTag,
    pub use_case: UseCase,
    /// Owning bus for bus-scoped buckets; `None` is the shared "no bus" bucket
    pub bus_name: Option<String>,
}

impl fmt::Display for VlanBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.use_case, &self.bus_name) {
            (UseCase::Bus, Some(bus)) => write!(f, "{} {} - {}", self.service_name, self.service_tag, bus),
            (UseCase::Bus, None) => write!(f, "{} {} - no bus", self.service_name, self.service_tag),
            (UseCase::Station, _) => write!(f, "{} {}", self.service_name, self.service_tag),
        }
    }
}

/// Protection group 1 and 2 VLAN ids minted together, as hex strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VlanPair {
    pub prot1_id: String,
    pub prot2_id: String,
}

/// Persisted shared VLAN allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VlanAllocationRecord {
    pub service_name: String,
    pub service_type: ServiceTag,
    pub use_case: UseCase,
    pub prot1_id: String,
    pub prot2_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus_name: Option<String>,
}

impl VlanAllocationRecord {
    pub fn new(bucket: &VlanBucket, pair: VlanPair) -> Self {
        Self {
            service_name: bucket.service_name.clone(),
            service_type: bucket.service_tag,
            use_case: bucket.use_case,
            prot1_id: pair.prot1_id,
            prot2_id: pair.prot2_id,
            bus_name: match bucket.use_case {
                UseCase::Bus => bucket.bus_name.clone(),
                UseCase::Station => None,
            },
        }
    }

    /// Exact bucket match: use-case and service name, plus bus name for
    /// bus-scoped records.
    pub fn matches(&self, bucket: &VlanBucket) -> bool {
        self.use_case == bucket.use_case
            && self.service_name == bucket.service_name
            && (self.use_case == UseCase::Station || self.bus_name == bucket.bus_name)
    }

    pub fn id_for(&self, group: ProtectionGroup) -> &str {
        match group {
            ProtectionGroup::One => &self.prot1_id,
            ProtectionGroup::Two => &self.prot2_id,
        }
    }

    /// Sort key used by listings.
    pub fn sort_key(&self) -> String {
        format!("{} {}", self.bus_name.as_deref().unwrap_or(""), self.service_name)
    }
}

/// Document-embedded container of all VLAN allocation records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanAllocationContainer {
    /// Last-updated timestamp, `YYYY-MM-DD HH:MM:SS ±HH:MM`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(default)]
    pub station: Vec<VlanAllocationRecord>,
    #[serde(default)]
    pub bus: Vec<VlanAllocationRecord>,
}

impl VlanAllocationContainer {
    pub fn records(&self, use_case: UseCase) -> &[VlanAllocationRecord] {
        match use_case {
            UseCase::Station => &self.station,
            UseCase::Bus => &self.bus,
        }
    }

    pub(crate) fn records_mut(&mut self, use_case: UseCase) -> &mut Vec<VlanAllocationRecord> {
        match use_case {
            UseCase::Station => &mut self.station,
            UseCase::Bus => &mut self.bus,
        }
    }

    pub fn len(&self) -> usize {
        self.station.len() + self.bus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
