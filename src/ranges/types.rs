//! Range value objects.

use serde::{Deserialize, Serialize};

use crate::document::ServiceFamily;
use crate::protection::ProtectionGroup;

/// Inclusive lower bound, exclusive upper bound: iteration covers `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AllocationRange {
    pub min: u64,
    pub max: u64,
}

impl AllocationRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u64) -> bool {
        value >= self.min && value < self.max
    }

    pub fn len(&self) -> u64 {
        self.max.saturating_sub(self.min)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the two ranges share at least one value.
    pub fn overlaps(&self, other: &AllocationRange) -> bool {
        !self.is_empty() && !other.is_empty() && self.min < other.max && other.min < self.max
    }
}

/// VLAN range for one (use-case, service tag) pair.
///
/// The protection group 2 identifier is always derived from the protection
/// group 1 identifier by adding `offset_to_p2`, so a single allocation yields
/// the ids for both groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanRange {
    pub min: u64,
    pub max: u64,
    #[serde(default)]
    pub offset_to_p2: u64,
}

impl VlanRange {
    pub const fn new(min: u64, max: u64, offset_to_p2: u64) -> Self {
        Self { min, max, offset_to_p2 }
    }

    pub fn range(&self) -> AllocationRange {
        AllocationRange::new(self.min, self.max)
    }

    /// Highest protection group 2 id this range can produce.
    pub fn max_p2(&self) -> u64 {
        self.max.saturating_sub(1).saturating_add(self.offset_to_p2)
    }
}

/// APPID pool selector.
///
/// GOOSE publishers that are not protection functions draw from a separate
/// pool; Sampled Value publishers always use their protection group's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AppIdPool {
    Gse(ProtectionGroup),
    GseNonProtection,
    Smv(ProtectionGroup),
}

impl AppIdPool {
    pub fn new(family: ServiceFamily, group: ProtectionGroup, protection_function: bool) -> Self {
        match family {
            ServiceFamily::Gse if protection_function => AppIdPool::Gse(group),
            ServiceFamily::Gse => AppIdPool::GseNonProtection,
            ServiceFamily::Smv => AppIdPool::Smv(group),
        }
    }

    pub fn family(&self) -> ServiceFamily {
        match self {
            AppIdPool::Gse(_) | AppIdPool::GseNonProtection => ServiceFamily::Gse,
            AppIdPool::Smv(_) => ServiceFamily::Smv,
        }
    }

    pub fn all() -> [AppIdPool; 5] {
        [
            AppIdPool::Gse(ProtectionGroup::One),
            AppIdPool::Gse(ProtectionGroup::Two),
            AppIdPool::GseNonProtection,
            AppIdPool::Smv(ProtectionGroup::One),
            AppIdPool::Smv(ProtectionGroup::Two),
        ]
    }
}
