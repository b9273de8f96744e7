//! Range table.
//!
//! Static mapping from (service family, protection group, purpose) to the
//! numeric range an allocator draws from. The defaults are the production
//! values; a configuration file may override any of them, in which case
//! [`RangeTable::validate`] guarantees the MAC and APPID ranges stay
//! pairwise disjoint.

use serde::{Deserialize, Serialize};

use super::types::{AllocationRange, AppIdPool, VlanRange};
use crate::config::ValidationError;
use crate::document::ServiceFamily;
use crate::protection::ProtectionGroup;
use crate::vlan::{ServiceTag, UseCase};

/// Largest VLAN id usable on the wire (0xFFF is reserved).
pub const MAX_VLAN_ID: u64 = 0xFFE;

/// A pair of ranges, one per protection group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupRanges {
    pub p1: AllocationRange,
    pub p2: AllocationRange,
}

impl GroupRanges {
    fn get(&self, group: ProtectionGroup) -> AllocationRange {
        match group {
            ProtectionGroup::One => self.p1,
            ProtectionGroup::Two => self.p2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MacRanges {
    pub gse: GroupRanges,
    pub smv: GroupRanges,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GseAppIdRanges {
    pub p1: AllocationRange,
    pub p2: AllocationRange,
    pub non_protection: AllocationRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AppIdRanges {
    pub gse: GseAppIdRanges,
    pub smv: GroupRanges,
}

/// VLAN ranges for one use-case, one entry per service tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VlanUseCaseRanges {
    pub inter_prot: VlanRange,
    pub gse: VlanRange,
    pub smv: VlanRange,
}

impl VlanUseCaseRanges {
    fn get(&self, tag: ServiceTag) -> VlanRange {
        match tag {
            ServiceTag::InterProt => self.inter_prot,
            ServiceTag::Gse => self.gse,
            ServiceTag::Smv => self.smv,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VlanRanges {
    pub station: VlanUseCaseRanges,
    pub bus: VlanUseCaseRanges,
}

/// Immutable range configuration handed to the allocation engine.
///
/// Every lookup is total over its typed key, so an undefined combination
/// cannot be expressed. Deserializing overlays the given leaf ranges onto
/// [`RangeTable::default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RangeOverrides")]
pub struct RangeTable {
    pub mac: MacRanges,
    pub appid: AppIdRanges,
    pub vlan: VlanRanges,
}

impl Default for RangeTable {
    fn default() -> Self {
        Self {
            mac: MacRanges {
                gse: GroupRanges {
                    p1: AllocationRange::new(0x010C_CD01_0000, 0x010C_CD01_00FF),
                    p2: AllocationRange::new(0x010C_CD01_0100, 0x010C_CD01_01FF),
                },
                smv: GroupRanges {
                    p1: AllocationRange::new(0x010C_CD04_0000, 0x010C_CD04_00FF),
                    p2: AllocationRange::new(0x010C_CD04_0100, 0x010C_CD04_01FF),
                },
            },
            appid: AppIdRanges {
                gse: GseAppIdRanges {
                    p1: AllocationRange::new(0x8001, 0x8FFF),
                    p2: AllocationRange::new(0x9001, 0x9FFF),
                    non_protection: AllocationRange::new(0x0001, 0x4FFF),
                },
                smv: GroupRanges {
                    p1: AllocationRange::new(0x5000, 0x5FFF),
                    p2: AllocationRange::new(0x6000, 0x6FFF),
                },
            },
            vlan: VlanRanges {
                station: VlanUseCaseRanges {
                    inter_prot: VlanRange::new(1050, 1099, 0),
                    gse: VlanRange::new(1000, 1049, 1000),
                    smv: VlanRange::new(1050, 1099, 1000),
                },
                bus: VlanUseCaseRanges {
                    inter_prot: VlanRange::new(50, 99, 0),
                    gse: VlanRange::new(104, 149, 96),
                    smv: VlanRange::new(150, 199, 100),
                },
            },
        }
    }
}

/// Partial range table as read from configuration. Every leaf is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RangeOverrides {
    mac: MacOverrides,
    appid: AppIdOverrides,
    vlan: VlanOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct GroupOverrides {
    p1: Option<AllocationRange>,
    p2: Option<AllocationRange>,
}

impl GroupOverrides {
    fn overlay(self, base: GroupRanges) -> GroupRanges {
        GroupRanges {
            p1: self.p1.unwrap_or(base.p1),
            p2: self.p2.unwrap_or(base.p2),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MacOverrides {
    gse: GroupOverrides,
    smv: GroupOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct GseAppIdOverrides {
    p1: Option<AllocationRange>,
    p2: Option<AllocationRange>,
    non_protection: Option<AllocationRange>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct AppIdOverrides {
    gse: GseAppIdOverrides,
    smv: GroupOverrides,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct VlanUseCaseOverrides {
    inter_prot: Option<VlanRange>,
    gse: Option<VlanRange>,
    smv: Option<VlanRange>,
}

impl VlanUseCaseOverrides {
    fn overlay(self, base: VlanUseCaseRanges) -> VlanUseCaseRanges {
        VlanUseCaseRanges {
            inter_prot: self.inter_prot.unwrap_or(base.inter_prot),
            gse: self.gse.unwrap_or(base.gse),
            smv: self.smv.unwrap_or(base.smv),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct VlanOverrides {
    station: VlanUseCaseOverrides,
    bus: VlanUseCaseOverrides,
}

impl From<RangeOverrides> for RangeTable {
    fn from(overrides: RangeOverrides) -> Self {
        let base = RangeTable::default();
        let gse_appid = overrides.appid.gse;
        Self {
            mac: MacRanges {
                gse: overrides.mac.gse.overlay(base.mac.gse),
                smv: overrides.mac.smv.overlay(base.mac.smv),
            },
            appid: AppIdRanges {
                gse: GseAppIdRanges {
                    p1: gse_appid.p1.unwrap_or(base.appid.gse.p1),
                    p2: gse_appid.p2.unwrap_or(base.appid.gse.p2),
                    non_protection: gse_appid.non_protection.unwrap_or(base.appid.gse.non_protection),
                },
                smv: overrides.appid.smv.overlay(base.appid.smv),
            },
            vlan: VlanRanges {
                station: overrides.vlan.station.overlay(base.vlan.station),
                bus: overrides.vlan.bus.overlay(base.vlan.bus),
            },
        }
    }
}

impl RangeTable {
    pub fn mac_range(&self, family: ServiceFamily, group: ProtectionGroup) -> AllocationRange {
        match family {
            ServiceFamily::Gse => self.mac.gse.get(group),
            ServiceFamily::Smv => self.mac.smv.get(group),
        }
    }

    pub fn appid_range(&self, pool: AppIdPool) -> AllocationRange {
        match pool {
            AppIdPool::Gse(ProtectionGroup::One) => self.appid.gse.p1,
            AppIdPool::Gse(ProtectionGroup::Two) => self.appid.gse.p2,
            AppIdPool::GseNonProtection => self.appid.gse.non_protection,
            AppIdPool::Smv(group) => self.appid.smv.get(group),
        }
    }

    /// VLAN range plus the offset used to derive the protection group 2 id.
    pub fn vlan_range(&self, use_case: UseCase, tag: ServiceTag) -> VlanRange {
        match use_case {
            UseCase::Station => self.vlan.station.get(tag),
            UseCase::Bus => self.vlan.bus.get(tag),
        }
    }

    fn labelled_mac_ranges(&self) -> Vec<(String, AllocationRange)> {
        let mut ranges = Vec::new();
        for family in ServiceFamily::all() {
            for group in ProtectionGroup::all() {
                ranges.push((format!("MAC {} P{}", family, group), self.mac_range(family, group)));
            }
        }
        ranges
    }

    fn labelled_appid_ranges(&self) -> Vec<(String, AllocationRange)> {
        AppIdPool::all()
            .into_iter()
            .map(|pool| (format!("APPID {:?}", pool), self.appid_range(pool)))
            .collect()
    }

    /// Check that every range is non-empty, fits its field width, and that
    /// MAC and APPID ranges are pairwise disjoint.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let macs = self.labelled_mac_ranges();
        let appids = self.labelled_appid_ranges();

        for (label, range) in macs.iter() {
            check_range(label, range, 0xFFFF_FFFF_FFFF)?;
        }
        for (label, range) in appids.iter() {
            check_range(label, range, 0xFFFF)?;
        }
        check_disjoint(&macs)?;
        check_disjoint(&appids)?;

        for use_case in UseCase::all() {
            for tag in ServiceTag::all() {
                let vlan = self.vlan_range(use_case, tag);
                let label = format!("VLAN {} {}", use_case, tag);
                check_range(&label, &vlan.range(), MAX_VLAN_ID + 1)?;
                if vlan.max_p2() > MAX_VLAN_ID {
                    return Err(ValidationError::InvalidRange(format!(
                        "{} offset {} pushes protection group 2 ids above 0x{:03X}",
                        label, vlan.offset_to_p2, MAX_VLAN_ID
                    )));
                }
            }
        }

        Ok(())
    }
}

fn check_range(label: &str, range: &AllocationRange, limit: u64) -> Result<(), ValidationError> {
    if range.is_empty() {
        return Err(ValidationError::InvalidRange(format!(
            "{} range is empty (min 0x{:X}, max 0x{:X})",
            label, range.min, range.max
        )));
    }
    if range.max > limit {
        return Err(ValidationError::InvalidRange(format!(
            "{} range upper bound 0x{:X} exceeds 0x{:X}",
            label, range.max, limit
        )));
    }
    Ok(())
}

fn check_disjoint(ranges: &[(String, AllocationRange)]) -> Result<(), ValidationError> {
    for (i, (label_a, a)) in ranges.iter().enumerate() {
        for (label_b, b) in ranges.iter().skip(i + 1) {
            if a.overlaps(b) {
                return Err(ValidationError::InvalidRange(format!(
                    "{} overlaps {}",
                    label_a, label_b
                )));
            }
        }
    }
    Ok(())
}
