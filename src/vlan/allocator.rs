//! VLAN id allocators.
//!
//! A VLAN allocation mints the protection group 1 id from a
//! [`SequentialAllocator`] and derives the protection group 2 id by adding the
//! range's fixed offset. Used ids come from the allocation records of the
//! same use-case, so ranges that share numbers inside one use-case (station
//! inter-protection and station SV) can never mint the same id.

use log::debug;
use std::collections::BTreeMap;

use super::store::VlanAllocationStore;
use super::types::{ServiceTag, UseCase, VlanPair};
use crate::address::{AddressFormat, ExclusionSet, SequentialAllocator, UsedValueScan};
use crate::ranges::{RangeTable, VlanRange};

/// Anything able to mint a fresh id pair for a (use-case, service tag).
pub trait VlanIdSource {
    fn next_pair(&mut self, use_case: UseCase, tag: ServiceTag) -> Option<VlanPair>;
}

/// Allocator for a single VLAN range.
#[derive(Debug, Clone)]
pub struct VlanIdAllocator {
    ids: SequentialAllocator,
    offset_to_p2: u64,
}

impl VlanIdAllocator {
    pub fn new(range: VlanRange, used: &UsedValueScan) -> Self {
        Self {
            ids: SequentialAllocator::new(range.range(), AddressFormat::VlanId, used),
            offset_to_p2: range.offset_to_p2,
        }
    }

    pub fn next_pair(&mut self) -> Option<VlanPair> {
        let prot1 = self.ids.next()?;
        let format = AddressFormat::VlanId;
        Some(VlanPair {
            prot1_id: format.format(prot1),
            prot2_id: format.format(prot1 + self.offset_to_p2),
        })
    }

    fn reserve(&mut self, prot1: u64) {
        self.ids.reserve(prot1);
    }
}

/// One allocator per (use-case, service tag), built once per batch.
#[derive(Debug, Clone)]
pub struct VlanAllocatorSet {
    allocators: BTreeMap<(UseCase, ServiceTag), VlanIdAllocator>,
}

impl VlanAllocatorSet {
    /// Build allocators whose used set is every protection group 1 id held by
    /// a record of the same use-case.
    pub fn new(ranges: &RangeTable, store: &VlanAllocationStore) -> Self {
        let mut allocators = BTreeMap::new();
        for use_case in UseCase::all() {
            let held = store.records_in(use_case).iter().map(|r| r.prot1_id.as_str());
            let used = UsedValueScan::from_values(held, &ExclusionSet::default());
            debug!("{} VLAN ids held by {} records", use_case, used.len());
            for tag in ServiceTag::all() {
                allocators.insert((use_case, tag), VlanIdAllocator::new(ranges.vlan_range(use_case, tag), &used));
            }
        }
        Self { allocators }
    }
}

impl VlanIdSource for VlanAllocatorSet {
    fn next_pair(&mut self, use_case: UseCase, tag: ServiceTag) -> Option<VlanPair> {
        let pair = self.allocators.get_mut(&(use_case, tag))?.next_pair()?;

        if let Some(prot1) = AddressFormat::VlanId.parse(&pair.prot1_id) {
            for ((other_use_case, other_tag), allocator) in self.allocators.iter_mut() {
                if *other_use_case == use_case && *other_tag != tag {
                    allocator.reserve(prot1);
                }
            }
        }

        Some(pair)
    }
}
