//! VLAN allocation store.
//!
//! The store is the only allocation state that outlives a batch. It lives in
//! the host document as a single container with a `Station` and a `Bus`
//! partition. The engine works on an in-memory copy loaded once per batch and
//! writes the whole container back through one
//! [`Edit::ReplaceVlanAllocation`] when the batch is emitted.

use log::{debug, info};

use super::allocator::VlanIdSource;
use super::types::{UseCase, VlanAllocationContainer, VlanAllocationRecord, VlanBucket};
use crate::document::{DocumentError, Edit, HostDocument};

/// Outcome of [`VlanAllocationStore::allocate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VlanAllocation {
    /// The bucket already had a record
    Existing(VlanAllocationRecord),
    /// A new record was minted and stored
    Created(VlanAllocationRecord),
}

impl VlanAllocation {
    pub fn record(&self) -> &VlanAllocationRecord {
        match self {
            VlanAllocation::Existing(record) | VlanAllocation::Created(record) => record,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, VlanAllocation::Created(_))
    }
}

/// Errors raised while transferring an allocation between documents.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("Source document has no VLAN allocation to transfer")]
    NoAllocation,

    #[error("VLAN allocation not transferred, no Communication section in target document")]
    NoCommunication,

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Result of a successful transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOutcome {
    /// The target already had a container, which was replaced
    pub replaced_existing: bool,
    pub records: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VlanAllocationStore {
    container: Option<VlanAllocationContainer>,
    created_on_demand: bool,
}

impl VlanAllocationStore {
    /// Snapshot the allocation container of a document.
    pub fn load<D: HostDocument + ?Sized>(doc: &D) -> Self {
        Self::from_container(doc.vlan_allocation().cloned())
    }

    pub fn from_container(container: Option<VlanAllocationContainer>) -> Self {
        Self {
            container,
            created_on_demand: false,
        }
    }

    pub fn container(&self) -> Option<&VlanAllocationContainer> {
        self.container.as_ref()
    }

    /// True once the container had to be created to hold a new record.
    pub fn created_on_demand(&self) -> bool {
        self.created_on_demand
    }

    pub fn records_in(&self, use_case: UseCase) -> &[VlanAllocationRecord] {
        match &self.container {
            Some(container) => container.records(use_case),
            None => &[],
        }
    }

    /// Station records then bus records, each ordered by bus and service name.
    pub fn records(&self) -> Vec<&VlanAllocationRecord> {
        let mut out = Vec::new();
        for use_case in UseCase::all() {
            let mut records: Vec<&VlanAllocationRecord> = self.records_in(use_case).iter().collect();
            records.sort_by_key(|r| r.sort_key());
            out.extend(records);
        }
        out
    }

    pub fn count(&self) -> usize {
        self.container.as_ref().map_or(0, VlanAllocationContainer::len)
    }

    pub fn updated(&self) -> Option<&str> {
        self.container.as_ref()?.updated.as_deref()
    }

    pub fn find_record(&self, bucket: &VlanBucket) -> Option<&VlanAllocationRecord> {
        self.records_in(bucket.use_case).iter().find(|r| r.matches(bucket))
    }

    /// Records of `use_case` named `service_name` whose bus is exactly `bus`.
    ///
    /// `None` selects the station records or the shared "no bus" record, never
    /// the records of every bus.
    pub fn records_named(&self, use_case: UseCase, service_name: &str, bus: Option<&str>) -> Vec<VlanAllocationRecord> {
        self.records_in(use_case)
            .iter()
            .filter(|r| r.service_name == service_name && r.bus_name.as_deref() == bus)
            .cloned()
            .collect()
    }

    /// Return the bucket's record, minting and storing a new one if needed.
    ///
    /// A new record stamps the container with `updated`. Returns `None` when
    /// the bucket has no record and its range is exhausted.
    pub fn allocate<S>(&mut self, bucket: &VlanBucket, ids: &mut S, updated: &str) -> Option<VlanAllocation>
    where
        S: VlanIdSource + ?Sized,
    {
        if let Some(existing) = self.find_record(bucket) {
            debug!("Reusing VLAN {}/{} for {}", existing.prot1_id, existing.prot2_id, bucket);
            return Some(VlanAllocation::Existing(existing.clone()));
        }

        let pair = ids.next_pair(bucket.use_case, bucket.service_tag)?;
        let record = VlanAllocationRecord::new(bucket, pair);

        let container = match self.container.as_mut() {
            Some(container) => container,
            None => {
                info!("Creating VLAN allocation container");
                self.created_on_demand = true;
                self.container.get_or_insert_with(VlanAllocationContainer::default)
            }
        };
        container.records_mut(bucket.use_case).push(record.clone());
        container.updated = Some(updated.to_string());

        info!("Allocated VLAN {}/{} for {}", record.prot1_id, record.prot2_id, bucket);
        Some(VlanAllocation::Created(record))
    }

    /// Delete the given records. Records not present are ignored.
    ///
    /// Returns how many records were removed.
    pub fn remove(&mut self, records: &[VlanAllocationRecord]) -> usize {
        let Some(container) = self.container.as_mut() else {
            return 0;
        };

        let mut removed = 0;
        for record in records {
            let partition = container.records_mut(record.use_case);
            if let Some(position) = partition.iter().position(|r| r == record) {
                partition.remove(position);
                removed += 1;
            }
        }
        info!("Removed {} VLAN allocations", removed);
        removed
    }

    /// The edit persisting this store into its document.
    pub fn to_edit(&self) -> Option<Edit> {
        self.container.clone().map(Edit::ReplaceVlanAllocation)
    }
}

/// Copy the whole allocation container from `source` into `target`,
/// replacing whatever container the target had.
pub fn transfer<S, T>(source: &S, target: &mut T) -> Result<TransferOutcome, TransferError>
where
    S: HostDocument + ?Sized,
    T: HostDocument + ?Sized,
{
    let container = source.vlan_allocation().ok_or(TransferError::NoAllocation)?.clone();
    if !target.has_communication() {
        return Err(TransferError::NoCommunication);
    }

    let replaced_existing = target.vlan_allocation().is_some();
    let records = container.len();
    target.apply(&[Edit::ReplaceVlanAllocation(container)])?;

    if replaced_existing {
        info!("Removed existing VLAN allocations and transferred {} records", records);
    } else {
        info!("Transferred {} VLAN allocation records", records);
    }

    Ok(TransferOutcome {
        replaced_existing,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranges::RangeTable;
    use crate::vlan::allocator::VlanAllocatorSet;
    use crate::vlan::types::ServiceTag;

    const STAMP: &str = "2024-05-01 10:00:00 +12:00";

    fn bucket(name: &str, use_case: UseCase, bus: Option<&str>) -> VlanBucket {
        VlanBucket {
            service_name: name.to_string(),
            service_tag: ServiceTag::Gse,
            use_case,
            bus_name: bus.map(str::to_string),
        }
    }

    #[test]
    fn test_allocate_twice_returns_same_record() {
        let mut store = VlanAllocationStore::default();
        let mut ids = VlanAllocatorSet::new(&RangeTable::default(), &store);
        let fast = bucket("Bus/Bay GOOSE Fast", UseCase::Bus, Some("Bus A"));

        let first = store.allocate(&fast, &mut ids, STAMP).unwrap();
        assert!(first.is_new());
        assert!(store.created_on_demand());
        assert_eq!(store.updated(), Some(STAMP));

        let second = store.allocate(&fast, &mut ids, "later").unwrap();
        assert!(!second.is_new());
        assert_eq!(first.record(), second.record());
        assert_eq!(store.count(), 1);
        // Reuse does not restamp
        assert_eq!(store.updated(), Some(STAMP));
    }

    #[test]
    fn test_distinct_buckets_get_disjoint_ids() {
        let mut store = VlanAllocationStore::default();
        let mut ids = VlanAllocatorSet::new(&RangeTable::default(), &store);

        let a = store
            .allocate(&bucket("Bus/Bay GOOSE Fast", UseCase::Bus, Some("Bus A")), &mut ids, STAMP)
            .unwrap();
        let b = store
            .allocate(&bucket("Bus/Bay GOOSE Fast", UseCase::Bus, Some("Bus B")), &mut ids, STAMP)
            .unwrap();
        let c = store
            .allocate(&bucket("Bus/Bay GOOSE Slow", UseCase::Bus, Some("Bus A")), &mut ids, STAMP)
            .unwrap();

        let ids: Vec<&str> = [&a, &b, &c].iter().map(|x| x.record().prot1_id.as_str()).collect();
        assert_eq!(ids, vec!["068", "069", "06A"]);
    }

    #[test]
    fn test_exhausted_range_returns_none() {
        let mut table = RangeTable::default();
        table.vlan.station.gse = crate::ranges::VlanRange::new(1000, 1001, 1000);
        let mut store = VlanAllocationStore::default();
        let mut ids = VlanAllocatorSet::new(&table, &store);

        assert!(store
            .allocate(&bucket("Station GOOSE", UseCase::Station, None), &mut ids, STAMP)
            .is_some());
        assert!(store
            .allocate(&bucket("Other GOOSE", UseCase::Station, None), &mut ids, STAMP)
            .is_none());
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = VlanAllocationStore::default();
        let mut ids = VlanAllocatorSet::new(&RangeTable::default(), &store);
        let a = store
            .allocate(&bucket("Station GOOSE", UseCase::Station, None), &mut ids, STAMP)
            .unwrap()
            .record()
            .clone();
        let b = store
            .allocate(&bucket("Bus/Bay GOOSE Fast", UseCase::Bus, Some("Bus A")), &mut ids, STAMP)
            .unwrap()
            .record()
            .clone();

        assert_eq!(store.remove(&[a.clone()]), 1);
        assert_eq!(store.remove(&[a]), 0);
        assert_eq!(store.records(), vec![&b]);
    }

    #[test]
    fn test_records_named_matches_bus_exactly() {
        let mut store = VlanAllocationStore::default();
        let mut ids = VlanAllocatorSet::new(&RangeTable::default(), &store);
        for bus in [Some("Bus A"), Some("Bus B"), None] {
            store.allocate(&bucket("Bus/Bay GOOSE Fast", UseCase::Bus, bus), &mut ids, STAMP);
        }

        let shared = store.records_named(UseCase::Bus, "Bus/Bay GOOSE Fast", None);
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].bus_name, None);

        let bus_b = store.records_named(UseCase::Bus, "Bus/Bay GOOSE Fast", Some("Bus B"));
        assert_eq!(bus_b.len(), 1);
        assert!(store.records_named(UseCase::Station, "Bus/Bay GOOSE Fast", None).is_empty());

        assert_eq!(store.remove(&shared), 1);
        let remaining: Vec<Option<&str>> = store.records_in(UseCase::Bus).iter().map(|r| r.bus_name.as_deref()).collect();
        assert_eq!(remaining, vec![Some("Bus A"), Some("Bus B")]);
    }

    #[test]
    fn test_remove_without_container() {
        let mut store = VlanAllocationStore::default();
        let record = VlanAllocationRecord {
            service_name: "Station SV".to_string(),
            service_type: ServiceTag::Smv,
            use_case: UseCase::Station,
            prot1_id: "41A".to_string(),
            prot2_id: "802".to_string(),
            bus_name: None,
        };
        assert_eq!(store.remove(&[record]), 0);
        assert_eq!(store.to_edit(), None);
    }

    #[test]
    fn test_records_listing_order() {
        let mut store = VlanAllocationStore::default();
        let mut ids = VlanAllocatorSet::new(&RangeTable::default(), &store);
        for (name, use_case, bus) in [
            ("Bus/Bay GOOSE Slow", UseCase::Bus, Some("Bus B")),
            ("Station SV", UseCase::Station, None),
            ("Bus/Bay GOOSE Fast", UseCase::Bus, Some("Bus A")),
            ("Station GOOSE", UseCase::Station, None),
        ] {
            store.allocate(&bucket(name, use_case, bus), &mut ids, STAMP);
        }

        let listed: Vec<&str> = store.records().iter().map(|r| r.service_name.as_str()).collect();
        assert_eq!(
            listed,
            vec!["Station GOOSE", "Station SV", "Bus/Bay GOOSE Fast", "Bus/Bay GOOSE Slow"]
        );
    }
}
