//! Allocation orchestrator.
//!
//! This module drives one allocation batch over a set of selected publishers,
//! from the used-value scan through VLAN classification to the final list of
//! document edits.
//!
//! A batch walks through fixed phases:
//!
//! `Init -> ScanExclusions -> ClassifyAndAllocateVlans -> AssignPerPublisherFields -> Emit`
//!
//! Nothing is written to the document before `Emit`, and `Emit` hands every
//! edit to the host in one atomic [`HostDocument::apply`] call. Failures are
//! per publisher: an exhausted range writes the field's all-ones sentinel and
//! the batch carries on.

use log::{debug, info, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::address::{AddressFormat, ExclusionSet, SequentialAllocator, UsedValueScan};
use crate::classify::{normalized_identifier, ClassificationEngine, FieldPolicy};
use crate::config::Config;
use crate::document::{
    AddressField, AddressHandle, AddressParameter, DocumentError, Edit, HostDocument, Publisher,
    PublisherKey, ServiceFamily,
};
use crate::protection::{ProtectionGroup, ProtectionGroupRule, SuffixDigitRule};
use crate::ranges::{AppIdPool, RangeTable};
use crate::utils::now_timestamp;
use crate::vlan::{
    UseCase, VlanAllocation, VlanAllocationRecord, VlanAllocationStore, VlanAllocatorSet, VlanBucket,
};

/// Phases of an allocation batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Init,
    ScanExclusions,
    ClassifyAndAllocateVlans,
    AssignPerPublisherFields,
    Emit,
}

impl BatchPhase {
    /// Following phase; `Emit` is terminal.
    pub fn next(self) -> Option<BatchPhase> {
        match self {
            BatchPhase::Init => Some(BatchPhase::ScanExclusions),
            BatchPhase::ScanExclusions => Some(BatchPhase::ClassifyAndAllocateVlans),
            BatchPhase::ClassifyAndAllocateVlans => Some(BatchPhase::AssignPerPublisherFields),
            BatchPhase::AssignPerPublisherFields => Some(BatchPhase::Emit),
            BatchPhase::Emit => None,
        }
    }
}

fn advance(phase: &mut BatchPhase) {
    if let Some(next) = phase.next() {
        debug!("Batch phase {:?} -> {:?}", phase, next);
        *phase = next;
    }
}

/// A range ran dry for one publisher; the field received the sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeExhausted {
    pub publisher: PublisherKey,
    pub parameter: AddressParameter,
    pub sentinel: String,
}

impl fmt::Display for RangeExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: no {} available, wrote {}",
            self.publisher, self.parameter, self.sentinel
        )
    }
}

/// Address tuple computed for one publisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherAssignment {
    pub publisher: PublisherKey,
    pub group: ProtectionGroup,
    pub identifier: String,
    pub mac: String,
    pub appid: String,
    /// `None` when the publisher is not VLAN-classified
    pub vlan_id: Option<String>,
    pub vlan_priority: u8,
    pub min_time: Option<u32>,
    pub max_time: Option<u32>,
    pub bucket: Option<VlanBucket>,
}

/// Outcome of one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub edits: Vec<Edit>,
    pub assignments: Vec<PublisherAssignment>,
    pub skipped_unaddressed: Vec<PublisherKey>,
    pub unclassified: Vec<PublisherKey>,
    pub exhausted: Vec<RangeExhausted>,
    pub vlans_created: Vec<VlanAllocationRecord>,
    /// The allocation container did not exist and was created
    pub container_created: bool,
}

impl BatchReport {
    pub fn assignment(&self, device: &str, name: &str) -> Option<&PublisherAssignment> {
        self.assignments
            .iter()
            .find(|a| a.publisher.device == device && a.publisher.name == name)
    }
}

/// Publisher accepted into the batch.
struct BatchItem {
    publisher: Publisher,
    /// Identifier after normalisation
    identifier: String,
    handle: AddressHandle,
    group: ProtectionGroup,
    bucket: Option<VlanBucket>,
    vlan_id: Option<String>,
}

/// Allocators for per-publisher fields, built once per batch.
struct FieldAllocators {
    mac: BTreeMap<(ServiceFamily, ProtectionGroup), SequentialAllocator>,
    appid: BTreeMap<AppIdPool, SequentialAllocator>,
}

pub struct AllocationEngine {
    ranges: RangeTable,
    classifier: ClassificationEngine,
    fields: FieldPolicy,
    resolver: Box<dyn ProtectionGroupRule>,
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl AllocationEngine {
    pub fn from_config(config: &Config) -> Self {
        Self {
            ranges: config.ranges,
            classifier: ClassificationEngine::new(&config.naming, config.allocation.unmapped_bus_policy),
            fields: FieldPolicy::new(&config.naming, config.timing, config.priority),
            resolver: Box::new(SuffixDigitRule::new(config.allocation.protection_digit)),
        }
    }

    /// Replace the protection group convention.
    pub fn with_resolver<R>(mut self, resolver: R) -> Self
    where
        R: ProtectionGroupRule + 'static,
    {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn ranges(&self) -> &RangeTable {
        &self.ranges
    }

    pub fn classifier(&self) -> &ClassificationEngine {
        &self.classifier
    }

    pub fn resolver(&self) -> &dyn ProtectionGroupRule {
        self.resolver.as_ref()
    }

    /// Allocate for `selected` and apply the result to `doc`.
    pub fn run<D>(&self, doc: &mut D, selected: &[Publisher]) -> Result<BatchReport, DocumentError>
    where
        D: HostDocument + ?Sized,
    {
        let report = self.plan(&*doc, selected, &now_timestamp());
        doc.apply(&report.edits)?;
        info!(
            "Applied {} edits for {} publishers ({} new VLAN allocations)",
            report.edits.len(),
            report.assignments.len(),
            report.vlans_created.len()
        );
        Ok(report)
    }

    /// Compute the edits for one batch without touching the document.
    ///
    /// `updated` is stamped on the allocation container when a record is
    /// created.
    pub fn plan<D>(&self, doc: &D, selected: &[Publisher], updated: &str) -> BatchReport
    where
        D: HostDocument + ?Sized,
    {
        let mut phase = BatchPhase::Init;
        let mut report = BatchReport::default();

        let mut items = Vec::with_capacity(selected.len());
        for publisher in selected {
            let Some(handle) = doc.lookup_communication_address(publisher) else {
                warn!("{}: no communication address, skipped", publisher.key);
                report.skipped_unaddressed.push(publisher.key.clone());
                continue;
            };
            items.push(BatchItem {
                publisher: publisher.clone(),
                identifier: normalized_identifier(publisher),
                handle,
                group: self.resolver.resolve(publisher.device()),
                bucket: None,
                vlan_id: None,
            });
        }
        info!(
            "Allocating for {} publishers ({} without address record)",
            items.len(),
            report.skipped_unaddressed.len()
        );

        advance(&mut phase);
        let mut allocators = self.build_field_allocators(doc, &items);
        let mut store = VlanAllocationStore::load(doc);
        let mut vlan_ids = VlanAllocatorSet::new(&self.ranges, &store);

        advance(&mut phase);
        self.allocate_vlans(doc, &mut items, &mut store, &mut vlan_ids, updated, &mut report);

        advance(&mut phase);
        for item in &items {
            self.assign_fields(doc, item, &mut allocators, &mut report);
        }

        advance(&mut phase);
        if !report.vlans_created.is_empty() {
            if let Some(edit) = store.to_edit() {
                report.edits.push(edit);
            }
        }
        report.container_created = store.created_on_demand();
        debug!("Batch finished in phase {:?} with {} edits", phase, report.edits.len());

        report
    }

    fn build_field_allocators<D>(&self, doc: &D, items: &[BatchItem]) -> FieldAllocators
    where
        D: HostDocument + ?Sized,
    {
        let selected: BTreeSet<AddressHandle> = items.iter().map(|item| item.handle).collect();
        let scan = |family: ServiceFamily, parameter: AddressParameter| {
            let values = doc.parameter_values(family, parameter);
            let released = ExclusionSet::from_partition(&values, &selected);
            UsedValueScan::scan(doc, family, parameter, &released)
        };

        let mut mac = BTreeMap::new();
        let mut appid = BTreeMap::new();
        for family in ServiceFamily::all() {
            let used_macs = scan(family, AddressParameter::Mac);
            for group in ProtectionGroup::all() {
                let range = self.ranges.mac_range(family, group);
                mac.insert((family, group), SequentialAllocator::new(range, AddressFormat::Mac, &used_macs));
            }

            let used_appids = scan(family, AddressParameter::AppId);
            for pool in AppIdPool::all().into_iter().filter(|pool| pool.family() == family) {
                let range = self.ranges.appid_range(pool);
                appid.insert(pool, SequentialAllocator::new(range, AddressFormat::AppId, &used_appids));
            }
        }

        FieldAllocators { mac, appid }
    }

    fn allocate_vlans<D>(
        &self,
        doc: &D,
        items: &mut [BatchItem],
        store: &mut VlanAllocationStore,
        vlan_ids: &mut VlanAllocatorSet,
        updated: &str,
        report: &mut BatchReport,
    ) where
        D: HostDocument + ?Sized,
    {
        let mut order = Vec::new();
        for (index, item) in items.iter_mut().enumerate() {
            let normalized = Publisher {
                key: item.publisher.key.clone(),
                identifier: item.identifier.clone(),
            };
            let bus = doc.bus_name_for_device(item.publisher.device());
            match self.classifier.classify(&normalized, bus.as_deref()) {
                Some(bucket) => {
                    item.bucket = Some(bucket);
                    order.push(index);
                }
                None => {
                    debug!("{}: not VLAN-classified", item.publisher.key);
                    report.unclassified.push(item.publisher.key.clone());
                }
            }
        }

        // Bus buckets by bus name, then the "no bus" bucket, then station
        order.sort_by_key(|&index| {
            let bucket = items[index].bucket.as_ref();
            let use_case = bucket.map(|b| b.use_case);
            let bus = bucket.and_then(|b| b.bus_name.clone());
            (use_case != Some(UseCase::Bus), bus.is_none(), bus)
        });

        for index in order {
            let item = &mut items[index];
            let Some(bucket) = item.bucket.as_ref() else {
                continue;
            };

            match store.allocate(bucket, vlan_ids, updated) {
                Some(allocation) => {
                    item.vlan_id = Some(allocation.record().id_for(item.group).to_string());
                    if let VlanAllocation::Created(record) = allocation {
                        report.vlans_created.push(record);
                    }
                }
                None => {
                    let exhausted = RangeExhausted {
                        publisher: item.publisher.key.clone(),
                        parameter: AddressParameter::VlanId,
                        sentinel: AddressFormat::VlanId.sentinel(),
                    };
                    warn!("{} ({})", exhausted, bucket);
                    item.vlan_id = Some(exhausted.sentinel.clone());
                    report.exhausted.push(exhausted);
                }
            }
        }
    }

    fn assign_fields<D>(
        &self,
        doc: &D,
        item: &BatchItem,
        allocators: &mut FieldAllocators,
        report: &mut BatchReport,
    ) where
        D: HostDocument + ?Sized,
    {
        let key = &item.publisher.key;
        let family = item.publisher.family();
        let name = item.publisher.name();

        let mut next_value = |allocator: Option<&mut SequentialAllocator>,
                              format: AddressFormat,
                              parameter: AddressParameter| {
            match allocator.and_then(|a| a.next_formatted()) {
                Some(value) => value,
                None => {
                    let exhausted = RangeExhausted {
                        publisher: key.clone(),
                        parameter,
                        sentinel: format.sentinel(),
                    };
                    warn!("{}", exhausted);
                    let sentinel = exhausted.sentinel.clone();
                    report.exhausted.push(exhausted);
                    sentinel
                }
            }
        };

        let mac = next_value(
            allocators.mac.get_mut(&(family, item.group)),
            AddressFormat::Mac,
            AddressParameter::Mac,
        );
        let pool = self.fields.appid_pool(family, item.group, name);
        let appid = next_value(allocators.appid.get_mut(&pool), AddressFormat::AppId, AddressParameter::AppId);
        let vlan_priority = self.fields.vlan_priority(family, name);

        let record = doc.communication_address(item.handle);
        let carries = |field: AddressField| record.and_then(|r| r.field(field)).is_some();
        let min_time = (family == ServiceFamily::Gse && carries(AddressField::MinTime)).then(|| self.fields.min_time(name));
        let max_time = (family == ServiceFamily::Gse && carries(AddressField::MaxTime)).then(|| self.fields.max_time());

        if item.identifier != item.publisher.identifier {
            report.edits.push(Edit::SetPublisherIdentifier {
                publisher: key.clone(),
                value: item.identifier.clone(),
            });
        }

        let mut set = |field: AddressField, value: String| {
            report.edits.push(Edit::SetAddressField {
                address: item.handle,
                field,
                value,
            });
        };
        set(AddressField::Parameter(AddressParameter::Mac), mac.clone());
        set(AddressField::Parameter(AddressParameter::AppId), appid.clone());
        if let Some(vlan_id) = &item.vlan_id {
            set(AddressField::Parameter(AddressParameter::VlanId), vlan_id.clone());
        }
        set(AddressField::Parameter(AddressParameter::VlanPriority), vlan_priority.to_string());
        if let Some(value) = min_time {
            set(AddressField::MinTime, value.to_string());
        }
        if let Some(value) = max_time {
            set(AddressField::MaxTime, value.to_string());
        }

        debug!("{}: MAC {} APPID {} VLAN {:?}", key, mac, appid, item.vlan_id);
        report.assignments.push(PublisherAssignment {
            publisher: key.clone(),
            group: item.group,
            identifier: item.identifier.clone(),
            mac,
            appid,
            vlan_id: item.vlan_id.clone(),
            vlan_priority,
            min_time,
            max_time,
            bucket: item.bucket.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::types::{
        AddressParams, Bay, Communication, CommunicationAddress, ConnectedAp, ControlBlock, Ied,
        SclDocument, SubNetwork, Substation,
    };

    fn control(family: ServiceFamily, name: &str, app_id: &str) -> ControlBlock {
        ControlBlock {
            family,
            name: name.to_string(),
            ld_inst: "LD0".to_string(),
            app_id: app_id.to_string(),
        }
    }

    fn address(cb_name: &str, params: AddressParams, timers: bool) -> CommunicationAddress {
        CommunicationAddress {
            ld_inst: "LD0".to_string(),
            cb_name: cb_name.to_string(),
            address: params,
            min_time: timers.then(|| "10".to_string()),
            max_time: timers.then(|| "2000".to_string()),
        }
    }

    fn ied(name: &str, blocks: Vec<ControlBlock>) -> Ied {
        Ied {
            name: name.to_string(),
            ied_type: "RELAY".to_string(),
            control_blocks: blocks,
        }
    }

    fn ap(ied_name: &str, gse: Vec<CommunicationAddress>, smv: Vec<CommunicationAddress>) -> ConnectedAp {
        ConnectedAp {
            ied_name: ied_name.to_string(),
            ap_name: "P1".to_string(),
            gse,
            smv,
        }
    }

    fn document(ieds: Vec<Ied>, aps: Vec<ConnectedAp>, bays: Vec<Bay>) -> SclDocument {
        SclDocument {
            ieds,
            communication: Some(Communication {
                vlan_allocation: None,
                sub_networks: vec![SubNetwork {
                    name: "StationBus".to_string(),
                    connected_aps: aps,
                }],
            }),
            substation: Substation { bays },
        }
    }

    fn bay(name: &str, ieds: &[&str]) -> Bay {
        Bay {
            name: name.to_string(),
            bus_connections: ieds.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn all_publishers(doc: &SclDocument) -> Vec<Publisher> {
        doc.publishers()
    }

    #[test]
    fn test_phase_sequence_ends_at_emit() {
        let mut phase = BatchPhase::Init;
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            phase = next;
            seen.push(phase);
        }
        assert_eq!(seen.len(), 5);
        assert_eq!(phase, BatchPhase::Emit);
    }

    #[test]
    fn test_unaddressed_publisher_is_skipped() {
        let doc = document(
            vec![ied("BAY1_P1", vec![control(ServiceFamily::Gse, "CtlA", "")])],
            vec![ap("BAY1_P1", vec![], vec![])],
            vec![],
        );
        let report = AllocationEngine::default().plan(&doc, &all_publishers(&doc), "t");
        assert_eq!(report.skipped_unaddressed.len(), 1);
        assert!(report.edits.is_empty());
        assert!(report.assignments.is_empty());
    }

    #[test]
    fn test_reassigns_own_value_back() {
        let params = AddressParams {
            mac: Some("01-0C-CD-01-00-00".to_string()),
            appid: Some("8001".to_string()),
            ..Default::default()
        };
        let doc = document(
            vec![ied("BAY1_P1", vec![control(ServiceFamily::Gse, "CtlA", "BAY1_P1_CtlA")])],
            vec![ap("BAY1_P1", vec![address("CtlA", params, false)], vec![])],
            vec![bay("Bus A", &["BAY1_P1"])],
        );
        let report = AllocationEngine::default().plan(&doc, &all_publishers(&doc), "t");
        let a = report.assignment("BAY1_P1", "CtlA").unwrap();
        assert_eq!(a.mac, "01-0C-CD-01-00-00");
        assert_eq!(a.appid, "8001");
        // Identifier already normalised
        assert!(!report
            .edits
            .iter()
            .any(|e| matches!(e, Edit::SetPublisherIdentifier { .. })));
    }

    #[test]
    fn test_values_held_outside_batch_stay_used() {
        let taken = AddressParams {
            mac: Some("01-0C-CD-01-00-00".to_string()),
            appid: Some("8001".to_string()),
            ..Default::default()
        };
        let doc = document(
            vec![ied(
                "BAY1_P1",
                vec![
                    control(ServiceFamily::Gse, "CtlA", ""),
                    control(ServiceFamily::Gse, "CtlB", ""),
                ],
            )],
            vec![ap(
                "BAY1_P1",
                vec![
                    address("CtlA", taken, false),
                    address("CtlB", AddressParams::default(), false),
                ],
                vec![],
            )],
            vec![bay("Bus A", &["BAY1_P1"])],
        );
        let selected: Vec<Publisher> = all_publishers(&doc).into_iter().filter(|p| p.name() == "CtlB").collect();
        let report = AllocationEngine::default().plan(&doc, &selected, "t");
        let b = report.assignment("BAY1_P1", "CtlB").unwrap();
        assert_eq!(b.mac, "01-0C-CD-01-00-01");
        assert_eq!(b.appid, "8002");
    }

    #[test]
    fn test_non_protection_goose_fields() {
        let doc = document(
            vec![ied("BAY1_P2", vec![control(ServiceFamily::Gse, "IndPos", "")])],
            vec![ap("BAY1_P2", vec![address("IndPos", AddressParams::default(), true)], vec![])],
            vec![bay("Bus A", &["BAY1_P2"])],
        );
        let report = AllocationEngine::default().plan(&doc, &all_publishers(&doc), "t");
        let a = report.assignment("BAY1_P2", "IndPos").unwrap();
        assert_eq!(a.group, ProtectionGroup::Two);
        assert_eq!(a.mac, "01-0C-CD-01-01-00");
        assert_eq!(a.appid, "0001");
        assert_eq!(a.vlan_priority, 5);
        assert_eq!(a.min_time, Some(100));
        assert_eq!(a.max_time, Some(1000));
        // Bus GOOSE P2 id = 104 + 96
        assert_eq!(a.vlan_id.as_deref(), Some("0C8"));
    }

    #[test]
    fn test_timers_not_created_when_absent() {
        let doc = document(
            vec![ied("BAY1_P1", vec![control(ServiceFamily::Gse, "CtlA", "")])],
            vec![ap("BAY1_P1", vec![address("CtlA", AddressParams::default(), false)], vec![])],
            vec![],
        );
        let report = AllocationEngine::default().plan(&doc, &all_publishers(&doc), "t");
        assert!(!report.edits.iter().any(|e| matches!(
            e,
            Edit::SetAddressField {
                field: AddressField::MinTime | AddressField::MaxTime,
                ..
            }
        )));
    }

    #[test]
    fn test_smv_identifier_and_station_vlan() {
        let doc = document(
            vec![ied("MU_P1", vec![control(ServiceFamily::Smv, "MSVCB01", "VTSelStn")])],
            vec![ap("MU_P1", vec![], vec![address("MSVCB01", AddressParams::default(), false)])],
            vec![],
        );
        let report = AllocationEngine::default().plan(&doc, &all_publishers(&doc), "t");
        let a = report.assignment("MU_P1", "MSVCB01").unwrap();
        assert_eq!(a.identifier, "MU_P1_VTSelStn");
        assert_eq!(a.mac, "01-0C-CD-04-00-00");
        assert_eq!(a.appid, "5000");
        assert_eq!(a.vlan_priority, 6);
        assert_eq!(a.min_time, None);
        assert_eq!(a.bucket.as_ref().map(|b| b.service_name.as_str()), Some("Station SV"));
        // Station SV P1 starts at 1050
        assert_eq!(a.vlan_id.as_deref(), Some("41A"));
        assert!(report.container_created);
    }

    #[test]
    fn test_unclassified_vlan_left_untouched() {
        let doc = document(
            vec![ied("BAY1_P1", vec![control(ServiceFamily::Gse, "Measurement", "")])],
            vec![ap("BAY1_P1", vec![address("Measurement", AddressParams::default(), false)], vec![])],
            vec![bay("Bus A", &["BAY1_P1"])],
        );
        let report = AllocationEngine::default().plan(&doc, &all_publishers(&doc), "t");
        assert_eq!(report.unclassified.len(), 1);
        assert!(!report.edits.iter().any(|e| matches!(
            e,
            Edit::SetAddressField {
                field: AddressField::Parameter(AddressParameter::VlanId),
                ..
            } | Edit::ReplaceVlanAllocation(_)
        )));
    }

    #[test]
    fn test_exhausted_mac_writes_sentinel_and_continues() {
        let mut config = Config::default();
        config.ranges.mac.gse.p1 = crate::ranges::AllocationRange::new(0x010C_CD01_0000, 0x010C_CD01_0001);
        let doc = document(
            vec![ied(
                "BAY1_P1",
                vec![
                    control(ServiceFamily::Gse, "CtlA", ""),
                    control(ServiceFamily::Gse, "CtlB", ""),
                ],
            )],
            vec![ap(
                "BAY1_P1",
                vec![
                    address("CtlA", AddressParams::default(), false),
                    address("CtlB", AddressParams::default(), false),
                ],
                vec![],
            )],
            vec![bay("Bus A", &["BAY1_P1"])],
        );
        let report = AllocationEngine::from_config(&config).plan(&doc, &all_publishers(&doc), "t");
        assert_eq!(report.assignments.len(), 2);
        assert_eq!(report.exhausted.len(), 1);
        assert_eq!(report.exhausted[0].parameter, AddressParameter::Mac);
        assert_eq!(report.assignment("BAY1_P1", "CtlB").unwrap().mac, "FF-FF-FF-FF-FF-FF");
        assert_eq!(report.assignment("BAY1_P1", "CtlB").unwrap().appid, "8002");
    }

    #[test]
    fn test_exhausted_vlan_writes_sentinel() {
        let mut config = Config::default();
        config.ranges.vlan.bus.gse = crate::ranges::VlanRange::new(104, 105, 96);
        let doc = document(
            vec![
                ied("A_P1", vec![control(ServiceFamily::Gse, "CtlA", "")]),
                ied("B_P1", vec![control(ServiceFamily::Gse, "CtlB", "")]),
            ],
            vec![
                ap("A_P1", vec![address("CtlA", AddressParams::default(), false)], vec![]),
                ap("B_P1", vec![address("CtlB", AddressParams::default(), false)], vec![]),
            ],
            vec![bay("Bus A", &["A_P1"]), bay("Bus B", &["B_P1"])],
        );
        let report = AllocationEngine::from_config(&config).plan(&doc, &all_publishers(&doc), "t");
        assert_eq!(report.assignment("A_P1", "CtlA").unwrap().vlan_id.as_deref(), Some("068"));
        assert_eq!(report.assignment("B_P1", "CtlB").unwrap().vlan_id.as_deref(), Some("FFF"));
        assert_eq!(report.vlans_created.len(), 1);
        assert_eq!(report.exhausted.len(), 1);
    }

    #[test]
    fn test_bus_groups_minted_in_bus_name_order() {
        let doc = document(
            vec![
                ied("Z_P1", vec![control(ServiceFamily::Gse, "CtlZ", "")]),
                ied("A_P1", vec![control(ServiceFamily::Gse, "CtlA", "")]),
            ],
            vec![
                ap("Z_P1", vec![address("CtlZ", AddressParams::default(), false)], vec![]),
                ap("A_P1", vec![address("CtlA", AddressParams::default(), false)], vec![]),
            ],
            vec![bay("Bus B", &["Z_P1"]), bay("Bus A", &["A_P1"])],
        );
        let report = AllocationEngine::default().plan(&doc, &all_publishers(&doc), "t");
        assert_eq!(report.assignment("A_P1", "CtlA").unwrap().vlan_id.as_deref(), Some("068"));
        assert_eq!(report.assignment("Z_P1", "CtlZ").unwrap().vlan_id.as_deref(), Some("069"));
    }

    #[test]
    fn test_custom_resolver() {
        let doc = document(
            vec![ied("BAY1_P1", vec![control(ServiceFamily::Gse, "CtlA", "")])],
            vec![ap("BAY1_P1", vec![address("CtlA", AddressParams::default(), false)], vec![])],
            vec![],
        );
        let engine = AllocationEngine::default().with_resolver(|_: &str| ProtectionGroup::Two);
        let report = engine.plan(&doc, &all_publishers(&doc), "t");
        assert_eq!(report.assignment("BAY1_P1", "CtlA").unwrap().mac, "01-0C-CD-01-01-00");
    }
}
