//! Publisher selection.
//!
//! Narrows the publishers of a document down to the set an allocation batch
//! should touch: by service family, protection group, bus, presence of an
//! address record, or an explicit list of `IED/control block` identities.

use log::debug;

use super::host::HostDocument;
use super::types::{AddressParameter, Publisher, ServiceFamily};
use crate::protection::{ProtectionGroup, ProtectionGroupRule};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublisherFilter {
    pub goose: bool,
    pub sampled_values: bool,
    pub protection1: bool,
    pub protection2: bool,
    /// Only publishers whose device is connected to this bus
    pub bus: Option<String>,
    /// Drop publishers without an address record
    pub hide_unaddressed: bool,
    /// `IED/control block` identities; empty selects everything
    pub identities: Vec<String>,
}

impl Default for PublisherFilter {
    fn default() -> Self {
        Self {
            goose: true,
            sampled_values: true,
            protection1: true,
            protection2: true,
            bus: None,
            hide_unaddressed: true,
            identities: Vec::new(),
        }
    }
}

impl PublisherFilter {
    fn accepts_family(&self, family: ServiceFamily) -> bool {
        match family {
            ServiceFamily::Gse => self.goose,
            ServiceFamily::Smv => self.sampled_values,
        }
    }

    fn accepts_group(&self, group: ProtectionGroup) -> bool {
        match group {
            ProtectionGroup::One => self.protection1,
            ProtectionGroup::Two => self.protection2,
        }
    }

    fn accepts_identity(&self, publisher: &Publisher) -> bool {
        self.identities.is_empty()
            || self
                .identities
                .iter()
                .any(|id| *id == format!("{}/{}", publisher.device(), publisher.name()))
    }
}

/// Publishers matching `filter`, sorted by their current MAC address.
pub fn select_publishers<D, R>(doc: &D, filter: &PublisherFilter, rule: &R) -> Vec<Publisher>
where
    D: HostDocument + ?Sized,
    R: ProtectionGroupRule + ?Sized,
{
    let mut selected: Vec<(String, Publisher)> = doc
        .publishers()
        .into_iter()
        .filter(|publisher| {
            let handle = doc.lookup_communication_address(publisher);
            filter.accepts_family(publisher.family())
                && filter.accepts_group(rule.resolve(publisher.device()))
                && filter.accepts_identity(publisher)
                && match &filter.bus {
                    Some(bus) => doc.bus_name_for_device(publisher.device()).as_ref() == Some(bus),
                    None => true,
                }
                && (!filter.hide_unaddressed || handle.is_some())
        })
        .map(|publisher| {
            let mac = doc
                .lookup_communication_address(&publisher)
                .and_then(|handle| doc.communication_address(handle))
                .and_then(|address| address.parameter(AddressParameter::Mac))
                .unwrap_or_default()
                .to_string();
            (mac, publisher)
        })
        .collect();

    // Stable sort keeps document order among equal MACs
    selected.sort_by(|(a, _), (b, _)| a.cmp(b));
    debug!("Selected {} publishers", selected.len());
    selected.into_iter().map(|(_, publisher)| publisher).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::types::{
        AddressParams, Bay, Communication, CommunicationAddress, ConnectedAp, ControlBlock, Ied,
        SclDocument, SubNetwork, Substation,
    };
    use crate::protection::SuffixDigitRule;

    fn goose(name: &str) -> ControlBlock {
        ControlBlock {
            family: ServiceFamily::Gse,
            name: name.to_string(),
            ld_inst: "CTRL".to_string(),
            app_id: String::new(),
        }
    }

    fn address(cb_name: &str, mac: &str) -> CommunicationAddress {
        CommunicationAddress {
            ld_inst: "CTRL".to_string(),
            cb_name: cb_name.to_string(),
            address: AddressParams {
                mac: Some(mac.to_string()),
                ..Default::default()
            },
            min_time: None,
            max_time: None,
        }
    }

    fn document() -> SclDocument {
        SclDocument {
            ieds: vec![
                Ied {
                    name: "BAY1_P1".to_string(),
                    ied_type: String::new(),
                    control_blocks: vec![goose("CtlB"), goose("CtlA")],
                },
                Ied {
                    name: "BAY1_P2".to_string(),
                    ied_type: String::new(),
                    control_blocks: vec![
                        goose("IndPos"),
                        ControlBlock {
                            family: ServiceFamily::Smv,
                            name: "MSVCB01".to_string(),
                            ld_inst: "MU".to_string(),
                            app_id: String::new(),
                        },
                    ],
                },
            ],
            communication: Some(Communication {
                vlan_allocation: None,
                sub_networks: vec![SubNetwork {
                    name: "Bus".to_string(),
                    connected_aps: vec![
                        ConnectedAp {
                            ied_name: "BAY1_P1".to_string(),
                            ap_name: "P1".to_string(),
                            gse: vec![
                                address("CtlB", "01-0C-CD-01-00-02"),
                                address("CtlA", "01-0C-CD-01-00-01"),
                            ],
                            smv: vec![],
                        },
                        ConnectedAp {
                            ied_name: "BAY1_P2".to_string(),
                            ap_name: "P1".to_string(),
                            gse: vec![address("IndPos", "01-0C-CD-01-01-00")],
                            smv: vec![],
                        },
                    ],
                }],
            }),
            substation: Substation {
                bays: vec![Bay {
                    name: "Bus A".to_string(),
                    bus_connections: vec!["BAY1_P1".to_string()],
                }],
            },
        }
    }

    fn names(publishers: &[Publisher]) -> Vec<String> {
        publishers.iter().map(|p| p.name().to_string()).collect()
    }

    #[test]
    fn test_default_filter_hides_unaddressed_and_sorts_by_mac() {
        let doc = document();
        let selected = select_publishers(&doc, &PublisherFilter::default(), &SuffixDigitRule::default());
        assert_eq!(names(&selected), vec!["CtlA", "CtlB", "IndPos"]);
    }

    #[test]
    fn test_show_unaddressed() {
        let doc = document();
        let filter = PublisherFilter {
            hide_unaddressed: false,
            ..Default::default()
        };
        let selected = select_publishers(&doc, &filter, &SuffixDigitRule::default());
        assert_eq!(selected.len(), 4);
        // Publishers without a MAC sort first
        assert_eq!(selected[0].name(), "MSVCB01");
    }

    #[test]
    fn test_family_group_and_bus_filters() {
        let doc = document();
        let rule = SuffixDigitRule::default();

        let prot2_only = PublisherFilter {
            protection1: false,
            ..Default::default()
        };
        assert_eq!(names(&select_publishers(&doc, &prot2_only, &rule)), vec!["IndPos"]);

        let on_bus = PublisherFilter {
            bus: Some("Bus A".to_string()),
            ..Default::default()
        };
        assert_eq!(names(&select_publishers(&doc, &on_bus, &rule)), vec!["CtlA", "CtlB"]);

        let no_goose = PublisherFilter {
            goose: false,
            hide_unaddressed: false,
            ..Default::default()
        };
        assert_eq!(names(&select_publishers(&doc, &no_goose, &rule)), vec!["MSVCB01"]);
    }

    #[test]
    fn test_identity_filter() {
        let doc = document();
        let filter = PublisherFilter {
            identities: vec!["BAY1_P1/CtlB".to_string()],
            ..Default::default()
        };
        let selected = select_publishers(&doc, &filter, &SuffixDigitRule::default());
        assert_eq!(names(&selected), vec!["CtlB"]);
    }
}
