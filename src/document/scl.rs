//! [`HostDocument`] implementation for the YAML substation document.

use log::{debug, warn};

use super::host::{DocumentError, Edit, HostDocument};
use super::types::{
    AddressHandle, AddressParameter, CommunicationAddress, ControlBlock, Publisher, PublisherKey,
    SclDocument, ServiceFamily,
};
use crate::utils::validation::validate_parameter_format;
use crate::vlan::VlanAllocationContainer;

impl SclDocument {
    fn control_block_mut(&mut self, key: &PublisherKey) -> Option<&mut ControlBlock> {
        self.ieds
            .iter_mut()
            .find(|ied| ied.name == key.device)?
            .control_blocks
            .iter_mut()
            .find(|cb| cb.family == key.family && cb.name == key.name && cb.ld_inst == key.ld_inst)
    }

    fn address_mut(&mut self, handle: AddressHandle) -> Option<&mut CommunicationAddress> {
        self.communication
            .as_mut()?
            .sub_networks
            .get_mut(handle.sub_network)?
            .connected_aps
            .get_mut(handle.connected_ap)?
            .addresses_mut(handle.family)
            .get_mut(handle.index)
    }

    fn address_handles(&self, family: ServiceFamily) -> Vec<AddressHandle> {
        let mut handles = Vec::new();
        if let Some(communication) = &self.communication {
            for (sn, sub_network) in communication.sub_networks.iter().enumerate() {
                for (ap, connected_ap) in sub_network.connected_aps.iter().enumerate() {
                    for index in 0..connected_ap.addresses(family).len() {
                        handles.push(AddressHandle {
                            sub_network: sn,
                            connected_ap: ap,
                            family,
                            index,
                        });
                    }
                }
            }
        }
        handles
    }

    /// Log malformed address values. They are kept in the document but
    /// ignored by the used-value scan.
    pub fn check_address_formats(&self) -> usize {
        let mut malformed = 0;
        for family in ServiceFamily::all() {
            for handle in self.address_handles(family) {
                let Some(address) = self.communication_address(handle) else {
                    continue;
                };
                for parameter in [
                    AddressParameter::Mac,
                    AddressParameter::AppId,
                    AddressParameter::VlanId,
                    AddressParameter::VlanPriority,
                ] {
                    if let Some(value) = address.parameter(parameter) {
                        if let Err(e) = validate_parameter_format(parameter, value) {
                            warn!("{} {}/{}: {}", family, address.ld_inst, address.cb_name, e);
                            malformed += 1;
                        }
                    }
                }
            }
        }
        malformed
    }

    fn check_edit(&self, edit: &Edit) -> Result<(), DocumentError> {
        match edit {
            Edit::SetPublisherIdentifier { publisher, .. } => {
                let known = self.ieds.iter().any(|ied| {
                    ied.name == publisher.device
                        && ied.control_blocks.iter().any(|cb| {
                            cb.family == publisher.family
                                && cb.name == publisher.name
                                && cb.ld_inst == publisher.ld_inst
                        })
                });
                if !known {
                    return Err(DocumentError::UnknownPublisher(publisher.to_string()));
                }
            }
            Edit::SetAddressField { address, .. } => {
                if self.communication_address(*address).is_none() {
                    return Err(DocumentError::UnknownAddress(*address));
                }
            }
            Edit::ReplaceVlanAllocation(_) => {
                if self.communication.is_none() {
                    return Err(DocumentError::MissingCommunication);
                }
            }
        }
        Ok(())
    }
}

impl HostDocument for SclDocument {
    fn publishers(&self) -> Vec<Publisher> {
        self.ieds
            .iter()
            .flat_map(|ied| {
                ied.control_blocks.iter().map(move |cb| Publisher {
                    key: PublisherKey {
                        device: ied.name.clone(),
                        ld_inst: cb.ld_inst.clone(),
                        name: cb.name.clone(),
                        family: cb.family,
                    },
                    identifier: cb.app_id.clone(),
                })
            })
            .collect()
    }

    fn lookup_communication_address(&self, publisher: &Publisher) -> Option<AddressHandle> {
        let communication = self.communication.as_ref()?;
        for (sn, sub_network) in communication.sub_networks.iter().enumerate() {
            for (ap, connected_ap) in sub_network.connected_aps.iter().enumerate() {
                if connected_ap.ied_name != publisher.key.device {
                    continue;
                }
                let found = connected_ap
                    .addresses(publisher.key.family)
                    .iter()
                    .position(|a| a.ld_inst == publisher.key.ld_inst && a.cb_name == publisher.key.name);
                if let Some(index) = found {
                    return Some(AddressHandle {
                        sub_network: sn,
                        connected_ap: ap,
                        family: publisher.key.family,
                        index,
                    });
                }
            }
        }
        None
    }

    fn communication_address(&self, handle: AddressHandle) -> Option<&CommunicationAddress> {
        self.communication
            .as_ref()?
            .sub_networks
            .get(handle.sub_network)?
            .connected_aps
            .get(handle.connected_ap)?
            .addresses(handle.family)
            .get(handle.index)
    }

    fn bus_name_for_device(&self, device: &str) -> Option<String> {
        self.substation
            .bays
            .iter()
            .rev()
            .find(|bay| bay.bus_connections.iter().any(|ied| ied == device))
            .map(|bay| bay.name.clone())
    }

    fn parameter_values(
        &self,
        family: ServiceFamily,
        parameter: AddressParameter,
    ) -> Vec<(AddressHandle, String)> {
        self.address_handles(family)
            .into_iter()
            .filter_map(|handle| {
                let value = self.communication_address(handle)?.parameter(parameter)?;
                Some((handle, value.to_string()))
            })
            .collect()
    }

    fn has_communication(&self) -> bool {
        self.communication.is_some()
    }

    fn vlan_allocation(&self) -> Option<&VlanAllocationContainer> {
        self.communication.as_ref()?.vlan_allocation.as_ref()
    }

    fn apply(&mut self, edits: &[Edit]) -> Result<(), DocumentError> {
        for edit in edits {
            self.check_edit(edit)?;
        }

        for edit in edits {
            match edit {
                Edit::SetPublisherIdentifier { publisher, value } => {
                    if let Some(cb) = self.control_block_mut(publisher) {
                        debug!("{}: identifier '{}' -> '{}'", publisher, cb.app_id, value);
                        cb.app_id = value.clone();
                    }
                }
                Edit::SetAddressField { address, field, value } => {
                    if let Some(record) = self.address_mut(*address) {
                        record.set_field(*field, value.clone());
                    }
                }
                Edit::ReplaceVlanAllocation(container) => {
                    if let Some(communication) = self.communication.as_mut() {
                        communication.vlan_allocation = Some(container.clone());
                    }
                }
            }
        }

        debug!("Applied {} edits", edits.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::types::{
        AddressField, AddressParams, Bay, Communication, ConnectedAp, Ied, SubNetwork, Substation,
    };

    fn sample_document() -> SclDocument {
        SclDocument {
            ieds: vec![Ied {
                name: "BAY1_P1".to_string(),
                ied_type: "RELAY".to_string(),
                control_blocks: vec![
                    ControlBlock {
                        family: ServiceFamily::Gse,
                        name: "CtlBreaker".to_string(),
                        ld_inst: "CTRL".to_string(),
                        app_id: "old".to_string(),
                    },
                    ControlBlock {
                        family: ServiceFamily::Smv,
                        name: "MSVCB01".to_string(),
                        ld_inst: "MU".to_string(),
                        app_id: "TEMPLATE".to_string(),
                    },
                ],
            }],
            communication: Some(Communication {
                vlan_allocation: None,
                sub_networks: vec![SubNetwork {
                    name: "StationBus".to_string(),
                    connected_aps: vec![ConnectedAp {
                        ied_name: "BAY1_P1".to_string(),
                        ap_name: "P1".to_string(),
                        gse: vec![CommunicationAddress {
                            ld_inst: "CTRL".to_string(),
                            cb_name: "CtlBreaker".to_string(),
                            address: AddressParams {
                                mac: Some("01-0C-CD-01-00-05".to_string()),
                                appid: Some("8005".to_string()),
                                vlan_id: None,
                                vlan_priority: None,
                            },
                            min_time: Some("10".to_string()),
                            max_time: None,
                        }],
                        smv: vec![],
                    }],
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

    #[test]
    fn test_publishers_and_lookup() {
        let doc = sample_document();
        let publishers = doc.publishers();
        assert_eq!(publishers.len(), 2);

        let goose = &publishers[0];
        let handle = doc.lookup_communication_address(goose).unwrap();
        let address = doc.communication_address(handle).unwrap();
        assert_eq!(address.cb_name, "CtlBreaker");

        // The SMV control block has no address record
        assert!(doc.lookup_communication_address(&publishers[1]).is_none());
    }

    #[test]
    fn test_bus_membership() {
        let doc = sample_document();
        assert_eq!(doc.bus_name_for_device("BAY1_P1").as_deref(), Some("Bus A"));
        assert_eq!(doc.bus_name_for_device("BAY9_P1"), None);
    }

    #[test]
    fn test_parameter_values() {
        let doc = sample_document();
        let macs = doc.parameter_values(ServiceFamily::Gse, AddressParameter::Mac);
        assert_eq!(macs.len(), 1);
        assert_eq!(macs[0].1, "01-0C-CD-01-00-05");
        assert!(doc.parameter_values(ServiceFamily::Gse, AddressParameter::VlanId).is_empty());
        assert!(doc.parameter_values(ServiceFamily::Smv, AddressParameter::Mac).is_empty());
    }

    #[test]
    fn test_apply_sets_and_creates_fields() {
        let mut doc = sample_document();
        let publisher = doc.publishers().remove(0);
        let handle = doc.lookup_communication_address(&publisher).unwrap();

        doc.apply(&[
            Edit::SetAddressField {
                address: handle,
                field: AddressField::Parameter(AddressParameter::VlanId),
                value: "068".to_string(),
            },
            Edit::SetPublisherIdentifier {
                publisher: publisher.key.clone(),
                value: "BAY1_P1_CtlBreaker".to_string(),
            },
        ])
        .unwrap();

        let address = doc.communication_address(handle).unwrap();
        assert_eq!(address.parameter(AddressParameter::VlanId), Some("068"));
        assert_eq!(doc.publishers()[0].identifier, "BAY1_P1_CtlBreaker");
    }

    #[test]
    fn test_apply_is_all_or_nothing() {
        let mut doc = sample_document();
        let publisher = doc.publishers().remove(0);
        let handle = doc.lookup_communication_address(&publisher).unwrap();
        let bogus = AddressHandle {
            sub_network: 7,
            connected_ap: 0,
            family: ServiceFamily::Gse,
            index: 0,
        };

        let result = doc.apply(&[
            Edit::SetAddressField {
                address: handle,
                field: AddressField::MinTime,
                value: "4".to_string(),
            },
            Edit::SetAddressField {
                address: bogus,
                field: AddressField::MinTime,
                value: "4".to_string(),
            },
        ]);

        assert!(matches!(result, Err(DocumentError::UnknownAddress(_))));
        // First edit must not have been applied
        assert_eq!(doc.communication_address(handle).unwrap().min_time.as_deref(), Some("10"));
    }

    #[test]
    fn test_replace_allocation_requires_communication() {
        let mut doc = SclDocument::default();
        let result = doc.apply(&[Edit::ReplaceVlanAllocation(VlanAllocationContainer::default())]);
        assert!(matches!(result, Err(DocumentError::MissingCommunication)));
    }

    #[test]
    fn test_check_address_formats() {
        let mut doc = sample_document();
        assert_eq!(doc.check_address_formats(), 0);

        let publisher = doc.publishers().remove(0);
        let handle = doc.lookup_communication_address(&publisher).unwrap();
        doc.apply(&[Edit::SetAddressField {
            address: handle,
            field: AddressField::Parameter(AddressParameter::Mac),
            value: "not-a-mac".to_string(),
        }])
        .unwrap();
        assert_eq!(doc.check_address_formats(), 1);
    }
}
