//! Document model types.
//!
//! The substation configuration document is modelled as plain serde
//! structures persisted as YAML. Only the parts the allocation engine reads or
//! writes are represented: IEDs with their GOOSE/SMV control blocks, the
//! communication section holding per-publisher address records and the VLAN
//! allocation container, and bay-to-IED bus membership.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::vlan::VlanAllocationContainer;

/// Multicast service family of a publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ServiceFamily {
    /// GOOSE control block
    #[serde(rename = "GSE")]
    Gse,
    /// Sampled Value control block
    #[serde(rename = "SMV")]
    Smv,
}

impl ServiceFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceFamily::Gse => "GSE",
            ServiceFamily::Smv => "SMV",
        }
    }

    pub fn all() -> [ServiceFamily; 2] {
        [ServiceFamily::Gse, ServiceFamily::Smv]
    }
}

impl fmt::Display for ServiceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed parameters of a communication address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AddressParameter {
    Mac,
    AppId,
    VlanId,
    VlanPriority,
}

impl fmt::Display for AddressParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AddressParameter::Mac => "MAC-Address",
            AddressParameter::AppId => "APPID",
            AddressParameter::VlanId => "VLAN-ID",
            AddressParameter::VlanPriority => "VLAN-PRIORITY",
        };
        f.write_str(name)
    }
}

/// Any field of an address record the engine may write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressField {
    Parameter(AddressParameter),
    MinTime,
    MaxTime,
}

/// Identity of a publisher inside the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PublisherKey {
    pub device: String,
    pub ld_inst: String,
    pub name: String,
    pub family: ServiceFamily,
}

impl fmt::Display for PublisherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({})", self.device, self.name, self.family)
    }
}

/// A GOOSE or SMV control block as seen by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publisher {
    pub key: PublisherKey,
    /// appID for GOOSE, smvID for Sampled Values
    pub identifier: String,
}

impl Publisher {
    pub fn device(&self) -> &str {
        &self.key.device
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn family(&self) -> ServiceFamily {
        self.key.family
    }
}

/// Opaque reference to an address record, resolved by the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AddressHandle {
    pub(crate) sub_network: usize,
    pub(crate) connected_ap: usize,
    pub(crate) family: ServiceFamily,
    pub(crate) index: usize,
}

impl AddressHandle {
    pub fn family(&self) -> ServiceFamily {
        self.family
    }
}

// ============================================================================
// Persisted layout
// ============================================================================

/// Root of a substation configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SclDocument {
    #[serde(default)]
    pub ieds: Vec<Ied>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication: Option<Communication>,
    #[serde(default)]
    pub substation: Substation,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ied {
    pub name: String,
    #[serde(rename = "type", default)]
    pub ied_type: String,
    #[serde(default)]
    pub control_blocks: Vec<ControlBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlBlock {
    pub family: ServiceFamily,
    pub name: String,
    pub ld_inst: String,
    /// appID (GOOSE) or smvID (Sampled Values)
    #[serde(default)]
    pub app_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Communication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan_allocation: Option<VlanAllocationContainer>,
    #[serde(default)]
    pub sub_networks: Vec<SubNetwork>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubNetwork {
    pub name: String,
    #[serde(default)]
    pub connected_aps: Vec<ConnectedAp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectedAp {
    pub ied_name: String,
    #[serde(default)]
    pub ap_name: String,
    #[serde(default)]
    pub gse: Vec<CommunicationAddress>,
    #[serde(default)]
    pub smv: Vec<CommunicationAddress>,
}

impl ConnectedAp {
    pub fn addresses(&self, family: ServiceFamily) -> &[CommunicationAddress] {
        match family {
            ServiceFamily::Gse => &self.gse,
            ServiceFamily::Smv => &self.smv,
        }
    }

    pub(crate) fn addresses_mut(&mut self, family: ServiceFamily) -> &mut Vec<CommunicationAddress> {
        match family {
            ServiceFamily::Gse => &mut self.gse,
            ServiceFamily::Smv => &mut self.smv,
        }
    }
}

/// Network-address record of one publisher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommunicationAddress {
    pub ld_inst: String,
    pub cb_name: String,
    #[serde(default)]
    pub address: AddressParams,
    /// GOOSE only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_time: Option<String>,
    /// GOOSE only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_time: Option<String>,
}

impl CommunicationAddress {
    pub fn parameter(&self, parameter: AddressParameter) -> Option<&str> {
        let value = match parameter {
            AddressParameter::Mac => &self.address.mac,
            AddressParameter::AppId => &self.address.appid,
            AddressParameter::VlanId => &self.address.vlan_id,
            AddressParameter::VlanPriority => &self.address.vlan_priority,
        };
        value.as_deref()
    }

    pub fn field(&self, field: AddressField) -> Option<&str> {
        match field {
            AddressField::Parameter(parameter) => self.parameter(parameter),
            AddressField::MinTime => self.min_time.as_deref(),
            AddressField::MaxTime => self.max_time.as_deref(),
        }
    }

    pub(crate) fn set_field(&mut self, field: AddressField, value: String) {
        let slot = match field {
            AddressField::Parameter(AddressParameter::Mac) => &mut self.address.mac,
            AddressField::Parameter(AddressParameter::AppId) => &mut self.address.appid,
            AddressField::Parameter(AddressParameter::VlanId) => &mut self.address.vlan_id,
            AddressField::Parameter(AddressParameter::VlanPriority) => &mut self.address.vlan_priority,
            AddressField::MinTime => &mut self.min_time,
            AddressField::MaxTime => &mut self.max_time,
        };
        *slot = Some(value);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressParams {
    #[serde(rename = "MAC-Address", default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(rename = "APPID", default, skip_serializing_if = "Option::is_none")]
    pub appid: Option<String>,
    #[serde(rename = "VLAN-ID", default, skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<String>,
    #[serde(rename = "VLAN-PRIORITY", default, skip_serializing_if = "Option::is_none")]
    pub vlan_priority: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Substation {
    #[serde(default)]
    pub bays: Vec<Bay>,
}

/// A bay whose bus physical connection lists the IEDs attached to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bay {
    pub name: String,
    #[serde(default)]
    pub bus_connections: Vec<String>,
}
