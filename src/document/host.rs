//! Host document interface.
//!
//! The allocation engine never touches a concrete document layout. It reads
//! through [`HostDocument`] and describes every change as an [`Edit`]; the
//! host applies a whole batch of edits at once or rejects it.

use super::types::{
    AddressField, AddressHandle, AddressParameter, CommunicationAddress, Publisher, PublisherKey,
    ServiceFamily,
};
use crate::vlan::VlanAllocationContainer;

/// Errors raised by a host document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Unknown publisher: {0}")]
    UnknownPublisher(String),

    #[error("Unknown address record: {0:?}")]
    UnknownAddress(AddressHandle),

    #[error("Document has no Communication section")]
    MissingCommunication,

    #[error("Failed to read document '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse document '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("Failed to write document '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// A discrete change to the host document.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// Replace the appID/smvID of a control block
    SetPublisherIdentifier { publisher: PublisherKey, value: String },
    /// Replace (or create) one field of an address record
    SetAddressField {
        address: AddressHandle,
        field: AddressField,
        value: String,
    },
    /// Replace the VLAN allocation container, creating it if absent
    ReplaceVlanAllocation(VlanAllocationContainer),
}

/// Read/write access the engine needs from a substation document.
pub trait HostDocument {
    /// All GOOSE and SMV publishers in document order.
    fn publishers(&self) -> Vec<Publisher>;

    /// Resolve a publisher to its address record, if it has one.
    fn lookup_communication_address(&self, publisher: &Publisher) -> Option<AddressHandle>;

    fn communication_address(&self, handle: AddressHandle) -> Option<&CommunicationAddress>;

    /// Bus the device is physically connected to.
    fn bus_name_for_device(&self, device: &str) -> Option<String>;

    /// Every value of `parameter` present on an address record of `family`.
    fn parameter_values(
        &self,
        family: ServiceFamily,
        parameter: AddressParameter,
    ) -> Vec<(AddressHandle, String)>;

    fn has_communication(&self) -> bool;

    fn vlan_allocation(&self) -> Option<&VlanAllocationContainer>;

    /// Apply all edits or none of them.
    fn apply(&mut self, edits: &[Edit]) -> Result<(), DocumentError>;
}
