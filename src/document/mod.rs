//! Substation document access.
//!
//! The allocation engine depends only on the [`HostDocument`] trait and the
//! [`Edit`] list it produces. [`SclDocument`] is the YAML-backed document the
//! command-line tool operates on.

pub mod types;
pub mod host;
pub mod scl;
pub mod loader;
pub mod filter;

pub use types::{
    AddressField, AddressHandle, AddressParameter, CommunicationAddress, Publisher, PublisherKey,
    SclDocument, ServiceFamily,
};
pub use host::{DocumentError, Edit, HostDocument};
pub use loader::{load_document, save_document};
pub use filter::{select_publishers, PublisherFilter};
