//! Multicast address allocation.
//!
//! This module holds the collision-avoidance machinery shared by every
//! parameter the engine assigns:
//!
//! - `format`: textual rendering and parsing of MAC, APPID and VLAN values
//! - `scan`: collection of values already present in a document, minus the
//!   values being released by the current batch
//! - `allocator`: sequential lowest-free-value generator over a range

pub mod format;
pub mod scan;
pub mod allocator;

// Re-export commonly used types
pub use format::{display_vlan, AddressFormat};
pub use scan::{ExclusionSet, UsedValueScan};
pub use allocator::SequentialAllocator;
