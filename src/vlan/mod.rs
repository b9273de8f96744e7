//! Shared VLAN allocation.
//!
//! VLAN ids are not allocated per publisher. Publishers are classified into
//! buckets and every publisher of a bucket shares the record stored for it.

pub mod allocator;
pub mod store;
pub mod types;

pub use allocator::{VlanAllocatorSet, VlanIdAllocator, VlanIdSource};
pub use store::{transfer, TransferError, TransferOutcome, VlanAllocation, VlanAllocationStore};
pub use types::{ServiceTag, UseCase, VlanAllocationContainer, VlanAllocationRecord, VlanBucket, VlanPair};
