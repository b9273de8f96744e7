//! Numeric allocation ranges.
//!
//! Every multicast parameter lives in its own disjoint numeric range keyed by
//! service family and protection group (MAC, APPID) or by use-case and
//! service tag (VLAN). The [`RangeTable`] is an immutable value built once
//! from configuration and handed to the allocation engine.

pub mod types;
pub mod table;

pub use types::{AllocationRange, AppIdPool, VlanRange};
pub use table::RangeTable;
