//! Shared utilities: address format validation and timestamps.

pub mod timestamp;
pub mod validation;

pub use timestamp::{format_timestamp, now_timestamp};
pub use validation::{validate_ied_name, validate_parameter_format};
