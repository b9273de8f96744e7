//! Address format validation.
//!
//! These checks only decide whether a value already present in a document can
//! be interpreted. They never reject a document; callers log and move on.

use regex::Regex;
use std::sync::LazyLock;

use crate::document::AddressParameter;

static MAC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Fa-f]{2}([-:][0-9A-Fa-f]{2}){5}$").expect("Invalid MAC regex")
});

static APPID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Fa-f]{4}$").expect("Invalid APPID regex"));

static VLAN_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Fa-f]{1,3}$").expect("Invalid VLAN-ID regex"));

static VLAN_PRIORITY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-7]$").expect("Invalid VLAN-PRIORITY regex"));

static IED_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][0-9A-Za-z_]*$").expect("Invalid IED name regex"));

/// Check a communication address parameter against its textual format
///
/// # Returns
/// * `Ok(())` if the value is well-formed
/// * `Err(String)` describing the problem otherwise
pub fn validate_parameter_format(parameter: AddressParameter, value: &str) -> Result<(), String> {
    let (pattern, expected) = match parameter {
        AddressParameter::Mac => (&*MAC_PATTERN, "six hex octets separated by '-'"),
        AddressParameter::AppId => (&*APPID_PATTERN, "four hex digits"),
        AddressParameter::VlanId => (&*VLAN_ID_PATTERN, "one to three hex digits"),
        AddressParameter::VlanPriority => (&*VLAN_PRIORITY_PATTERN, "a digit between 0 and 7"),
    };

    if pattern.is_match(value.trim()) {
        Ok(())
    } else {
        Err(format!("{} '{}' is malformed, expected {}", parameter, value, expected))
    }
}

/// IED names become part of appID/smvID values, so they must be plain
/// identifiers.
pub fn validate_ied_name(name: &str) -> Result<(), String> {
    if IED_NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(format!("IED name '{}' is not a valid identifier", name))
    }
}
