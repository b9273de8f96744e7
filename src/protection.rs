//! Protection group resolution.
//!
//! Every publisher belongs to protection group 1 or 2, decided purely from
//! the owning device's name: the last `_`-delimited token carries a numeric
//! suffix whose parity selects the group (odd or missing = 1, even = 2).
//!
//! Which character of that token is read is a business rule that has varied
//! between deployments, so it is isolated behind [`ProtectionGroupRule`].
//! Plain functions and closures implement the trait as well, which lets a
//! host plug in an entirely different convention.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Redundant protection system instance for a bay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProtectionGroup {
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
}

impl ProtectionGroup {
    pub fn number(&self) -> u8 {
        match self {
            ProtectionGroup::One => 1,
            ProtectionGroup::Two => 2,
        }
    }

    pub fn all() -> [ProtectionGroup; 2] {
        [ProtectionGroup::One, ProtectionGroup::Two]
    }
}

impl fmt::Display for ProtectionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Maps a device name to its protection group.
pub trait ProtectionGroupRule {
    fn resolve(&self, device_name: &str) -> ProtectionGroup;
}

impl<F> ProtectionGroupRule for F
where
    F: Fn(&str) -> ProtectionGroup,
{
    fn resolve(&self, device_name: &str) -> ProtectionGroup {
        self(device_name)
    }
}

/// Which character of the device name's last token holds the group digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigitPosition {
    #[default]
    Last,
    SecondToLast,
}

/// Suffix-parity convention: `XAT_232_P1` is group 1, `XAT_232_P2` group 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SuffixDigitRule {
    pub position: DigitPosition,
}

impl SuffixDigitRule {
    pub fn new(position: DigitPosition) -> Self {
        Self { position }
    }
}

impl ProtectionGroupRule for SuffixDigitRule {
    fn resolve(&self, device_name: &str) -> ProtectionGroup {
        // rsplit always yields at least one item, even for an empty name
        let token = device_name.rsplit('_').next().unwrap_or(device_name);
        let digit = match self.position {
            DigitPosition::Last => token.chars().last(),
            DigitPosition::SecondToLast => token.chars().rev().nth(1),
        };

        match digit.and_then(|c| c.to_digit(10)) {
            Some(d) if d % 2 == 0 => ProtectionGroup::Two,
            _ => ProtectionGroup::One,
        }
    }
}

/// Resolve with the default (last character) convention.
pub fn resolve(device_name: &str) -> ProtectionGroup {
    SuffixDigitRule::default().resolve(device_name)
}
