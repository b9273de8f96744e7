//! Value formatting for multicast address parameters.
//!
//! MAC addresses are rendered as `XX-XX-XX-XX-XX-XX`, APPIDs as four hex
//! digits and VLAN ids as three hex digits, always uppercase. Parsing accepts
//! any case and either `-` or `:` separators for MACs.

/// Rendering rules for one kind of allocated value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFormat {
    Mac,
    AppId,
    VlanId,
}

impl AddressFormat {
    /// Number of hex digits the value occupies.
    pub fn digits(&self) -> usize {
        match self {
            AddressFormat::Mac => 12,
            AddressFormat::AppId => 4,
            AddressFormat::VlanId => 3,
        }
    }

    /// Largest representable value (all ones).
    pub fn max_value(&self) -> u64 {
        (1u64 << (self.digits() * 4)) - 1
    }

    pub fn format(&self, value: u64) -> String {
        let hex = format!("{:0width$X}", value, width = self.digits());
        match self {
            AddressFormat::Mac => group_mac(&hex),
            AddressFormat::AppId | AddressFormat::VlanId => hex,
        }
    }

    /// Parse a textual value back to its number; `None` if malformed or too wide.
    pub fn parse(&self, text: &str) -> Option<u64> {
        let digits: String = match self {
            AddressFormat::Mac => text.trim().chars().filter(|c| *c != '-' && *c != ':').collect(),
            AddressFormat::AppId | AddressFormat::VlanId => text.trim().to_string(),
        };
        if digits.is_empty() || digits.len() > self.digits() {
            return None;
        }
        if *self == AddressFormat::Mac && digits.len() != self.digits() {
            return None;
        }
        u64::from_str_radix(&digits, 16).ok()
    }

    /// Marker written when a range has no value left: all ones.
    pub fn sentinel(&self) -> String {
        self.format(self.max_value())
    }
}

fn group_mac(hex: &str) -> String {
    let mut out = String::with_capacity(hex.len() + hex.len() / 2);
    for (i, c) in hex.chars().enumerate() {
        if i > 0 && i % 2 == 0 {
            out.push('-');
        }
        out.push(c);
    }
    out
}

/// Render a hex VLAN id for display as `0xHHH (DDD)`.
pub fn display_vlan(vlan_id: &str) -> String {
    match AddressFormat::VlanId.parse(vlan_id) {
        Some(value) => format!("0x{} ({})", vlan_id.to_uppercase(), value),
        None => format!("0x{}", vlan_id),
    }
}
