use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::protection::DigitPosition;
use crate::ranges::RangeTable;

/// Engine configuration.
///
/// Every section falls back to the production defaults, so an empty YAML
/// file describes the standard allocation scheme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub ranges: RangeTable,
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub priority: PriorityConfig,
    #[serde(default)]
    pub allocation: AllocationPolicy,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !LOG_LEVELS.contains(&self.general.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidGeneral(format!(
                "log_level must be one of {:?}, got '{}'",
                LOG_LEVELS, self.general.log_level
            )));
        }

        self.ranges.validate()?;
        self.naming.validate()?;
        self.timing.validate()?;
        self.priority.validate()?;

        Ok(())
    }
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Naming conventions driving VLAN classification and per-publisher fields.
///
/// Classification prefixes are matched case-sensitively against the control
/// block name. Protection-function and fast-MinTime prefixes are matched
/// against the upper-cased name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub bus_slow_prefixes: Vec<String>,
    pub bus_fast_prefixes: Vec<String>,
    pub inter_protection_prefixes: Vec<String>,
    /// SMV function suffixes of bus-scoped streams; `""` is a bare device id
    pub bus_sv_suffixes: Vec<String>,
    pub station_goose_prefixes: Vec<String>,
    pub station_sv_suffixes: Vec<String>,
    pub protection_function_prefixes: Vec<String>,
    pub fast_min_time_prefixes: Vec<String>,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            bus_slow_prefixes: strings(&["Ind", "Test", "SPSBus", "TCh"]),
            bus_fast_prefixes: strings(&["Ctl"]),
            inter_protection_prefixes: strings(&["ARecl", "SwgrPos"]),
            bus_sv_suffixes: strings(&["", "Phase", "NCT_UB_ET"]),
            station_goose_prefixes: strings(&["ILock", "TripCBFail", "SPSStn", "VReg"]),
            station_sv_suffixes: strings(&["VTSelStn"]),
            protection_function_prefixes: strings(&["CTL", "TRIP"]),
            fast_min_time_prefixes: strings(&["CTL", "TRIP", "TEST"]),
        }
    }
}

impl NamingConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let prefix_sets = [
            ("bus_slow_prefixes", &self.bus_slow_prefixes),
            ("bus_fast_prefixes", &self.bus_fast_prefixes),
            ("inter_protection_prefixes", &self.inter_protection_prefixes),
            ("station_goose_prefixes", &self.station_goose_prefixes),
            ("protection_function_prefixes", &self.protection_function_prefixes),
            ("fast_min_time_prefixes", &self.fast_min_time_prefixes),
        ];
        for (label, set) in prefix_sets {
            // An empty prefix would match every name
            if set.iter().any(|p| p.is_empty()) {
                return Err(ValidationError::InvalidNaming(format!("{} contains an empty prefix", label)));
            }
            check_set(label, set)?;
        }

        check_set("bus_sv_suffixes", &self.bus_sv_suffixes)?;
        check_set("station_sv_suffixes", &self.station_sv_suffixes)?;

        Ok(())
    }
}

fn check_set(label: &str, set: &[String]) -> Result<(), ValidationError> {
    if set.is_empty() {
        return Err(ValidationError::InvalidNaming(format!("{} cannot be empty", label)));
    }
    let mut seen = HashSet::new();
    if let Some(duplicate) = set.iter().find(|v| !seen.insert(v.as_str())) {
        return Err(ValidationError::InvalidNaming(format!(
            "{} lists '{}' more than once",
            label, duplicate
        )));
    }
    Ok(())
}

/// GOOSE retransmission bounds in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub fast_min_time: u32,
    pub slow_min_time: u32,
    pub max_time: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            fast_min_time: 4,
            slow_min_time: 100,
            max_time: 1000,
        }
    }
}

impl TimingConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.fast_min_time == 0 || self.slow_min_time == 0 {
            return Err(ValidationError::InvalidField("MinTime must be positive".to_string()));
        }
        if self.fast_min_time.max(self.slow_min_time) > self.max_time {
            return Err(ValidationError::InvalidField(format!(
                "MinTime ({}/{}) cannot exceed MaxTime ({})",
                self.fast_min_time, self.slow_min_time, self.max_time
            )));
        }
        Ok(())
    }
}

/// VLAN priorities (0-7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriorityConfig {
    /// SMV and protection-function GOOSE
    pub protection: u8,
    pub non_protection: u8,
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            protection: 6,
            non_protection: 5,
        }
    }
}

impl PriorityConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for value in [self.protection, self.non_protection] {
            if value > 7 {
                return Err(ValidationError::InvalidField(format!(
                    "VLAN priority must be between 0 and 7, got {}",
                    value
                )));
            }
        }
        Ok(())
    }
}

/// What to do with a bus-scoped publisher whose device sits on no bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedBusPolicy {
    /// Share one "no bus" bucket across all unmapped devices
    Share,
    /// Skip the bus rules and keep evaluating the station rules
    #[default]
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationPolicy {
    pub unmapped_bus_policy: UnmappedBusPolicy,
    pub protection_digit: DigitPosition,
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid range configuration: {0}")]
    InvalidRange(String),
    #[error("Invalid naming configuration: {0}")]
    InvalidNaming(String),
    #[error("Invalid field configuration: {0}")]
    InvalidField(String),
}
