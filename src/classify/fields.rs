//! Per-publisher field policy: APPID pool, VLAN priority and GOOSE timers.

use crate::config::{NamingConfig, PriorityConfig, TimingConfig};
use crate::document::ServiceFamily;
use crate::protection::ProtectionGroup;
use crate::ranges::AppIdPool;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPolicy {
    protection_prefixes: Vec<String>,
    fast_prefixes: Vec<String>,
    timing: TimingConfig,
    priority: PriorityConfig,
}

impl Default for FieldPolicy {
    fn default() -> Self {
        Self::new(&NamingConfig::default(), TimingConfig::default(), PriorityConfig::default())
    }
}

fn upper_starts_with(name: &str, prefixes: &[String]) -> bool {
    let upper = name.to_uppercase();
    prefixes.iter().any(|p| upper.starts_with(&p.to_uppercase()))
}

impl FieldPolicy {
    pub fn new(naming: &NamingConfig, timing: TimingConfig, priority: PriorityConfig) -> Self {
        Self {
            protection_prefixes: naming.protection_function_prefixes.clone(),
            fast_prefixes: naming.fast_min_time_prefixes.clone(),
            timing,
            priority,
        }
    }

    /// Control and trip GOOSE are protection functions.
    pub fn is_protection_function(&self, name: &str) -> bool {
        upper_starts_with(name, &self.protection_prefixes)
    }

    pub fn appid_pool(&self, family: ServiceFamily, group: ProtectionGroup, name: &str) -> AppIdPool {
        AppIdPool::new(family, group, self.is_protection_function(name))
    }

    pub fn vlan_priority(&self, family: ServiceFamily, name: &str) -> u8 {
        match family {
            ServiceFamily::Smv => self.priority.protection,
            ServiceFamily::Gse if self.is_protection_function(name) => self.priority.protection,
            ServiceFamily::Gse => self.priority.non_protection,
        }
    }

    pub fn min_time(&self, name: &str) -> u32 {
        if upper_starts_with(name, &self.fast_prefixes) {
            self.timing.fast_min_time
        } else {
            self.timing.slow_min_time
        }
    }

    pub fn max_time(&self) -> u32 {
        self.timing.max_time
    }
}
