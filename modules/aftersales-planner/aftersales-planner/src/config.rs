use serde::{Deserialize, Serialize};

/// Planner limits and defaults
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// Longest `from..to` window accepted by listings and availability.
    pub max_range_days: u32,
    /// Days returned by the capacity endpoint when `days` is absent.
    pub default_capacity_days: u32,
    /// Upper bound for the capacity endpoint's `days`.
    pub max_capacity_days: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_range_days: 62,
            default_capacity_days: 5,
            max_capacity_days: 31,
        }
    }
}
