use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::{Result, StatsError};
use crate::resource::Resource;

/// Default balance band multiplier applied to every resource
pub const DEFAULT_BALANCE_PERCENTAGE: f64 = 1.10;

/// Default capacity ceiling for a resource, as a fraction of broker capacity
pub fn default_capacity_threshold(resource: Resource) -> f64 {
    match resource {
        Resource::Cpu => 0.7,
        Resource::NetworkInbound | Resource::NetworkOutbound | Resource::Disk => 0.8,
    }
}

/// Balancing thresholds consumed by the balance statistics
///
/// Resources missing from either map use the defaults, so a constraint file only
/// needs to list the resources it overrides:
///
/// ```yaml
/// balance_percentage:
///   cpu: 1.2
/// capacity_threshold:
///   networkOutbound: 0.75
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalancingConstraint {
    /// Upper balance band as a multiple of the cluster average utilization (> 1.0).
    /// The lower band mirrors it around 1.0.
    #[serde(default)]
    pub balance_percentage: BTreeMap<Resource, f64>,
    /// Maximum utilization fraction of broker capacity, in (0, 1]
    #[serde(default)]
    pub capacity_threshold: BTreeMap<Resource, f64>,
}

impl BalancingConstraint {
    pub fn with_balance_percentage(mut self, resource: Resource, percentage: f64) -> Self {
        self.balance_percentage.insert(resource, percentage);
        self
    }

    pub fn with_capacity_threshold(mut self, resource: Resource, threshold: f64) -> Self {
        self.capacity_threshold.insert(resource, threshold);
        self
    }

    pub fn resource_balance_percentage(&self, resource: Resource) -> f64 {
        self.balance_percentage
            .get(&resource)
            .copied()
            .unwrap_or(DEFAULT_BALANCE_PERCENTAGE)
    }

    pub fn capacity_threshold(&self, resource: Resource) -> f64 {
        self.capacity_threshold
            .get(&resource)
            .copied()
            .unwrap_or_else(|| default_capacity_threshold(resource))
    }

    /// Checks every effective threshold, defaults included
    pub fn validate(&self) -> Result<()> {
        for &resource in Resource::cached_values() {
            let percentage = self.resource_balance_percentage(resource);
            if !percentage.is_finite() || percentage <= 1.0 {
                return Err(StatsError::InvalidConstraint(format!(
                    "balance percentage for {} must be greater than 1.0, got {}",
                    resource.resource(),
                    percentage
                )));
            }

            let threshold = self.capacity_threshold(resource);
            if !(threshold > 0.0 && threshold <= 1.0) {
                return Err(StatsError::InvalidConstraint(format!(
                    "capacity threshold for {} must be in (0, 1], got {}",
                    resource.resource(),
                    threshold
                )));
            }
        }
        Ok(())
    }
}
