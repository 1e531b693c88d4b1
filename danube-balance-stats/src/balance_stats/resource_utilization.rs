use tracing::debug;

use super::{at_least, at_most, Summary};
use crate::cluster::{BrokerId, ClusterSnapshot};
use crate::constraint::BalancingConstraint;
use crate::errors::Result;
use crate::resource::Resource;

/// Utilization statistics of a single resource across alive brokers
#[derive(Debug, Clone, PartialEq)]
pub(super) struct ResourceUtilization {
    pub(super) resource: Resource,
    pub(super) num_balanced_brokers: usize,
    pub(super) summary: Summary<f64>,
}

/// Balance band around the cluster average utilization fraction.
///
/// The upper edge is `avg × balance_percentage`, the lower edge mirrors the multiplier
/// around 1.0 (`avg × max(0, 2 − balance_percentage)`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct BalanceBand {
    pub(super) lower: f64,
    pub(super) upper: f64,
}

impl BalanceBand {
    pub(super) fn new(avg_utilization_pct: f64, balance_percentage: f64) -> Self {
        Self {
            lower: avg_utilization_pct * (2.0 - balance_percentage).max(0.0),
            upper: avg_utilization_pct * balance_percentage,
        }
    }

    pub(super) fn contains(&self, utilization_pct: f64) -> bool {
        at_least(utilization_pct, self.lower) && at_most(utilization_pct, self.upper)
    }
}

/// Summarizes every resource in enumeration order
pub(super) fn utilization_for_resources(
    cluster: &dyn ClusterSnapshot,
    constraint: &BalancingConstraint,
    alive_brokers: &[BrokerId],
) -> Result<Vec<ResourceUtilization>> {
    Resource::cached_values()
        .iter()
        .map(|&resource| utilization_for_resource(cluster, constraint, alive_brokers, resource))
        .collect()
}

/// Average, max, min and standard deviation of the absolute utilization of a resource.
///
/// The average is the cluster-wide load divided by the number of alive brokers. The variance
/// is taken against `avg_utilization_pct × capacity` of each broker rather than the plain mean,
/// so a broker with twice the capacity is expected to carry twice the load.
fn utilization_for_resource(
    cluster: &dyn ClusterSnapshot,
    constraint: &BalancingConstraint,
    alive_brokers: &[BrokerId],
    resource: Resource,
) -> Result<ResourceUtilization> {
    let cluster_utilization = cluster.expected_utilization(resource);
    let avg_utilization_pct = cluster_utilization / cluster.capacity(resource)?;
    let band = BalanceBand::new(
        avg_utilization_pct,
        constraint.resource_balance_percentage(resource),
    );

    let mut hottest_broker_utilization = 0.0_f64;
    let mut coldest_broker_utilization = f64::MAX;
    let mut variance_sum = 0.0;
    let mut num_balanced_brokers = 0;

    for &broker in alive_brokers {
        let utilization = cluster.utilization_for(broker, resource)?;
        let capacity = cluster.capacity_for(broker, resource)?;

        if band.contains(utilization / capacity) {
            num_balanced_brokers += 1;
        }
        hottest_broker_utilization = hottest_broker_utilization.max(utilization);
        coldest_broker_utilization = coldest_broker_utilization.min(utilization);
        variance_sum += (utilization - avg_utilization_pct * capacity).powi(2);
    }

    let num_alive_brokers = alive_brokers.len() as f64;
    let summary = Summary {
        avg: cluster_utilization / num_alive_brokers,
        max: hottest_broker_utilization,
        min: coldest_broker_utilization,
        st_dev: (variance_sum / num_alive_brokers).sqrt(),
    };

    debug!(
        resource = %resource,
        avg_utilization_pct,
        lower_band = band.lower,
        upper_band = band.upper,
        num_balanced_brokers,
        "summarized resource utilization"
    );

    Ok(ResourceUtilization {
        resource,
        num_balanced_brokers,
        summary,
    })
}
