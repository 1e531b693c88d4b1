use tracing::debug;

use super::{at_most, Summary};
use crate::cluster::{BrokerId, ClusterSnapshot};
use crate::constraint::BalancingConstraint;
use crate::errors::Result;
use crate::resource::Resource;

/// Network-out statistics under the hypothesis that every broker leads all partitions it hosts
#[derive(Debug, Clone, PartialEq)]
pub(super) struct PotentialNwOut {
    /// Alive brokers whose potential load stays within the network-out capacity threshold
    pub(super) num_brokers_under_threshold: usize,
    pub(super) summary: Summary<f64>,
}

pub(super) fn utilization_for_potential_nw_out(
    cluster: &dyn ClusterSnapshot,
    constraint: &BalancingConstraint,
    alive_brokers: &[BrokerId],
) -> Result<PotentialNwOut> {
    let potential_loads = alive_brokers
        .iter()
        .map(|&broker| cluster.potential_leadership_load(broker, Resource::NetworkOutbound))
        .collect::<Result<Vec<f64>>>()?;

    let potential_nw_out_in_cluster: f64 = potential_loads.iter().sum();
    let avg_potential_nw_out_pct =
        potential_nw_out_in_cluster / cluster.capacity(Resource::NetworkOutbound)?;
    let capacity_threshold = constraint.capacity_threshold(Resource::NetworkOutbound);

    let mut max_potential_nw_out = 0.0_f64;
    let mut min_potential_nw_out = f64::MAX;
    let mut variance_sum = 0.0;
    let mut num_brokers_under_threshold = 0;

    for (&broker, &broker_utilization) in alive_brokers.iter().zip(&potential_loads) {
        let broker_capacity = cluster.broker_capacity(broker, Resource::NetworkOutbound)?;

        if at_most(broker_utilization / broker_capacity, capacity_threshold) {
            num_brokers_under_threshold += 1;
        }
        max_potential_nw_out = max_potential_nw_out.max(broker_utilization);
        min_potential_nw_out = min_potential_nw_out.min(broker_utilization);
        variance_sum += (broker_utilization - avg_potential_nw_out_pct * broker_capacity).powi(2);
    }

    let num_alive_brokers = alive_brokers.len() as f64;

    debug!(
        potential_nw_out_in_cluster,
        capacity_threshold,
        num_brokers_under_threshold,
        "summarized potential leadership network-out"
    );

    Ok(PotentialNwOut {
        num_brokers_under_threshold,
        summary: Summary {
            avg: potential_nw_out_in_cluster / num_alive_brokers,
            max: max_potential_nw_out,
            min: min_potential_nw_out,
            st_dev: (variance_sum / num_alive_brokers).sqrt(),
        },
    })
}
