use std::collections::HashSet;

use super::Summary;
use crate::cluster::{BrokerId, ClusterSnapshot, TopicPartition};
use crate::errors::Result;

/// Statistics of the replicas of interest per broker, as counted by `num_interested_replicas`.
///
/// Sum, max and min run over every broker, dead ones included, but the average divides by the
/// number of alive brokers. Replicas still assigned to dead brokers therefore raise the average.
/// The standard deviation only looks at alive brokers.
pub(super) fn populate_replica_stats<F>(
    brokers: &[BrokerId],
    alive_brokers: &[BrokerId],
    num_interested_replicas: F,
) -> Result<Summary<usize>>
where
    F: Fn(BrokerId) -> Result<usize>,
{
    let mut max_interested_replicas_in_broker = 0;
    let mut min_interested_replicas_in_broker = usize::MAX;
    let mut num_interested_replicas_in_cluster = 0;
    for &broker in brokers {
        let num_interested_replicas_in_broker = num_interested_replicas(broker)?;
        num_interested_replicas_in_cluster += num_interested_replicas_in_broker;
        max_interested_replicas_in_broker =
            max_interested_replicas_in_broker.max(num_interested_replicas_in_broker);
        min_interested_replicas_in_broker =
            min_interested_replicas_in_broker.min(num_interested_replicas_in_broker);
    }

    let num_alive_brokers = alive_brokers.len() as f64;
    let avg_interested_replicas = num_interested_replicas_in_cluster as f64 / num_alive_brokers;

    let mut variance = 0.0;
    for &broker in alive_brokers {
        let deviation = num_interested_replicas(broker)? as f64 - avg_interested_replicas;
        variance += deviation.powi(2) / num_alive_brokers;
    }

    Ok(Summary {
        avg: avg_interested_replicas,
        max: max_interested_replicas_in_broker,
        min: min_interested_replicas_in_broker,
        st_dev: variance.sqrt(),
    })
}

/// Number of distinct partitions with at least one replica in need of self-healing
pub(super) fn num_partitions_with_offline_replicas(cluster: &dyn ClusterSnapshot) -> usize {
    cluster
        .self_healing_eligible_replicas()
        .into_iter()
        .collect::<HashSet<TopicPartition>>()
        .len()
}
