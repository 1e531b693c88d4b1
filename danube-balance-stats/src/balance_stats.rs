mod potential_nw_out;
mod render;
mod replica_counts;
mod resource_utilization;
mod topic_replicas;

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::cluster::{ClusterSnapshot, UtilizationMatrix};
use crate::constraint::BalancingConstraint;
use crate::errors::{Result, StatsError};
use crate::resource::{Resource, StatValue, Statistic};

/// Relative tolerance on threshold edges. Bounds are products of floating point ratios, so a
/// broker sitting exactly on an edge (0.4 against (100 / 300) × 1.2) must not fall outside by
/// one ulp, whatever the scale of the utilization fractions.
const EDGE_TOLERANCE: f64 = 1e-12;

/// `value <= bound`, up to rounding relative to the bound
pub(crate) fn at_most(value: f64, bound: f64) -> bool {
    value <= bound + bound.abs() * EDGE_TOLERANCE
}

/// `value >= bound`, up to rounding relative to the bound
pub(crate) fn at_least(value: f64, bound: f64) -> bool {
    value >= bound - bound.abs() * EDGE_TOLERANCE
}

pub use render::{
    BROKERS, LEADER_REPLICAS, METADATA, POTENTIAL_NW_OUT, REPLICAS, STATISTICS, TOPICS,
    TOPIC_REPLICAS,
};

/// Converts the monitored-partition ratio (unit interval) to a percentage
const UNIT_INTERVAL_TO_PERCENTAGE: f64 = 100.0;

/// Average, max, min and standard deviation of one metric
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Summary<T> {
    pub(crate) avg: f64,
    pub(crate) max: T,
    pub(crate) min: T,
    pub(crate) st_dev: f64,
}

impl Summary<f64> {
    fn get(&self, stat: Statistic) -> f64 {
        match stat {
            Statistic::Avg => self.avg,
            Statistic::Max => self.max,
            Statistic::Min => self.min,
            Statistic::StDev => self.st_dev,
        }
    }
}

impl Summary<usize> {
    fn into_stat_map(self) -> BTreeMap<Statistic, StatValue> {
        BTreeMap::from([
            (Statistic::Avg, StatValue::Real(self.avg)),
            (Statistic::Max, StatValue::Int(self.max)),
            (Statistic::Min, StatValue::Int(self.min)),
            (Statistic::StDev, StatValue::Real(self.st_dev)),
        ])
    }
}

/// Balance-quality statistics of one cluster snapshot.
///
/// Built once by [`ClusterBalanceStats::populate`] and read-only afterwards; it holds no
/// reference to the cluster model apart from the shared utilization matrix, so it can be
/// moved or shared across threads freely.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterBalanceStats {
    resource_utilization_stats: BTreeMap<Statistic, BTreeMap<Resource, f64>>,
    potential_nw_out_utilization_stats: BTreeMap<Statistic, f64>,
    replica_stats: BTreeMap<Statistic, StatValue>,
    leader_replica_stats: BTreeMap<Statistic, StatValue>,
    topic_replica_stats: BTreeMap<Statistic, StatValue>,
    num_brokers: usize,
    num_alive_brokers: usize,
    num_replicas_in_cluster: usize,
    num_partitions_with_offline_replicas: usize,
    num_topics: usize,
    num_balanced_brokers_by_resource: BTreeMap<Resource, usize>,
    num_brokers_under_potential_nw_out: usize,
    utilization_matrix: Arc<UtilizationMatrix>,
    num_snapshot_windows: usize,
    monitored_partitions_ratio: f64,
}

impl ClusterBalanceStats {
    /// Computes every statistic of the cluster against the balancing constraint.
    ///
    /// ## Errors
    /// - `NoAliveBrokers` when the snapshot has no alive broker: every average and standard
    ///   deviation is taken over the alive brokers
    /// - any lookup error of the cluster snapshot (unknown broker, missing capacity)
    ///
    /// Zero topics or zero cluster capacity are not rejected; the affected statistics come
    /// out as NaN or infinite.
    pub fn populate(
        cluster: &dyn ClusterSnapshot,
        constraint: &BalancingConstraint,
    ) -> Result<Self> {
        let brokers = cluster.brokers();
        let alive_brokers = cluster.alive_brokers();
        let topics = cluster.topics();

        if alive_brokers.is_empty() {
            return Err(StatsError::NoAliveBrokers);
        }

        let utilization =
            resource_utilization::utilization_for_resources(cluster, constraint, &alive_brokers)?;
        let potential_nw_out = potential_nw_out::utilization_for_potential_nw_out(
            cluster,
            constraint,
            &alive_brokers,
        )?;
        let replicas = replica_counts::populate_replica_stats(&brokers, &alive_brokers, |b| {
            cluster.replica_count(b)
        })?;
        let leader_replicas =
            replica_counts::populate_replica_stats(&brokers, &alive_brokers, |b| {
                cluster.leader_replica_count(b)
            })?;
        let topic_replicas =
            topic_replicas::topic_replica_stats(cluster, &brokers, &alive_brokers, &topics)?;

        let mut resource_utilization_stats: BTreeMap<Statistic, BTreeMap<Resource, f64>> =
            BTreeMap::new();
        let mut num_balanced_brokers_by_resource = BTreeMap::new();
        for entry in &utilization {
            for &stat in Statistic::cached_values() {
                resource_utilization_stats
                    .entry(stat)
                    .or_default()
                    .insert(entry.resource, entry.summary.get(stat));
            }
            num_balanced_brokers_by_resource.insert(entry.resource, entry.num_balanced_brokers);
        }

        let potential_nw_out_utilization_stats = Statistic::cached_values()
            .iter()
            .map(|&stat| (stat, potential_nw_out.summary.get(stat)))
            .collect();

        let stats = Self {
            resource_utilization_stats,
            potential_nw_out_utilization_stats,
            replica_stats: replicas.into_stat_map(),
            leader_replica_stats: leader_replicas.into_stat_map(),
            topic_replica_stats: topic_replicas.into_stat_map(),
            num_brokers: brokers.len(),
            num_alive_brokers: alive_brokers.len(),
            num_replicas_in_cluster: cluster.replica_count_in_cluster(),
            num_partitions_with_offline_replicas:
                replica_counts::num_partitions_with_offline_replicas(cluster),
            num_topics: topics.len(),
            num_balanced_brokers_by_resource,
            num_brokers_under_potential_nw_out: potential_nw_out.num_brokers_under_threshold,
            utilization_matrix: cluster.utilization_matrix(),
            num_snapshot_windows: cluster.num_snapshot_windows(),
            monitored_partitions_ratio: cluster.monitored_partitions_ratio(),
        };

        info!(
            brokers = stats.num_brokers,
            alive_brokers = stats.num_alive_brokers,
            replicas = stats.num_replicas_in_cluster,
            topics = stats.num_topics,
            offline_partitions = stats.num_partitions_with_offline_replicas,
            "cluster balance statistics populated"
        );

        Ok(stats)
    }

    /// Statistic → resource → absolute utilization across alive brokers
    pub fn resource_utilization_stats(&self) -> &BTreeMap<Statistic, BTreeMap<Resource, f64>> {
        &self.resource_utilization_stats
    }

    /// Statistic of the potential leadership network-out load across alive brokers
    pub fn potential_nw_out_utilization_stats(&self) -> &BTreeMap<Statistic, f64> {
        &self.potential_nw_out_utilization_stats
    }

    pub fn replica_stats(&self) -> &BTreeMap<Statistic, StatValue> {
        &self.replica_stats
    }

    pub fn leader_replica_stats(&self) -> &BTreeMap<Statistic, StatValue> {
        &self.leader_replica_stats
    }

    /// Per-topic replica statistics averaged over all topics
    pub fn topic_replica_stats(&self) -> &BTreeMap<Statistic, StatValue> {
        &self.topic_replica_stats
    }

    pub fn num_brokers(&self) -> usize {
        self.num_brokers
    }

    pub fn num_alive_brokers(&self) -> usize {
        self.num_alive_brokers
    }

    pub fn num_replicas_in_cluster(&self) -> usize {
        self.num_replicas_in_cluster
    }

    pub fn num_partitions_with_offline_replicas(&self) -> usize {
        self.num_partitions_with_offline_replicas
    }

    pub fn num_topics(&self) -> usize {
        self.num_topics
    }

    pub fn num_balanced_brokers_by_resource(&self) -> &BTreeMap<Resource, usize> {
        &self.num_balanced_brokers_by_resource
    }

    pub fn num_brokers_under_potential_nw_out(&self) -> usize {
        self.num_brokers_under_potential_nw_out
    }

    /// Shared view of the model's utilization matrix at populate time
    pub fn utilization_matrix(&self) -> &Arc<UtilizationMatrix> {
        &self.utilization_matrix
    }

    pub fn monitored_partitions_ratio(&self) -> f64 {
        self.monitored_partitions_ratio
    }

    pub fn monitored_partitions_percentage(&self) -> f64 {
        self.monitored_partitions_ratio * UNIT_INTERVAL_TO_PERCENTAGE
    }

    pub fn num_snapshot_windows(&self) -> usize {
        self.num_snapshot_windows
    }

    /// Single resource statistic, NaN when the resource was not summarized
    pub fn resource_stat(&self, stat: Statistic, resource: Resource) -> f64 {
        self.resource_utilization_stats
            .get(&stat)
            .and_then(|by_resource| by_resource.get(&resource))
            .copied()
            .unwrap_or(f64::NAN)
    }
}

// Tests for ClusterBalanceStats are in balance_stats_test.rs
#[cfg(test)]
#[path = "balance_stats_test.rs"]
mod tests;
