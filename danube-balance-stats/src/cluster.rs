use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::errors::Result;
use crate::resource::Resource;

pub type BrokerId = u64;

/// Identifies a partition of a topic, independent of where its replicas live
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TopicPartition {
    pub topic: String,
    pub partition: u32,
}

impl TopicPartition {
    pub fn new(topic: impl Into<String>, partition: u32) -> Self {
        Self {
            topic: topic.into(),
            partition,
        }
    }
}

impl fmt::Display for TopicPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.topic, self.partition)
    }
}

/// Raw broker utilization: one row per alive broker (ascending id),
/// one column per resource in enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UtilizationMatrix {
    pub broker_ids: Vec<BrokerId>,
    pub rows: Vec<Vec<f64>>,
}

impl UtilizationMatrix {
    pub fn get(&self, row: usize, resource: Resource) -> Option<f64> {
        self.rows.get(row)?.get(resource.index()).copied()
    }
}

/// Read-only queries the balance statistics consume from a cluster model.
///
/// Implementations must present a consistent snapshot for the duration of a
/// [`ClusterBalanceStats::populate`](crate::ClusterBalanceStats::populate) call.
/// Broker lookups fail for unknown brokers and for missing capacity data.
pub trait ClusterSnapshot {
    /// Every broker, alive or dead, in ascending id order
    fn brokers(&self) -> Vec<BrokerId>;

    /// Alive brokers in ascending id order
    fn alive_brokers(&self) -> Vec<BrokerId>;

    /// Distinct topic names in sorted order
    fn topics(&self) -> Vec<String>;

    /// Partition of every replica that needs self-healing (offline or on a dead broker).
    /// A partition appears once per such replica.
    fn self_healing_eligible_replicas(&self) -> Vec<TopicPartition>;

    fn replica_count(&self, broker: BrokerId) -> Result<usize>;

    fn leader_replica_count(&self, broker: BrokerId) -> Result<usize>;

    fn topic_replica_count(&self, broker: BrokerId, topic: &str) -> Result<usize>;

    fn broker_utilization(&self, broker: BrokerId, resource: Resource) -> Result<f64>;

    fn broker_capacity(&self, broker: BrokerId, resource: Resource) -> Result<f64>;

    /// Load summed over every broker sharing this broker's host
    fn host_utilization(&self, broker: BrokerId, resource: Resource) -> Result<f64>;

    /// Capacity summed over every broker sharing this broker's host
    fn host_capacity(&self, broker: BrokerId, resource: Resource) -> Result<f64>;

    /// Load the broker would carry if it led every partition it hosts
    fn potential_leadership_load(&self, broker: BrokerId, resource: Resource) -> Result<f64>;

    /// Total expected load of the cluster
    fn expected_utilization(&self, resource: Resource) -> f64;

    /// Total capacity of the cluster
    fn capacity(&self, resource: Resource) -> Result<f64>;

    fn replica_count_in_cluster(&self) -> usize;

    fn topic_replica_count_in_cluster(&self, topic: &str) -> usize;

    fn utilization_matrix(&self) -> Arc<UtilizationMatrix>;

    /// Fraction of partitions with enough monitoring data, in [0, 1]
    fn monitored_partitions_ratio(&self) -> f64;

    fn num_snapshot_windows(&self) -> usize;

    /// Load of the broker for the resource, read from the host aggregate for host resources
    fn utilization_for(&self, broker: BrokerId, resource: Resource) -> Result<f64> {
        if resource.is_host_resource() {
            self.host_utilization(broker, resource)
        } else {
            self.broker_utilization(broker, resource)
        }
    }

    /// Capacity of the broker for the resource, read from the host aggregate for host resources
    fn capacity_for(&self, broker: BrokerId, resource: Resource) -> Result<f64> {
        if resource.is_host_resource() {
            self.host_capacity(broker, resource)
        } else {
            self.broker_capacity(broker, resource)
        }
    }
}
