use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};
use tracing::debug;

use crate::cluster::{BrokerId, ClusterSnapshot, TopicPartition, UtilizationMatrix};
use crate::errors::{Result, StatsError};
use crate::resource::{Resource, NUM_RESOURCES};

/// A broker of the modeled cluster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrokerSpec {
    pub id: BrokerId,
    /// Brokers declared with the same host share host resources
    pub host: String,
    #[serde(default = "default_alive")]
    pub alive: bool,
    #[serde(default)]
    pub capacity: BTreeMap<Resource, f64>,
}

fn default_alive() -> bool {
    true
}

impl BrokerSpec {
    pub fn new(id: BrokerId, host: impl Into<String>) -> Self {
        Self {
            id,
            host: host.into(),
            alive: true,
            capacity: BTreeMap::new(),
        }
    }

    pub fn with_capacity(mut self, resource: Resource, capacity: f64) -> Self {
        self.capacity.insert(resource, capacity);
        self
    }

    /// Same capacity for every resource
    pub fn with_uniform_capacity(mut self, capacity: f64) -> Self {
        for resource in Resource::cached_values() {
            self.capacity.insert(*resource, capacity);
        }
        self
    }

    pub fn dead(mut self) -> Self {
        self.alive = false;
        self
    }
}

/// A replica placed on a broker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicaSpec {
    pub topic: String,
    pub partition: u32,
    pub broker: BrokerId,
    #[serde(default)]
    pub leader: bool,
    /// The replica is unavailable and needs self-healing
    #[serde(default)]
    pub offline: bool,
    #[serde(default)]
    pub load: BTreeMap<Resource, f64>,
}

impl ReplicaSpec {
    pub fn new(topic: impl Into<String>, partition: u32, broker: BrokerId) -> Self {
        Self {
            topic: topic.into(),
            partition,
            broker,
            leader: false,
            offline: false,
            load: BTreeMap::new(),
        }
    }

    pub fn leader(mut self) -> Self {
        self.leader = true;
        self
    }

    pub fn offline(mut self) -> Self {
        self.offline = true;
        self
    }

    pub fn with_load(mut self, resource: Resource, load: f64) -> Self {
        self.load.insert(resource, load);
        self
    }

    pub fn topic_partition(&self) -> TopicPartition {
        TopicPartition::new(self.topic.clone(), self.partition)
    }

    fn load_for(&self, resource: Resource) -> f64 {
        self.load.get(&resource).copied().unwrap_or(0.0)
    }
}

/// On-disk shape of a cluster snapshot (YAML or JSON)
#[derive(Debug, Clone, Deserialize)]
struct ClusterModelDocument {
    #[serde(default = "default_monitored_partitions_ratio")]
    monitored_partitions_ratio: f64,
    #[serde(default = "default_num_snapshot_windows")]
    num_snapshot_windows: usize,
    #[serde(default)]
    brokers: Vec<BrokerSpec>,
    #[serde(default)]
    replicas: Vec<ReplicaSpec>,
}

fn default_monitored_partitions_ratio() -> f64 {
    1.0
}

fn default_num_snapshot_windows() -> usize {
    1
}

/// Broker with the indexes kept up to date on every placement
#[derive(Debug, Clone)]
struct BrokerState {
    spec: BrokerSpec,
    // positions in `ClusterModel::replicas`
    replicas: Vec<usize>,
    leaders: usize,
    load: [f64; NUM_RESOURCES],
}

impl BrokerState {
    fn new(spec: BrokerSpec) -> Self {
        Self {
            spec,
            replicas: Vec::new(),
            leaders: 0,
            load: [0.0; NUM_RESOURCES],
        }
    }
}

#[derive(Debug, Clone, Default)]
struct PartitionState {
    replicas: Vec<usize>,
    leader: Option<usize>,
}

#[derive(Debug, Clone, Default)]
struct TopicState {
    replicas: usize,
    per_broker: HashMap<BrokerId, usize>,
}

/// In-memory cluster model: brokers, hosts and replica placement with per-replica load.
///
/// Broker load is the sum of its replicas' load, host load and capacity are the sums over
/// the brokers sharing the host. The model is built up front and then only queried through
/// [`ClusterSnapshot`]. Per-broker, per-partition and per-topic indexes are maintained on
/// insert, so every query is answered without scanning the replica list.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "ClusterModelDocument")]
pub struct ClusterModel {
    brokers: BTreeMap<BrokerId, BrokerState>,
    hosts: HashMap<String, Vec<BrokerId>>,
    replicas: Vec<ReplicaSpec>,
    // partition slot of every replica, parallel to `replicas`
    replica_partitions: Vec<usize>,
    partitions: Vec<PartitionState>,
    partition_slots: HashMap<TopicPartition, usize>,
    topics: BTreeMap<String, TopicState>,
    monitored_partitions_ratio: f64,
    num_snapshot_windows: usize,
    // built on first request, dropped on every mutation
    utilization_matrix: OnceLock<Arc<UtilizationMatrix>>,
}

impl Default for ClusterModel {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterModel {
    pub fn new() -> Self {
        Self {
            brokers: BTreeMap::new(),
            hosts: HashMap::new(),
            replicas: Vec::new(),
            replica_partitions: Vec::new(),
            partitions: Vec::new(),
            partition_slots: HashMap::new(),
            topics: BTreeMap::new(),
            monitored_partitions_ratio: default_monitored_partitions_ratio(),
            num_snapshot_windows: default_num_snapshot_windows(),
            utilization_matrix: OnceLock::new(),
        }
    }

    pub fn set_monitored_partitions_ratio(&mut self, ratio: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(StatsError::InvalidModel(format!(
                "monitored partitions ratio {} is outside [0, 1]",
                ratio
            )));
        }
        self.monitored_partitions_ratio = ratio;
        Ok(())
    }

    pub fn set_num_snapshot_windows(&mut self, num_windows: usize) {
        self.num_snapshot_windows = num_windows;
    }

    pub fn add_broker(&mut self, broker: BrokerSpec) -> Result<()> {
        if self.brokers.contains_key(&broker.id) {
            return Err(StatsError::DuplicateBroker(broker.id));
        }
        self.hosts
            .entry(broker.host.clone())
            .or_default()
            .push(broker.id);
        self.brokers.insert(broker.id, BrokerState::new(broker));
        self.utilization_matrix = OnceLock::new();
        Ok(())
    }

    pub fn set_broker_alive(&mut self, broker: BrokerId, alive: bool) -> Result<()> {
        let state = self
            .brokers
            .get_mut(&broker)
            .ok_or(StatsError::UnknownBroker(broker))?;
        state.spec.alive = alive;
        self.utilization_matrix = OnceLock::new();
        Ok(())
    }

    /// Places a replica on a broker.
    ///
    /// A broker holds at most one replica of a partition and a partition has at most one leader.
    pub fn add_replica(&mut self, replica: ReplicaSpec) -> Result<()> {
        if !self.brokers.contains_key(&replica.broker) {
            return Err(StatsError::UnknownBroker(replica.broker));
        }
        let topic_partition = replica.topic_partition();
        let slot = self.partition_slots.get(&topic_partition).copied();

        if let Some(slot) = slot {
            let partition = &self.partitions[slot];
            if partition
                .replicas
                .iter()
                .any(|&index| self.replicas[index].broker == replica.broker)
            {
                return Err(StatsError::InvalidModel(format!(
                    "broker {} already holds a replica of {}",
                    replica.broker, topic_partition
                )));
            }
            if let (true, Some(leader)) = (replica.leader, partition.leader) {
                return Err(StatsError::InvalidModel(format!(
                    "partition {} already has a leader on broker {}",
                    topic_partition, self.replicas[leader].broker
                )));
            }
        }

        let index = self.replicas.len();
        let slot = match slot {
            Some(slot) => slot,
            None => {
                self.partitions.push(PartitionState::default());
                let slot = self.partitions.len() - 1;
                self.partition_slots.insert(topic_partition, slot);
                slot
            }
        };
        let partition = &mut self.partitions[slot];
        partition.replicas.push(index);
        if replica.leader {
            partition.leader = Some(index);
        }

        let state = self
            .brokers
            .get_mut(&replica.broker)
            .ok_or(StatsError::UnknownBroker(replica.broker))?;
        state.replicas.push(index);
        if replica.leader {
            state.leaders += 1;
        }
        for resource in Resource::cached_values() {
            state.load[resource.index()] += replica.load_for(*resource);
        }

        let topic = self.topics.entry(replica.topic.clone()).or_default();
        topic.replicas += 1;
        *topic.per_broker.entry(replica.broker).or_default() += 1;

        self.replica_partitions.push(slot);
        self.replicas.push(replica);
        self.utilization_matrix = OnceLock::new();
        Ok(())
    }

    pub fn set_replica_offline(
        &mut self,
        topic_partition: &TopicPartition,
        broker: BrokerId,
    ) -> Result<()> {
        let index = self
            .partition_slots
            .get(topic_partition)
            .and_then(|&slot| {
                self.partitions[slot]
                    .replicas
                    .iter()
                    .copied()
                    .find(|&index| self.replicas[index].broker == broker)
            })
            .ok_or_else(|| StatsError::UnknownReplica {
                topic: topic_partition.topic.clone(),
                partition: topic_partition.partition,
                broker,
            })?;
        self.replicas[index].offline = true;
        Ok(())
    }

    fn broker(&self, broker: BrokerId) -> Result<&BrokerState> {
        self.brokers
            .get(&broker)
            .ok_or(StatsError::UnknownBroker(broker))
    }

    fn host_brokers<'a>(&'a self, host: &str) -> impl Iterator<Item = &'a BrokerState> + 'a {
        self.hosts
            .get(host)
            .into_iter()
            .flatten()
            .filter_map(|id| self.brokers.get(id))
    }

    fn capacity_of(spec: &BrokerSpec, resource: Resource) -> Result<f64> {
        spec.capacity
            .get(&resource)
            .copied()
            .ok_or(StatsError::MissingCapacity {
                broker: spec.id,
                resource,
            })
    }

    fn build_utilization_matrix(&self) -> UtilizationMatrix {
        let (broker_ids, rows): (Vec<BrokerId>, Vec<Vec<f64>>) = self
            .brokers
            .values()
            .filter(|b| b.spec.alive)
            .map(|b| (b.spec.id, b.load.to_vec()))
            .unzip();
        UtilizationMatrix { broker_ids, rows }
    }
}

impl TryFrom<ClusterModelDocument> for ClusterModel {
    type Error = StatsError;

    fn try_from(document: ClusterModelDocument) -> Result<Self> {
        let mut model = ClusterModel::new();
        model.set_monitored_partitions_ratio(document.monitored_partitions_ratio)?;
        model.set_num_snapshot_windows(document.num_snapshot_windows);
        for broker in document.brokers {
            model.add_broker(broker)?;
        }
        for replica in document.replicas {
            model.add_replica(replica)?;
        }

        debug!(
            brokers = model.brokers.len(),
            replicas = model.replicas.len(),
            "loaded cluster model snapshot"
        );

        Ok(model)
    }
}

impl ClusterSnapshot for ClusterModel {
    fn brokers(&self) -> Vec<BrokerId> {
        self.brokers.keys().copied().collect()
    }

    fn alive_brokers(&self) -> Vec<BrokerId> {
        self.brokers
            .values()
            .filter(|b| b.spec.alive)
            .map(|b| b.spec.id)
            .collect()
    }

    fn topics(&self) -> Vec<String> {
        self.topics.keys().cloned().collect()
    }

    fn self_healing_eligible_replicas(&self) -> Vec<TopicPartition> {
        self.replicas
            .iter()
            .filter(|r| {
                r.offline
                    || self
                        .brokers
                        .get(&r.broker)
                        .is_some_and(|b| !b.spec.alive)
            })
            .map(ReplicaSpec::topic_partition)
            .collect()
    }

    fn replica_count(&self, broker: BrokerId) -> Result<usize> {
        Ok(self.broker(broker)?.replicas.len())
    }

    fn leader_replica_count(&self, broker: BrokerId) -> Result<usize> {
        Ok(self.broker(broker)?.leaders)
    }

    fn topic_replica_count(&self, broker: BrokerId, topic: &str) -> Result<usize> {
        self.broker(broker)?;
        Ok(self
            .topics
            .get(topic)
            .and_then(|t| t.per_broker.get(&broker))
            .copied()
            .unwrap_or(0))
    }

    fn broker_utilization(&self, broker: BrokerId, resource: Resource) -> Result<f64> {
        Ok(self.broker(broker)?.load[resource.index()])
    }

    fn broker_capacity(&self, broker: BrokerId, resource: Resource) -> Result<f64> {
        Self::capacity_of(&self.broker(broker)?.spec, resource)
    }

    fn host_utilization(&self, broker: BrokerId, resource: Resource) -> Result<f64> {
        let host = &self.broker(broker)?.spec.host;
        Ok(self
            .host_brokers(host)
            .map(|b| b.load[resource.index()])
            .sum())
    }

    fn host_capacity(&self, broker: BrokerId, resource: Resource) -> Result<f64> {
        let host = &self.broker(broker)?.spec.host;
        self.host_brokers(host)
            .map(|b| Self::capacity_of(&b.spec, resource))
            .sum()
    }

    /// A hosted partition without a leader contributes the replica's own load
    fn potential_leadership_load(&self, broker: BrokerId, resource: Resource) -> Result<f64> {
        let state = self.broker(broker)?;
        Ok(state
            .replicas
            .iter()
            .map(|&index| {
                let leader = self.partitions[self.replica_partitions[index]]
                    .leader
                    .unwrap_or(index);
                self.replicas[leader].load_for(resource)
            })
            .sum())
    }

    fn expected_utilization(&self, resource: Resource) -> f64 {
        self.brokers
            .values()
            .map(|b| b.load[resource.index()])
            .sum()
    }

    fn capacity(&self, resource: Resource) -> Result<f64> {
        self.brokers
            .values()
            .map(|b| Self::capacity_of(&b.spec, resource))
            .sum()
    }

    fn replica_count_in_cluster(&self) -> usize {
        self.replicas.len()
    }

    fn topic_replica_count_in_cluster(&self, topic: &str) -> usize {
        self.topics.get(topic).map_or(0, |t| t.replicas)
    }

    fn utilization_matrix(&self) -> Arc<UtilizationMatrix> {
        self.utilization_matrix
            .get_or_init(|| Arc::new(self.build_utilization_matrix()))
            .clone()
    }

    fn monitored_partitions_ratio(&self) -> f64 {
        self.monitored_partitions_ratio
    }

    fn num_snapshot_windows(&self) -> usize {
        self.num_snapshot_windows
    }
}

// Tests for ClusterModel are in model_test.rs
#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
