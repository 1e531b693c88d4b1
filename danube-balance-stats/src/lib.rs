//! # Danube Balance Stats
//!
//! Balance-quality statistics for a modeled cluster of brokers holding replicated partitions.
//!
//! ## Core Responsibilities
//!
//! - **Resource Utilization**: average, max, min and capacity-normalized standard deviation of
//!   CPU, network and disk load across alive brokers, plus how many brokers sit inside the
//!   configured balance band
//! - **Potential Leadership**: the same figures for the network-out load each broker would carry
//!   if it led every partition it hosts
//! - **Replica Distribution**: replica, leader-replica and per-topic replica counts per broker
//! - **Cluster Health**: offline partitions, monitored-partition ratio and snapshot windows
//!
//! ## Architecture
//!
//! The statistics are a pure function of a cluster snapshot and a balancing constraint:
//! 1. A [`ClusterSnapshot`] answers read-only load, capacity and placement queries
//!    ([`ClusterModel`] is the in-memory implementation)
//! 2. A [`BalancingConstraint`] supplies the per-resource balance bands and capacity ceilings
//! 3. [`ClusterBalanceStats::populate`] runs every summarizer once and returns an immutable
//!    snapshot that can be rendered as a structured map or a text table
//!
//! Nothing here decides placement or moves replicas; the statistics only measure.

pub mod balance_stats;
pub mod cluster;
pub mod config;
pub mod constraint;
pub mod errors;
pub mod model;
pub mod resource;

// Re-export main types
pub use balance_stats::ClusterBalanceStats;
pub use cluster::{BrokerId, ClusterSnapshot, TopicPartition, UtilizationMatrix};
pub use constraint::BalancingConstraint;
pub use errors::{Result, StatsError};
pub use model::{BrokerSpec, ClusterModel, ReplicaSpec};
pub use resource::{Resource, StatValue, Statistic};
