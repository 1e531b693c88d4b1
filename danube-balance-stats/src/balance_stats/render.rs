use serde_json::{Map, Value};
use std::fmt;

use super::ClusterBalanceStats;
use crate::resource::{Resource, StatValue, Statistic};

pub const METADATA: &str = "metadata";
pub const STATISTICS: &str = "statistics";
pub const BROKERS: &str = "brokers";
pub const REPLICAS: &str = "replicas";
pub const TOPICS: &str = "topics";
pub const POTENTIAL_NW_OUT: &str = "potentialNwOut";
pub const LEADER_REPLICAS: &str = "leaderReplicas";
pub const TOPIC_REPLICAS: &str = "topicReplicas";

fn stat_value(value: Option<&StatValue>) -> Value {
    match value {
        Some(StatValue::Int(count)) => Value::from(*count),
        // serde_json turns NaN and infinity into null
        Some(StatValue::Real(real)) => Value::from(*real),
        None => Value::Null,
    }
}

fn display_stat(value: Option<&StatValue>) -> String {
    value.map_or_else(|| "null".to_string(), StatValue::to_string)
}

impl ClusterBalanceStats {
    /// Structured rendering for machine consumption:
    /// a `metadata` block with counts and a `statistics` block keyed by statistic kind.
    pub fn to_json_structure(&self) -> Value {
        let mut metadata = Map::new();
        metadata.insert(BROKERS.to_string(), Value::from(self.num_brokers()));
        metadata.insert(REPLICAS.to_string(), Value::from(self.num_replicas_in_cluster()));
        metadata.insert(TOPICS.to_string(), Value::from(self.num_topics()));

        let mut statistics = Map::new();
        for &stat in Statistic::cached_values() {
            let mut by_metric = Map::new();
            for &resource in Resource::cached_values() {
                by_metric.insert(
                    resource.resource().to_string(),
                    Value::from(self.resource_stat(stat, resource)),
                );
            }
            by_metric.insert(
                POTENTIAL_NW_OUT.to_string(),
                self.potential_nw_out_utilization_stats()
                    .get(&stat)
                    .map_or(Value::Null, |v| Value::from(*v)),
            );
            by_metric.insert(
                REPLICAS.to_string(),
                stat_value(self.replica_stats().get(&stat)),
            );
            by_metric.insert(
                LEADER_REPLICAS.to_string(),
                stat_value(self.leader_replica_stats().get(&stat)),
            );
            by_metric.insert(
                TOPIC_REPLICAS.to_string(),
                stat_value(self.topic_replica_stats().get(&stat)),
            );
            statistics.insert(stat.stat().to_string(), Value::Object(by_metric));
        }

        let mut root = Map::new();
        root.insert(METADATA.to_string(), Value::Object(metadata));
        root.insert(STATISTICS.to_string(), Value::Object(statistics));
        Value::Object(root)
    }

    /// Compact JSON encoding of [`Self::to_json_structure`]
    pub fn to_json_string(&self) -> String {
        self.to_json_structure().to_string()
    }

    pub fn to_string_counts(&self) -> String {
        format!(
            "{} brokers {} replicas {} topics.",
            self.num_brokers(),
            self.num_replicas_in_cluster(),
            self.num_topics()
        )
    }
}

/// Fixed-width table, one line per statistic kind.
///
/// Every line, the last included, ends with its closing `}`. Lines are separated by `\n` with
/// no trailing newline.
impl fmt::Display for ClusterBalanceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (line, &stat) in Statistic::cached_values().iter().enumerate() {
            if line > 0 {
                writeln!(f)?;
            }
            write!(f, "{}:{{", stat)?;
            for &resource in Resource::cached_values() {
                write!(f, "{}:{:12.3} ", resource, self.resource_stat(stat, resource))?;
            }
            let potential_nw_out = self
                .potential_nw_out_utilization_stats()
                .get(&stat)
                .copied()
                .unwrap_or(f64::NAN);
            write!(
                f,
                "{}:{:12.3} {}:{} {}:{} {}:{}}}",
                POTENTIAL_NW_OUT,
                potential_nw_out,
                REPLICAS,
                display_stat(self.replica_stats().get(&stat)),
                LEADER_REPLICAS,
                display_stat(self.leader_replica_stats().get(&stat)),
                TOPIC_REPLICAS,
                display_stat(self.topic_replica_stats().get(&stat)),
            )?;
        }
        Ok(())
    }
}
