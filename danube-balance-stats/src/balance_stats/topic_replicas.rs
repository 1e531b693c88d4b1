use tracing::debug;

use super::Summary;
use crate::cluster::{BrokerId, ClusterSnapshot};
use crate::errors::Result;

/// Replica distribution of each topic, averaged over topics.
///
/// Per topic: max and min replica count over every broker, average of the topic's cluster-wide
/// replica count over alive brokers, and the population standard deviation over alive brokers.
/// The result is the unweighted mean of the per-topic averages and standard deviations, with max
/// and min taken across all topics. A topic with few replicas weighs as much as a large one.
pub(super) fn topic_replica_stats(
    cluster: &dyn ClusterSnapshot,
    brokers: &[BrokerId],
    alive_brokers: &[BrokerId],
    topics: &[String],
) -> Result<Summary<usize>> {
    let num_alive_brokers = alive_brokers.len() as f64;

    let mut sum_of_avg = 0.0;
    let mut sum_of_st_dev = 0.0;
    let mut max_topic_replicas = 0;
    let mut min_topic_replicas = usize::MAX;

    for topic in topics {
        let mut max_topic_replicas_in_broker = 0;
        let mut min_topic_replicas_in_broker = usize::MAX;
        for &broker in brokers {
            let num_topic_replicas_in_broker = cluster.topic_replica_count(broker, topic)?;
            max_topic_replicas_in_broker =
                max_topic_replicas_in_broker.max(num_topic_replicas_in_broker);
            min_topic_replicas_in_broker =
                min_topic_replicas_in_broker.min(num_topic_replicas_in_broker);
        }
        let avg_topic_replicas =
            cluster.topic_replica_count_in_cluster(topic) as f64 / num_alive_brokers;

        let mut variance = 0.0;
        for &broker in alive_brokers {
            let deviation =
                cluster.topic_replica_count(broker, topic)? as f64 - avg_topic_replicas;
            variance += deviation.powi(2) / num_alive_brokers;
        }

        sum_of_avg += avg_topic_replicas;
        sum_of_st_dev += variance.sqrt();
        max_topic_replicas = max_topic_replicas.max(max_topic_replicas_in_broker);
        min_topic_replicas = min_topic_replicas.min(min_topic_replicas_in_broker);
    }

    let num_topics = topics.len() as f64;
    if topics.is_empty() {
        debug!("no topics in the cluster, topic replica averages are undefined");
    }

    Ok(Summary {
        avg: sum_of_avg / num_topics,
        max: max_topic_replicas,
        min: min_topic_replicas,
        st_dev: sum_of_st_dev / num_topics,
    })
}
